//! Error types for asset loading and weighted sampling.
//!
//! Only loads fail loudly. Lookups into reference data never produce an
//! error; they fall back to a display string at the call site.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("asset not found: {0}")]
    MissingAsset(String),

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("mask buffer is {len} bytes, expected {width}x{height}x4")]
    InvalidMask { width: u32, height: u32, len: usize },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {path}: {reason}")]
    Csv { path: String, reason: String },
}

impl LoadError {
    /// Attach the asset path to a bare image decode failure.
    pub fn decode(path: &str, source: image::ImageError) -> Self {
        LoadError::Decode {
            path: path.to_string(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("weighted choice over an empty table")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_asset() {
        let err = LoadError::MissingAsset("data/menu/play.png".into());
        assert_eq!(err.to_string(), "asset not found: data/menu/play.png");

        let err = LoadError::Csv {
            path: "data/player_stats.csv".into(),
            reason: "not utf-8".into(),
        };
        assert!(err.to_string().contains("data/player_stats.csv"));
    }

    #[test]
    fn invalid_mask_reports_dimensions() {
        let err = LoadError::InvalidMask { width: 2, height: 3, len: 7 };
        assert_eq!(err.to_string(), "mask buffer is 7 bytes, expected 2x3x4");
    }
}
