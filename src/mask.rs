//! Per-pixel transparency masks and the hit-test primitive built on them.
//!
//! A [`Mask`] is the decoded RGBA buffer of a PNG whose alpha channel marks
//! the interactive region of a menu element or map layer. Every clickable
//! region in the game goes through [`Mask::hit`]; nothing else reads alpha.
//!
//! Coordinates: a mask is drawn centered on an anchor in world space and
//! uniformly scaled, so mask pixel `(0, 0)` covers the world rectangle
//! starting at `anchor - size * scale / 2`.

use image::ImageFormat;

use crate::error::LoadError;
use crate::geom::{Point, Size};

/// Alpha values at or below this are transparent.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 10;

/// Floor for [`Mask::size_world`] on each axis, in world units.
pub const MIN_REGION_SIZE: f64 = 8.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<u8>,
    alpha_threshold: u8,
}

/// Tightest box around the opaque pixels, inclusive, in mask pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Mask {
    /// Wrap a row-major RGBA buffer. Fails if the buffer length does not match
    /// the dimensions or a dimension is zero.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, LoadError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(LoadError::InvalidMask {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        })
    }

    /// Decode a PNG into a mask. `path` is only used for error context.
    pub fn decode_png(path: &str, bytes: &[u8]) -> Result<Self, LoadError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| LoadError::decode(path, e))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Self::from_rgba(width, height, image.into_raw())
    }

    pub fn with_alpha_threshold(mut self, threshold: u8) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether mask pixel `(x, y)` is opaque. Out-of-range pixels are not.
    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4 + 3;
        self.data[idx] > self.alpha_threshold
    }

    /// Whether `point` lands on an opaque pixel of this mask drawn centered on
    /// `anchor` at `scale`. `None` (pointer outside the viewport) and a
    /// non-positive or non-finite scale never hit.
    pub fn hit(&self, point: Option<Point>, anchor: Point, scale: f64) -> bool {
        let Some(point) = point else {
            return false;
        };
        if !(scale.is_finite() && scale > 0.0) {
            return false;
        }
        let scaled_w = self.width as f64 * scale;
        let scaled_h = self.height as f64 * scale;
        let local_x = point.x - anchor.x + scaled_w / 2.0;
        let local_y = point.y - anchor.y + scaled_h / 2.0;
        if !(local_x >= 0.0 && local_y >= 0.0 && local_x < scaled_w && local_y < scaled_h) {
            return false;
        }
        let px = (local_x / scale).floor() as u32;
        let py = (local_y / scale).floor() as u32;
        self.is_opaque(px, py)
    }

    /// Full scan for the opaque bounding box. `None` when fully transparent.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut found: Option<Bounds> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.is_opaque(x, y) {
                    continue;
                }
                found = Some(match found {
                    None => Bounds { min_x: x, min_y: y, max_x: x, max_y: y },
                    Some(b) => Bounds {
                        min_x: b.min_x.min(x),
                        min_y: b.min_y.min(y),
                        max_x: b.max_x.max(x),
                        max_y: b.max_y.max(y),
                    },
                });
            }
        }
        found
    }

    /// Center of the opaque region in mask pixels, or the geometric center of
    /// the whole mask when nothing is opaque.
    pub fn center_local(&self) -> Point {
        match self.bounds() {
            Some(b) => Point::new(
                (b.min_x + b.max_x) as f64 / 2.0,
                (b.min_y + b.max_y) as f64 / 2.0,
            ),
            None => Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0),
        }
    }

    /// World position of the opaque region's center. Falls back to the anchor.
    pub fn center_world(&self, anchor: Point, scale: f64) -> Point {
        if self.bounds().is_none() {
            return anchor;
        }
        let local = self.center_local();
        Point::new(
            anchor.x - self.width as f64 * scale / 2.0 + local.x * scale,
            anchor.y - self.height as f64 * scale / 2.0 + local.y * scale,
        )
    }

    /// Rendered size of the opaque region, floored at [`MIN_REGION_SIZE`] per
    /// axis. Falls back to the full mask size when nothing is opaque.
    pub fn size_world(&self, scale: f64) -> Size {
        let (w, h) = match self.bounds() {
            Some(b) => ((b.max_x - b.min_x) as f64, (b.max_y - b.min_y) as f64),
            None => (self.width as f64, self.height as f64),
        };
        Size::new(
            (w * scale).max(MIN_REGION_SIZE),
            (h * scale).max(MIN_REGION_SIZE),
        )
    }
}

/// Builds masks pixel by pixel in tests.
#[cfg(test)]
pub(crate) fn mask_with(width: u32, height: u32, opaque: &[(u32, u32)]) -> Mask {
    let mut data = vec![0u8; (width * height * 4) as usize];
    for &(x, y) in opaque {
        data[((y * width + x) * 4 + 3) as usize] = 255;
    }
    Mask::from_rgba(width, height, data).unwrap()
}

/// A fully opaque rectangle `[x0, x1] x [y0, y1]` inside a transparent mask.
#[cfg(test)]
pub(crate) fn mask_rect(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Mask {
    let pixels: Vec<(u32, u32)> = (y0..=y1)
        .flat_map(|y| (x0..=x1).map(move |x| (x, y)))
        .collect();
    mask_with(width, height, &pixels)
}
