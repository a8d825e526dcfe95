//! Asset access and per-mode load gates.
//!
//! All game assets are compiled into the binary; [`AssetSource`] is the seam
//! that lets tests hand in their own bytes. Masks are grouped into one set per
//! mode, and each lazily loaded set sits behind an [`AssetGate`].

use std::borrow::Cow;

use log::{error, info};

use crate::config::GameConfig;
use crate::data::{parse_json, parse_stats, GameData};
use crate::error::LoadError;
use crate::mask::Mask;

pub trait AssetSource {
    fn bytes(&self, path: &str) -> Result<Cow<'static, [u8]>, LoadError>;
}

/// Declares the embedded asset table: one path per file under `data/`.
macro_rules! embedded_assets {
    ($($path:literal),* $(,)?) => {
        const EMBEDDED: &[(&str, &[u8])] = &[
            $(($path, include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/", $path))),)*
        ];
    };
}

embedded_assets! {
    "data/config.json",
    "data/classes.json",
    "data/dungeons.json",
    "data/loot_tables.json",
    "data/items.json",
    "data/player_stats.csv",
    "data/menu/menu_area.png",
    "data/menu/menu_hover_area.png",
    "data/menu/play.png",
    "data/menu/custom.png",
    "data/menu/class.png",
    "data/class_menu/back.png",
    "data/class_menu/description.png",
    "data/class_menu/current.png",
    "data/class_menu/rolls.png",
    "data/class_menu/spin.png",
    "data/custom_menu/back.png",
    "data/custom_menu/current.png",
    "data/custom_menu/left.png",
    "data/custom_menu/right.png",
    "data/custom_menu/scroll_left.png",
    "data/custom_menu/scroll_right.png",
    "data/map/spawn.png",
    "data/map/walk.png",
}

/// Files baked in at compile time.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedAssets;

impl AssetSource for EmbeddedAssets {
    fn bytes(&self, path: &str) -> Result<Cow<'static, [u8]>, LoadError> {
        EMBEDDED
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, bytes)| Cow::Borrowed(*bytes))
            .ok_or_else(|| LoadError::MissingAsset(path.to_string()))
    }
}

pub fn load_mask(source: &dyn AssetSource, path: &str, alpha_threshold: u8) -> Result<Mask, LoadError> {
    let bytes = source.bytes(path)?;
    Ok(Mask::decode_png(path, &bytes)?.with_alpha_threshold(alpha_threshold))
}

pub fn load_config(source: &dyn AssetSource) -> Result<GameConfig, LoadError> {
    const PATH: &str = "data/config.json";
    match source.bytes(PATH) {
        Ok(bytes) => GameConfig::from_json(PATH, &bytes),
        Err(LoadError::MissingAsset(_)) => Ok(GameConfig::default()),
        Err(e) => Err(e),
    }
}

pub fn load_game_data(source: &dyn AssetSource) -> Result<GameData, LoadError> {
    let read = |path: &str| source.bytes(path);
    Ok(GameData {
        classes: parse_json("data/classes.json", &read("data/classes.json")?)?,
        dungeons: parse_json("data/dungeons.json", &read("data/dungeons.json")?)?,
        loot: parse_json("data/loot_tables.json", &read("data/loot_tables.json")?)?,
        items: parse_json("data/items.json", &read("data/items.json")?)?,
        player_stats: parse_stats("data/player_stats.csv", &read("data/player_stats.csv")?)?,
    })
}

// ── Mask sets ────────────────────────────────────────────────

/// Main menu. All masks share the menu background's dimensions.
#[derive(Clone, Debug)]
pub struct MenuMasks {
    pub area: Mask,
    pub hover: Mask,
    pub play: Mask,
    pub custom: Mask,
    pub class: Mask,
}

impl MenuMasks {
    pub fn load(source: &dyn AssetSource, alpha_threshold: u8) -> Result<Self, LoadError> {
        let m = |name: &str| load_mask(source, &format!("data/menu/{name}.png"), alpha_threshold);
        Ok(Self {
            area: m("menu_area")?,
            hover: m("menu_hover_area")?,
            play: m("play")?,
            custom: m("custom")?,
            class: m("class")?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct ClassMenuMasks {
    pub back: Mask,
    pub description: Mask,
    pub current: Mask,
    pub rolls: Mask,
    pub spin: Mask,
}

impl ClassMenuMasks {
    pub fn load(source: &dyn AssetSource, alpha_threshold: u8) -> Result<Self, LoadError> {
        let m = |name: &str| load_mask(source, &format!("data/class_menu/{name}.png"), alpha_threshold);
        Ok(Self {
            back: m("back")?,
            description: m("description")?,
            current: m("current")?,
            rolls: m("rolls")?,
            spin: m("spin")?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct CustomMenuMasks {
    pub back: Mask,
    pub current: Mask,
    pub left: Mask,
    pub right: Mask,
    pub scroll_left: Mask,
    pub scroll_right: Mask,
}

impl CustomMenuMasks {
    pub fn load(source: &dyn AssetSource, alpha_threshold: u8) -> Result<Self, LoadError> {
        let m = |name: &str| load_mask(source, &format!("data/custom_menu/{name}.png"), alpha_threshold);
        Ok(Self {
            back: m("back")?,
            current: m("current")?,
            left: m("left")?,
            right: m("right")?,
            scroll_left: m("scroll_left")?,
            scroll_right: m("scroll_right")?,
        })
    }
}

/// Map layers, in map pixels.
#[derive(Clone, Debug)]
pub struct MapMasks {
    pub spawn: Mask,
    pub walk: Mask,
}

impl MapMasks {
    pub fn load(source: &dyn AssetSource, alpha_threshold: u8) -> Result<Self, LoadError> {
        Ok(Self {
            spawn: load_mask(source, "data/map/spawn.png", alpha_threshold)?,
            walk: load_mask(source, "data/map/walk.png", alpha_threshold)?,
        })
    }
}

// ── Gates ────────────────────────────────────────────────────

/// Identifies one in-flight load. Repeated requests while loading get the
/// same ticket back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u32);

#[derive(Debug)]
pub enum GateState<T> {
    NotLoaded,
    Loading(LoadTicket),
    Loaded(T),
    Failed(LoadError),
}

/// Ensure-loaded state machine for one asset set.
///
/// `request` moves `NotLoaded`/`Failed` to `Loading`; `poll` performs the
/// load and settles the gate. A settled gate never reloads unless requested
/// again after failing.
#[derive(Debug)]
pub struct AssetGate<T> {
    name: &'static str,
    state: GateState<T>,
    issued: u32,
}

impl<T> AssetGate<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: GateState::NotLoaded,
            issued: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[cfg(test)]
    pub fn state(&self) -> &GateState<T> {
        &self.state
    }

    /// Start (or join) a load. `None` when the set is already loaded.
    pub fn request(&mut self) -> Option<LoadTicket> {
        match self.state {
            GateState::Loaded(_) => None,
            GateState::Loading(ticket) => Some(ticket),
            GateState::NotLoaded | GateState::Failed(_) => {
                self.issued += 1;
                let ticket = LoadTicket(self.issued);
                info!("{}: load requested", self.name);
                self.state = GateState::Loading(ticket);
                Some(ticket)
            }
        }
    }

    /// Run the pending load, if any.
    pub fn poll<F>(&mut self, load: F)
    where
        F: FnOnce() -> Result<T, LoadError>,
    {
        if !matches!(self.state, GateState::Loading(_)) {
            return;
        }
        self.state = match load() {
            Ok(value) => {
                info!("{}: loaded", self.name);
                GateState::Loaded(value)
            }
            Err(e) => {
                error!("{}: load failed: {e}", self.name);
                GateState::Failed(e)
            }
        };
    }

    pub fn get(&self) -> Option<&T> {
        match &self.state {
            GateState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match &self.state {
            GateState::Failed(e) => Some(e),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, GateState::Loading(_))
    }
}

// ── Test fixtures ────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;

    /// In-memory source; paths not inserted are missing. Shared through an
    /// `Rc` so a test can change files after handing the source over.
    #[derive(Default)]
    pub struct MemoryAssets {
        files: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl MemoryAssets {
        /// Copy of every embedded file.
        pub fn from_embedded() -> Rc<Self> {
            let assets = Self::default();
            for (path, bytes) in EMBEDDED {
                assets.insert(path, bytes.to_vec());
            }
            Rc::new(assets)
        }

        pub fn insert(&self, path: &str, bytes: Vec<u8>) {
            self.files.borrow_mut().insert(path.to_string(), bytes);
        }

        pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
            self.files.borrow_mut().remove(path)
        }
    }

    impl AssetSource for MemoryAssets {
        fn bytes(&self, path: &str) -> Result<Cow<'static, [u8]>, LoadError> {
            self.files
                .borrow()
                .get(path)
                .map(|b| Cow::Owned(b.clone()))
                .ok_or_else(|| LoadError::MissingAsset(path.to_string()))
        }
    }

    impl AssetSource for Rc<MemoryAssets> {
        fn bytes(&self, path: &str) -> Result<Cow<'static, [u8]>, LoadError> {
            self.as_ref().bytes(path)
        }
    }

    /// PNG with the opaque rectangle `[x0, x1] x [y0, y1]`.
    pub fn png_rect(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            let inside = (x0..=x1).contains(&x) && (y0..=y1).contains(&y);
            image::Rgba([255, 255, 255, if inside { 255 } else { 0 }])
        });
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }
}
