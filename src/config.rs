//! Tunable constants, overridable from `data/config.json`.
//!
//! Every field has a default, so a config file only needs to name the values
//! it changes. Unknown keys are ignored.

use serde::Deserialize;

use crate::error::LoadError;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Logical canvas size in world units. All menu hit-testing happens here.
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Fraction of the canvas width a menu background occupies.
    pub ui_scale: f64,
    /// Extra zoom applied to the map on top of the fit scale.
    pub map_zoom: f64,
    /// A mask pixel is opaque when its alpha is strictly above this.
    pub alpha_threshold: u8,
    pub combat_cooldown_secs: f64,
    pub enemies_per_dungeon: usize,
    /// Inset from the map edge for enemy spawns, in map pixels.
    pub spawn_margin: f64,
    pub loot_affinity_bonus: f64,
    pub info_log_cap: usize,
    pub loot_log_cap: usize,
    pub default_dungeon_id: String,
    /// Collision body edge lengths, in map pixels.
    pub player_size: f64,
    pub enemy_size: f64,
    /// How long a single key press keeps a movement axis held.
    pub key_hold_secs: f64,
    pub speed_multiplier: f64,
    /// Minimum game time between HUD text refreshes.
    pub hud_interval_secs: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1920.0,
            canvas_height: 1920.0,
            ui_scale: 0.9,
            map_zoom: 5.0,
            alpha_threshold: 10,
            combat_cooldown_secs: 0.25,
            enemies_per_dungeon: 5,
            spawn_margin: 8.0,
            loot_affinity_bonus: 1.5,
            info_log_cap: 4,
            loot_log_cap: 6,
            default_dungeon_id: "dungeon_1".into(),
            player_size: 4.0,
            enemy_size: 3.0,
            key_hold_secs: 0.15,
            speed_multiplier: 3.0,
            hud_interval_secs: 0.1,
        }
    }
}

impl GameConfig {
    pub fn from_json(path: &str, bytes: &[u8]) -> Result<Self, LoadError> {
        serde_json::from_slice(bytes).map_err(|source| LoadError::Json {
            path: path.to_string(),
            source,
        })
    }
}
