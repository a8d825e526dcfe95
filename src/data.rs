//! Static reference data: classes, dungeons, enemies, loot tables, items and
//! the player's base stats.
//!
//! All of it is read once at startup and never mutated. Lookups are lenient:
//! callers get `Option`s or display fallbacks, never errors.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::LoadError;

// ── classes.json ──────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
pub struct ClassData {
    pub classes: HashMap<String, ClassDef>,
    #[serde(default)]
    pub spin_table: Vec<SpinEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub perks: Vec<String>,
    #[serde(default)]
    pub ability: Option<String>,
    #[serde(default)]
    pub cooldown_seconds: Option<f64>,
    #[serde(default)]
    pub loot_affinity_tags: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpinEntry {
    pub class_id: String,
    pub weight: f64,
}

// ── dungeons.json ─────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
pub struct DungeonData {
    pub dungeons: HashMap<String, DungeonDef>,
    #[serde(default)]
    pub enemy_tables: HashMap<String, Vec<EnemyTableEntry>>,
    #[serde(default)]
    pub enemies: HashMap<String, EnemyDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DungeonDef {
    pub name: String,
    pub enemy_table_id: String,
    pub loot_table_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EnemyTableEntry {
    pub enemy_id: String,
    pub weight: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct EnemyDef {
    pub hp: f64,
    pub attack: f64,
}

// ── loot_tables.json / items.json ─────────────────────────────

#[derive(Clone, Debug, Deserialize)]
pub struct LootTables {
    pub tables: HashMap<String, Vec<LootEntry>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LootEntry {
    pub item_id: String,
    pub weight: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ItemData {
    pub items: HashMap<String, ItemDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ItemDef {
    pub name: String,
}

// ── player stats CSV ──────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

/// Header row + first data row of the stats sheet, keyed by header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerStats {
    values: HashMap<String, StatValue>,
}

impl PlayerStats {
    /// Parse the sheet. Only the first two non-empty lines are read; a sheet
    /// without a data row yields an empty record.
    pub fn parse_csv(text: &str) -> Self {
        let mut lines = text.trim().lines();
        let (Some(header), Some(row)) = (lines.next(), lines.next()) else {
            return Self::default();
        };
        let mut cells = row.split(',').map(str::trim);
        let values = header
            .split(',')
            .map(str::trim)
            .map(|key| {
                let raw = cells.next().unwrap_or("");
                let value = match raw.parse::<f64>() {
                    Ok(n) if n.is_finite() => StatValue::Number(n),
                    _ => StatValue::Text(raw.to_string()),
                };
                (key.to_string(), value)
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&StatValue> {
        self.values.get(key)
    }

    /// First numeric value among `keys`, else `default`.
    pub fn number_or(&self, keys: &[&str], default: f64) -> f64 {
        keys.iter()
            .find_map(|k| match self.get(k) {
                Some(StatValue::Number(n)) => Some(*n),
                _ => None,
            })
            .unwrap_or(default)
    }
}

// ── bundle ────────────────────────────────────────────────────

/// All reference tables, loaded together.
#[derive(Clone, Debug)]
pub struct GameData {
    pub classes: ClassData,
    pub dungeons: DungeonData,
    pub loot: LootTables,
    pub items: ItemData,
    pub player_stats: PlayerStats,
}

pub fn parse_json<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T, LoadError> {
    serde_json::from_slice(bytes).map_err(|source| LoadError::Json {
        path: path.to_string(),
        source,
    })
}

pub fn parse_stats(path: &str, bytes: &[u8]) -> Result<PlayerStats, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|e| LoadError::Csv {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PlayerStats::parse_csv(text))
}

impl GameData {
    pub fn class(&self, id: &str) -> Option<&ClassDef> {
        self.classes.classes.get(id)
    }

    /// Display name of a class, or the raw id when unknown.
    pub fn class_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.class(id).map_or(id, |c| c.name.as_str())
    }

    pub fn affinity_tags(&self, class_id: &str) -> &[String] {
        self.class(class_id)
            .map(|c| c.loot_affinity_tags.as_slice())
            .unwrap_or_default()
    }

    pub fn dungeon(&self, id: &str) -> Option<&DungeonDef> {
        self.dungeons.dungeons.get(id)
    }

    pub fn dungeon_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.dungeon(id).map_or(id, |d| d.name.as_str())
    }

    pub fn enemy_table(&self, table_id: &str) -> Option<&[EnemyTableEntry]> {
        self.dungeons.enemy_tables.get(table_id).map(Vec::as_slice)
    }

    pub fn enemy(&self, id: &str) -> Option<&EnemyDef> {
        self.dungeons.enemies.get(id)
    }

    pub fn loot_table(&self, table_id: &str) -> Option<&[LootEntry]> {
        self.loot.tables.get(table_id).map(Vec::as_slice)
    }

    pub fn item_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.items.items.get(id).map_or(id, |i| i.name.as_str())
    }

    /// The class spin table as sampler input.
    pub fn spin_weights(&self) -> Vec<(String, f64)> {
        self.classes
            .spin_table
            .iter()
            .map(|e| (e.class_id.clone(), e.weight))
            .collect()
    }
}

/// Class panel text, resolved with fallbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassSummary {
    pub current: String,
    pub description: String,
    pub rolls: String,
}

/// Text for the class panel. Unknown ids fall back to the `none` class, and
/// to the raw id if that is missing too.
pub fn class_summary(data: &GameData, class_id: &str) -> ClassSummary {
    let def = data.class(class_id).or_else(|| data.class("none"));
    let name = def.map_or(class_id, |d| d.name.as_str());
    let perks = match def {
        Some(d) if !d.perks.is_empty() => d.perks.join("\n"),
        _ => "None".to_string(),
    };
    let ability = def
        .and_then(|d| d.ability.as_deref())
        .filter(|a| !a.is_empty())
        .unwrap_or("None");
    let cooldown = def
        .and_then(|d| d.cooldown_seconds)
        .map_or_else(|| "None".to_string(), |s| format!("{s}s"));

    ClassSummary {
        current: format!("Current Class:\n{name}"),
        description: format!(
            "Perks:\n{perks}\n\nAbility:\n{ability}\n\nCooldown: {cooldown}"
        ),
        rolls: "Class Rolls: \u{221e}".to_string(),
    }
}

/// Small, fully-populated data set for tests.
#[cfg(test)]
pub(crate) fn sample_data() -> GameData {
    GameData {
        classes: parse_json(
            "classes.json",
            br#"{
                "classes": {
                    "none": {"name": "None"},
                    "pyro": {"name": "Pyromancer", "perks": ["Burn"], "ability": "Fireball",
                             "cooldown_seconds": 6, "loot_affinity_tags": ["fire"]},
                    "rogue": {"name": "Rogue", "loot_affinity_tags": ["stealth", "blade"]}
                },
                "spin_table": [
                    {"class_id": "pyro", "weight": 1},
                    {"class_id": "rogue", "weight": 1}
                ]
            }"#,
        )
        .unwrap(),
        dungeons: parse_json(
            "dungeons.json",
            br#"{
                "dungeons": {
                    "dungeon_1": {"name": "Rat Cellar", "enemy_table_id": "cellar", "loot_table_id": "cellar_loot"}
                },
                "enemy_tables": {"cellar": [{"enemy_id": "rat", "weight": 1}]},
                "enemies": {"rat": {"hp": 10, "attack": 2}}
            }"#,
        )
        .unwrap(),
        loot: parse_json(
            "loot_tables.json",
            br#"{"tables": {"cellar_loot": [
                {"item_id": "ember", "weight": 10, "tags": ["fire"]},
                {"item_id": "crust", "weight": 10}
            ]}}"#,
        )
        .unwrap(),
        items: parse_json(
            "items.json",
            br#"{"items": {"ember": {"name": "Ember Shard"}, "crust": {"name": "Bread Crust"}}}"#,
        )
        .unwrap(),
        player_stats: PlayerStats::parse_csv(
            "Health,Speed,Physical damage,Magic Damage\n50,180,5,2\n",
        ),
    }
}
