//! Game economy: player and enemy state, dungeon entry, combat and loot.
//!
//! Pure logic: no rendering, no IO. Every operation takes the reference data
//! and config it needs as arguments; randomness comes from the seeded RNG
//! owned here so whole sessions replay from a seed.

use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::GameConfig;
use crate::data::{GameData, LootEntry, PlayerStats};
use crate::geom::{squares_overlap, Point, Size};
use crate::mask::Mask;
use crate::rolling_log::RollingLog;
use crate::sampler::weighted_choice;

pub const DEFEAT_MESSAGE: &str = "You were defeated";

const INITIAL_INFO: [&str; 2] = ["Press R to spin class", "Press Enter to start dungeon"];

// ── Entities ─────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub hp: f64,
    pub attack: f64,
    pub magic_damage: f64,
    /// Map pixels per second before the map scale is applied.
    pub speed: f64,
    pub class_id: String,
    /// Elapsed time of the last exchange; `None` until first hit.
    pub last_hit: Option<f64>,
}

impl Player {
    /// Base stats from the stats sheet, with built-in defaults for missing
    /// columns.
    pub fn from_stats(stats: &PlayerStats, class_id: &str, config: &GameConfig) -> Self {
        Self {
            hp: stats.number_or(&["Health", "hp"], 50.0),
            speed: stats.number_or(&["Speed", "speed"], 180.0) * config.speed_multiplier,
            attack: stats.number_or(&["Physical damage", "attack"], 5.0),
            magic_damage: stats.number_or(&["Magic Damage", "Magic damage", "magic"], 0.0),
            class_id: class_id.to_string(),
            last_hit: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemyId(u32);

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id: EnemyId,
    /// Enemy definition id, e.g. `rat`.
    pub kind: String,
    pub hp: f64,
    pub attack: f64,
    pub last_hit: Option<f64>,
    /// Map-space center.
    pub pos: Point,
}

/// State that exists only while the game mode is active.
#[derive(Clone, Debug)]
pub struct Session {
    pub player: Player,
    /// Map-space center of the player.
    pub player_pos: Point,
    pub current_dungeon_id: Option<String>,
    pub enemies: Vec<Enemy>,
    /// Map dimensions enemies are spawned inside.
    pub play_area: Size,
    next_enemy_id: u32,
}

impl Session {
    #[cfg(test)]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Player or enemy struck too recently; nothing changed.
    Cooldown,
    /// Both sides took damage and survived.
    Exchanged,
    /// The enemy died and a loot roll was made.
    EnemySlain,
    /// The player died; the session is gone.
    PlayerDefeated,
    /// No session, or the enemy is already gone.
    NoTarget,
}

// ── Economy ──────────────────────────────────────────────────

pub struct Economy {
    rng: ChaCha8Rng,
    elapsed: f64,
    selected_class_id: String,
    info_log: RollingLog,
    loot_log: RollingLog,
    session: Option<Session>,
}

impl Economy {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            elapsed: 0.0,
            selected_class_id: "none".to_string(),
            info_log: RollingLog::with_lines(config.info_log_cap, &INITIAL_INFO),
            loot_log: RollingLog::new(config.loot_log_cap),
            session: None,
        }
    }

    #[cfg(test)]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advance simulated time. Only called while the game mode runs.
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    pub fn selected_class_id(&self) -> &str {
        &self.selected_class_id
    }

    pub fn info_log(&self) -> &RollingLog {
        &self.info_log
    }

    pub fn loot_log(&self) -> &RollingLog {
        &self.loot_log
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Fresh player at `spawn` with full base stats and the selected class.
    pub fn begin_session(&mut self, data: &GameData, config: &GameConfig, spawn: Point, play_area: Size) {
        let player = Player::from_stats(&data.player_stats, &self.selected_class_id, config);
        self.session = Some(Session {
            player,
            player_pos: spawn,
            current_dungeon_id: None,
            enemies: Vec::new(),
            play_area,
            next_enemy_id: 0,
        });
    }

    pub fn end_session(&mut self) {
        self.session = None;
    }

    /// Roll a class from the spin table and assign it.
    pub fn spin_class(&mut self, data: &GameData) {
        let table = data.spin_weights();
        let class_id = match weighted_choice(&table, &mut self.rng) {
            Ok(id) => id.clone(),
            Err(e) => {
                warn!("spin_class: {e}");
                return;
            }
        };
        if let Some(session) = self.session.as_mut() {
            session.player.class_id = class_id.clone();
        }
        let message = format!("Spun class: {}", data.class_name(&class_id));
        self.selected_class_id = class_id;
        self.info_log.push(message);
    }

    /// Replace the live enemies with a fresh batch from `dungeon_id`'s table.
    ///
    /// An unknown id is replaced by `config.default_dungeon_id`. If that is
    /// missing too, the dungeon is entered with no enemies.
    pub fn start_dungeon(&mut self, data: &GameData, config: &GameConfig, dungeon_id: &str) {
        let Some(session) = self.session.as_mut() else {
            warn!("start_dungeon({dungeon_id}) with no active session");
            return;
        };

        let resolved = if data.dungeon(dungeon_id).is_some() {
            dungeon_id
        } else {
            warn!(
                "unknown dungeon {dungeon_id}, falling back to {}",
                config.default_dungeon_id
            );
            config.default_dungeon_id.as_str()
        };

        session.current_dungeon_id = Some(resolved.to_string());
        session.enemies.clear();

        let table: Vec<(String, f64)> = data
            .dungeon(resolved)
            .and_then(|d| data.enemy_table(&d.enemy_table_id))
            .unwrap_or_default()
            .iter()
            .map(|e| (e.enemy_id.clone(), e.weight))
            .collect();

        for _ in 0..config.enemies_per_dungeon {
            let kind = match weighted_choice(&table, &mut self.rng) {
                Ok(kind) => kind.clone(),
                Err(e) => {
                    warn!("no enemies for dungeon {resolved}: {e}");
                    break;
                }
            };
            let Some(def) = data.enemy(&kind) else {
                warn!("enemy table names unknown enemy {kind}");
                continue;
            };
            let pos = spawn_point(&mut self.rng, session.play_area, config.spawn_margin);
            let id = EnemyId(session.next_enemy_id);
            session.next_enemy_id += 1;
            session.enemies.push(Enemy {
                id,
                kind,
                hp: def.hp,
                attack: def.attack,
                last_hit: None,
                pos,
            });
        }

        let name = data.dungeon_name(resolved).to_string();
        info!("entered {resolved} with {} enemies", session.enemies.len());
        self.info_log.push(format!("Entered {name}"));
    }

    /// One melee exchange between the player and `enemy_id`, gated by the
    /// per-entity cooldown.
    pub fn handle_combat(&mut self, data: &GameData, config: &GameConfig, enemy_id: EnemyId) -> CombatOutcome {
        let now = self.elapsed;
        let cooldown = config.combat_cooldown_secs;
        let Some(session) = self.session.as_mut() else {
            return CombatOutcome::NoTarget;
        };
        let Some(index) = session.enemies.iter().position(|e| e.id == enemy_id) else {
            return CombatOutcome::NoTarget;
        };

        let enemy = &mut session.enemies[index];
        let player = &mut session.player;
        if struck_within(player.last_hit, now, cooldown) || struck_within(enemy.last_hit, now, cooldown) {
            return CombatOutcome::Cooldown;
        }

        enemy.hp -= player.attack;
        player.hp -= enemy.attack;
        player.last_hit = Some(now);
        enemy.last_hit = Some(now);

        let enemy_dead = enemy.hp <= 0.0;
        let player_dead = player.hp <= 0.0;

        if enemy_dead {
            session.enemies.retain(|e| e.id != enemy_id);
            self.drop_loot(data, config);
        }
        if player_dead {
            self.defeat();
            return CombatOutcome::PlayerDefeated;
        }
        if enemy_dead {
            CombatOutcome::EnemySlain
        } else {
            CombatOutcome::Exchanged
        }
    }

    /// Roll the current dungeon's loot table, favouring items that share a
    /// tag with the player's class.
    pub fn drop_loot(&mut self, data: &GameData, config: &GameConfig) {
        let Some(weighted) = self.loot_roll(data, config) else {
            return;
        };
        match weighted_choice(&weighted, &mut self.rng) {
            Ok(item_id) => {
                let message = format!("Loot: {}", data.item_name(item_id));
                self.loot_log.push(message);
            }
            Err(e) => warn!("loot roll: {e}"),
        }
    }

    /// Weighted loot table for the current dungeon and the player's class.
    /// `None` outside a dungeon or when the dungeon has no loot table.
    fn loot_roll(&self, data: &GameData, config: &GameConfig) -> Option<Vec<(String, f64)>> {
        let session = self.session.as_ref()?;
        let dungeon_id = session.current_dungeon_id.as_deref()?;
        let Some(entries) = data
            .dungeon(dungeon_id)
            .and_then(|d| data.loot_table(&d.loot_table_id))
        else {
            warn!("no loot table for dungeon {dungeon_id}");
            return None;
        };
        Some(loot_weights(
            entries,
            data.affinity_tags(&session.player.class_id),
            config.loot_affinity_bonus,
        ))
    }

    /// One game frame: advance time, move the player, then fight every
    /// enemy it overlaps. Returns true when the player was defeated.
    pub fn step(
        &mut self,
        data: &GameData,
        config: &GameConfig,
        dt: f64,
        axis: (f64, f64),
        walk: Option<&Mask>,
        map_scale: f64,
    ) -> bool {
        self.advance(dt);
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        let (dx, dy) = axis;
        if dx != 0.0 || dy != 0.0 {
            let length = dx.hypot(dy);
            let scale = if map_scale.is_finite() && map_scale > 0.0 { map_scale } else { 1.0 };
            let step = session.player.speed * dt / scale;
            let next = Point::new(
                session.player_pos.x + dx / length * step,
                session.player_pos.y + dy / length * step,
            );
            if can_stand(walk, next, config.player_size) {
                session.player_pos = next;
            }
        }

        let player_pos = session.player_pos;
        let touching: Vec<EnemyId> = session
            .enemies
            .iter()
            .filter(|e| squares_overlap(player_pos, config.player_size, e.pos, config.enemy_size))
            .map(|e| e.id)
            .collect();

        for id in touching {
            if self.handle_combat(data, config, id) == CombatOutcome::PlayerDefeated {
                return true;
            }
        }
        false
    }

    /// HUD status block for the active session.
    pub fn status_text(&self) -> String {
        let Some(session) = self.session.as_ref() else {
            return String::new();
        };
        let class = match session.player.class_id.as_str() {
            "" => "None",
            id => id,
        };
        format!(
            "HP: {}\nClass: {}\nDungeon: {}",
            session.player.hp,
            class,
            session.current_dungeon_id.as_deref().unwrap_or("None")
        )
    }

    fn defeat(&mut self) {
        info!("player defeated at t={:.2}", self.elapsed);
        self.session = None;
        self.info_log.push(DEFEAT_MESSAGE);
    }
}

/// Weighted loot input: entries sharing any tag with `class_tags` get
/// `weight * bonus`, once, however many tags match.
pub fn loot_weights(entries: &[LootEntry], class_tags: &[String], bonus: f64) -> Vec<(String, f64)> {
    entries
        .iter()
        .map(|entry| {
            let favoured = !class_tags.is_empty() && entry.tags.iter().any(|t| class_tags.contains(t));
            let weight = if favoured { entry.weight * bonus } else { entry.weight };
            (entry.item_id.clone(), weight)
        })
        .collect()
}

/// Whether map pixel `(x, y)` can be walked on. No mask means no walls.
pub fn is_walkable(walk: Option<&Mask>, x: f64, y: f64) -> bool {
    let Some(mask) = walk else {
        return true;
    };
    let (fx, fy) = (x.floor(), y.floor());
    if !(fx >= 0.0 && fy >= 0.0) {
        return false;
    }
    mask.is_opaque(fx as u32, fy as u32)
}

/// Feet probes: center and both sides of a line 20% of the body below center.
fn can_stand(walk: Option<&Mask>, center: Point, body: f64) -> bool {
    let probe_y = center.y + body * 0.2;
    let side = body * 0.1;
    [center.x, center.x - side, center.x + side]
        .into_iter()
        .all(|x| is_walkable(walk, x, probe_y))
}

fn struck_within(last_hit: Option<f64>, now: f64, cooldown: f64) -> bool {
    last_hit.is_some_and(|t| now - t < cooldown)
}

fn spawn_point(rng: &mut ChaCha8Rng, area: Size, margin: f64) -> Point {
    let axis = |rng: &mut ChaCha8Rng, extent: f64| {
        let extent = extent.max(0.0);
        let m = margin.clamp(0.0, extent / 2.0);
        rng.gen_range(m..=extent - m)
    };
    let x = axis(rng, area.width);
    let y = axis(rng, area.height);
    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_data;
    use crate::mask::mask_rect;

    fn setup() -> (GameData, GameConfig, Economy) {
        let config = GameConfig::default();
        let mut econ = Economy::new(&config, 42);
        let data = sample_data();
        econ.begin_session(&data, &config, Point::new(50.0, 50.0), Size::new(100.0, 100.0));
        (data, config, econ)
    }

    fn first_enemy(econ: &Economy) -> EnemyId {
        econ.session().unwrap().enemies[0].id
    }

    // ── Player ───────────────────────────────────────────────

    #[test]
    fn player_takes_stats_from_sheet() {
        let (_, _, econ) = setup();
        let p = &econ.session().unwrap().player;
        assert_eq!(p.hp, 50.0);
        assert_eq!(p.speed, 540.0);
        assert_eq!(p.attack, 5.0);
        assert_eq!(p.magic_damage, 2.0);
        assert_eq!(p.class_id, "none");
        assert_eq!(p.last_hit, None);
    }

    #[test]
    fn player_defaults_without_sheet() {
        let p = Player::from_stats(&PlayerStats::default(), "pyro", &GameConfig::default());
        assert_eq!((p.hp, p.speed, p.attack, p.magic_damage), (50.0, 540.0, 5.0, 0.0));
        assert_eq!(p.class_id, "pyro");
    }

    #[test]
    fn initial_info_log() {
        let econ = Economy::new(&GameConfig::default(), 1);
        assert_eq!(econ.info_log().entries(), INITIAL_INFO);
        assert!(econ.loot_log().is_empty());
    }

    // ── Class spin ───────────────────────────────────────────

    #[test]
    fn spin_assigns_class_and_logs_name() {
        let (data, _, mut econ) = setup();
        econ.spin_class(&data);
        let id = econ.selected_class_id().to_string();
        assert!(id == "pyro" || id == "rogue");
        assert_eq!(econ.session().unwrap().player.class_id, id);
        let expected = format!("Spun class: {}", data.class_name(&id));
        assert_eq!(econ.info_log().last(), Some(expected.as_str()));
    }

    #[test]
    fn spin_outside_session_only_selects() {
        let config = GameConfig::default();
        let data = sample_data();
        let mut econ = Economy::new(&config, 3);
        econ.spin_class(&data);
        assert_ne!(econ.selected_class_id(), "none");
        econ.begin_session(&data, &config, Point::default(), Size::new(10.0, 10.0));
        assert_eq!(econ.session().unwrap().player.class_id, econ.selected_class_id());
    }

    #[test]
    fn spin_with_empty_table_is_noop() {
        let (mut data, _, mut econ) = setup();
        data.classes.spin_table.clear();
        econ.spin_class(&data);
        assert_eq!(econ.selected_class_id(), "none");
        assert_eq!(econ.info_log().len(), 2);
    }

    // ── Dungeon entry ────────────────────────────────────────

    #[test]
    fn dungeon_spawns_five_rats() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let session = econ.session().unwrap();
        assert_eq!(session.current_dungeon_id.as_deref(), Some("dungeon_1"));
        assert_eq!(session.enemies.len(), 5);
        for enemy in &session.enemies {
            assert_eq!(enemy.kind, "rat");
            assert_eq!(enemy.hp, 10.0);
            assert_eq!(enemy.attack, 2.0);
            assert!((8.0..=92.0).contains(&enemy.pos.x));
            assert!((8.0..=92.0).contains(&enemy.pos.y));
        }
        assert_eq!(econ.info_log().last(), Some("Entered Rat Cellar"));
    }

    #[test]
    fn reentering_replaces_enemies() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let before: Vec<EnemyId> = econ.session().unwrap().enemies.iter().map(|e| e.id).collect();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let session = econ.session().unwrap();
        assert_eq!(session.enemies.len(), 5);
        assert!(session.enemies.iter().all(|e| !before.contains(&e.id)));
    }

    #[test]
    fn unknown_dungeon_falls_back_to_default() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_404");
        let session = econ.session().unwrap();
        assert_eq!(session.current_dungeon_id.as_deref(), Some("dungeon_1"));
        assert_eq!(session.enemies.len(), 5);
    }

    #[test]
    fn missing_default_dungeon_spawns_nothing() {
        let (data, mut config, mut econ) = setup();
        config.default_dungeon_id = "nowhere".into();
        econ.start_dungeon(&data, &config, "dungeon_404");
        let session = econ.session().unwrap();
        assert!(session.enemies.is_empty());
        assert_eq!(econ.info_log().last(), Some("Entered nowhere"));
    }

    #[test]
    fn tiny_play_area_still_spawns_inside() {
        let (data, config, mut econ) = setup();
        econ.session_mut().unwrap().play_area = Size::new(6.0, 6.0);
        econ.start_dungeon(&data, &config, "dungeon_1");
        for enemy in &econ.session().unwrap().enemies {
            assert_eq!(enemy.pos, Point::new(3.0, 3.0));
        }
    }

    #[test]
    fn dungeon_without_session_is_ignored() {
        let config = GameConfig::default();
        let mut econ = Economy::new(&config, 1);
        econ.start_dungeon(&sample_data(), &config, "dungeon_1");
        assert!(econ.session().is_none());
        assert_eq!(econ.info_log().len(), 2);
    }

    // ── Combat ───────────────────────────────────────────────

    #[test]
    fn combat_is_symmetric_exchange() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let id = first_enemy(&econ);
        assert_eq!(econ.handle_combat(&data, &config, id), CombatOutcome::Exchanged);
        let session = econ.session().unwrap();
        assert_eq!(session.player.hp, 48.0);
        assert_eq!(session.enemy(id).unwrap().hp, 5.0);
        assert_eq!(session.player.last_hit, Some(0.0));
        assert_eq!(session.enemy(id).unwrap().last_hit, Some(0.0));
    }

    #[test]
    fn cooldown_blocks_second_hit() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let id = first_enemy(&econ);
        econ.handle_combat(&data, &config, id);
        econ.advance(0.1);
        assert_eq!(econ.handle_combat(&data, &config, id), CombatOutcome::Cooldown);
        assert_eq!(econ.session().unwrap().player.hp, 48.0);
    }

    #[test]
    fn cooldown_expires() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let id = first_enemy(&econ);
        econ.handle_combat(&data, &config, id);
        econ.advance(0.26);
        econ.handle_combat(&data, &config, id);
        assert_eq!(econ.session().unwrap().player.hp, 46.0);
    }

    #[test]
    fn player_cooldown_covers_other_enemies() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let ids: Vec<EnemyId> = econ.session().unwrap().enemies.iter().map(|e| e.id).collect();
        econ.handle_combat(&data, &config, ids[0]);
        assert_eq!(econ.handle_combat(&data, &config, ids[1]), CombatOutcome::Cooldown);
    }

    #[test]
    fn slain_enemy_is_removed_and_drops_loot() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let id = first_enemy(&econ);
        econ.handle_combat(&data, &config, id);
        econ.advance(0.3);
        assert_eq!(econ.handle_combat(&data, &config, id), CombatOutcome::EnemySlain);
        let session = econ.session().unwrap();
        assert!(session.enemy(id).is_none());
        assert_eq!(session.enemies.len(), 4);
        let loot = econ.loot_log().last().unwrap();
        assert!(loot == "Loot: Ember Shard" || loot == "Loot: Bread Crust", "{loot}");
    }

    #[test]
    fn dead_enemy_is_no_target() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let id = first_enemy(&econ);
        econ.session_mut().unwrap().enemies.retain(|e| e.id != id);
        assert_eq!(econ.handle_combat(&data, &config, id), CombatOutcome::NoTarget);
    }

    #[test]
    fn lethal_exchange_ends_session() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        econ.session_mut().unwrap().player.hp = 2.0;
        let id = first_enemy(&econ);
        assert_eq!(econ.handle_combat(&data, &config, id), CombatOutcome::PlayerDefeated);
        assert!(econ.session().is_none());
        assert_eq!(econ.info_log().last(), Some(DEFEAT_MESSAGE));

        econ.begin_session(&data, &config, Point::default(), Size::new(100.0, 100.0));
        assert_eq!(econ.session().unwrap().player.hp, 50.0);
    }

    // ── Loot ─────────────────────────────────────────────────

    #[test]
    fn affinity_bonus_applies_once() {
        let entries = vec![
            LootEntry { item_id: "x".into(), weight: 10.0, tags: vec!["fire".into(), "hot".into()] },
            LootEntry { item_id: "y".into(), weight: 10.0, tags: vec![] },
        ];
        let tags = vec!["fire".to_string(), "hot".to_string()];
        let weighted = loot_weights(&entries, &tags, 1.5);
        assert_eq!(weighted, vec![("x".to_string(), 15.0), ("y".to_string(), 10.0)]);
    }

    #[test]
    fn no_class_tags_no_bonus() {
        let entries = vec![LootEntry { item_id: "x".into(), weight: 10.0, tags: vec!["fire".into()] }];
        assert_eq!(loot_weights(&entries, &[], 1.5), vec![("x".to_string(), 10.0)]);
    }

    #[test]
    fn drop_loot_favours_class_affinity() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        assert_eq!(
            econ.loot_roll(&data, &config).unwrap(),
            vec![("ember".to_string(), 10.0), ("crust".to_string(), 10.0)]
        );

        econ.session_mut().unwrap().player.class_id = "pyro".into();
        assert_eq!(
            econ.loot_roll(&data, &config).unwrap(),
            vec![("ember".to_string(), 15.0), ("crust".to_string(), 10.0)]
        );

        // 15 / (15 + 10) = 0.6
        let draws = 20_000;
        let mut embers = 0;
        for _ in 0..draws {
            econ.drop_loot(&data, &config);
            if econ.loot_log().last() == Some("Loot: Ember Shard") {
                embers += 1;
            }
        }
        let freq = embers as f64 / draws as f64;
        assert!((freq - 0.6).abs() < 0.02, "ember frequency {freq}");
    }

    #[test]
    fn loot_without_dungeon_is_noop() {
        let (data, config, mut econ) = setup();
        econ.drop_loot(&data, &config);
        assert!(econ.loot_log().is_empty());
    }

    #[test]
    fn loot_log_is_capped() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        for _ in 0..10 {
            econ.drop_loot(&data, &config);
        }
        assert_eq!(econ.loot_log().len(), 6);
    }

    // ── Movement ─────────────────────────────────────────────

    #[test]
    fn walkable_floors_and_bounds() {
        let walk = mask_rect(10, 10, 2, 2, 7, 7);
        assert!(is_walkable(Some(&walk), 2.0, 2.0));
        assert!(is_walkable(Some(&walk), 7.9, 7.9));
        assert!(!is_walkable(Some(&walk), 8.0, 5.0));
        assert!(!is_walkable(Some(&walk), -0.5, 5.0));
        assert!(!is_walkable(Some(&walk), 50.0, 5.0));
        assert!(is_walkable(None, -100.0, 1e9));
    }

    #[test]
    fn step_moves_along_normalized_axis() {
        let (data, config, mut econ) = setup();
        // speed 540, scale 5, dt 0.1 -> 10.8 map pixels
        econ.step(&data, &config, 0.1, (1.0, 0.0), None, 5.0);
        let pos = econ.session().unwrap().player_pos;
        assert!((pos.x - 60.8).abs() < 1e-9);
        assert_eq!(pos.y, 50.0);

        econ.step(&data, &config, 0.1, (1.0, 1.0), None, 5.0);
        let after = econ.session().unwrap().player_pos;
        let moved = (after.x - pos.x).hypot(after.y - pos.y);
        assert!((moved - 10.8).abs() < 1e-9);
        assert!((econ.elapsed() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn step_refuses_unwalkable_target() {
        let (data, config, mut econ) = setup();
        let walk = mask_rect(100, 100, 0, 0, 55, 99);
        econ.step(&data, &config, 0.1, (1.0, 0.0), Some(&walk), 5.0);
        assert_eq!(econ.session().unwrap().player_pos, Point::new(50.0, 50.0));
        econ.step(&data, &config, 0.01, (1.0, 0.0), Some(&walk), 5.0);
        assert!(econ.session().unwrap().player_pos.x > 50.0);
    }

    #[test]
    fn step_fights_overlapping_enemies() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let session = econ.session_mut().unwrap();
        session.enemies.truncate(1);
        session.enemies[0].pos = Point::new(51.0, 50.0);
        assert!(!econ.step(&data, &config, 0.016, (0.0, 0.0), None, 5.0));
        assert_eq!(econ.session().unwrap().player.hp, 48.0);
    }

    #[test]
    fn step_reports_defeat() {
        let (data, config, mut econ) = setup();
        econ.start_dungeon(&data, &config, "dungeon_1");
        let session = econ.session_mut().unwrap();
        session.player.hp = 1.0;
        for enemy in &mut session.enemies {
            enemy.pos = Point::new(50.0, 50.0);
        }
        assert!(econ.step(&data, &config, 0.016, (0.0, 0.0), None, 5.0));
        assert!(econ.session().is_none());
    }

    // ── HUD ──────────────────────────────────────────────────

    #[test]
    fn status_text_reports_session() {
        let (data, config, mut econ) = setup();
        assert_eq!(econ.status_text(), "HP: 50\nClass: none\nDungeon: None");
        econ.start_dungeon(&data, &config, "dungeon_1");
        assert!(econ.status_text().ends_with("Dungeon: dungeon_1"));
    }
}
