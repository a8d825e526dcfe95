//! Menu/mode controller.
//!
//! One [`Mode`] value gates every per-frame update and input handler: each
//! handler checks the mode first and does nothing otherwise. Transitions are
//! explicit methods. Modes that need lazily loaded masks are entered through
//! a pending transition that completes once their [`AssetGate`] settles.

use log::{info, warn};

use crate::assets::{
    load_config, load_game_data, AssetGate, AssetSource, ClassMenuMasks, CustomMenuMasks, MapMasks,
    MenuMasks,
};
use crate::config::GameConfig;
use crate::data::{class_summary, ClassSummary, GameData};
use crate::economy::{Economy, DEFEAT_MESSAGE};
use crate::error::LoadError;
use crate::geom::{Point, Size};
use crate::input::{HeldAxes, InputEvent};
use crate::mask::Mask;
use crate::viewport::{camera, fit_scale, Camera};

/// Dungeon the Enter key dives into.
pub const ENTER_DUNGEON_ID: &str = "dungeon_1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Menu,
    ClassMenu,
    CustomMenu,
    Game,
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Avatar {
    pub id: &'static str,
    pub name: &'static str,
    pub glyph: char,
}

pub const AVATARS: &[Avatar] = &[Avatar {
    id: "human",
    name: "Human",
    glyph: '@',
}];

/// Entry at `index`, wrapping in both directions.
pub fn avatar_at(avatars: &[Avatar], index: i64) -> Option<&Avatar> {
    if avatars.is_empty() {
        return None;
    }
    let i = index.rem_euclid(avatars.len() as i64) as usize;
    avatars.get(i)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub status: String,
    pub info: String,
    pub loot: String,
}

/// Where the class panel's text goes, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMenuView {
    pub summary: ClassSummary,
    pub current_at: Point,
    pub description_at: Point,
    pub rolls_at: Point,
    pub description_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSlot {
    pub avatar: Avatar,
    pub center: Point,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomMenuView {
    pub current: PreviewSlot,
    pub left: PreviewSlot,
    pub right: PreviewSlot,
}

pub struct Controller {
    config: GameConfig,
    data: GameData,
    source: Box<dyn AssetSource>,
    mode: Mode,
    pending: Option<Mode>,
    economy: Economy,
    menu: MenuMasks,
    class_menu: AssetGate<ClassMenuMasks>,
    custom_menu: AssetGate<CustomMenuMasks>,
    map: AssetGate<MapMasks>,
    pointer: Option<Point>,
    menu_hovered: bool,
    avatar_index: i64,
    selected_avatar_id: &'static str,
    screen_title: String,
    held: HeldAxes,
    hud: Hud,
    hud_timer: f64,
}

impl Controller {
    /// Load config, reference data and the menu masks. Any failure here is
    /// fatal to startup.
    pub fn new(source: Box<dyn AssetSource>, seed: u64) -> Result<Self, LoadError> {
        let config = load_config(source.as_ref())?;
        let menu = MenuMasks::load(source.as_ref(), config.alpha_threshold)?;
        let data = load_game_data(source.as_ref())?;
        info!("startup assets loaded");
        Ok(Self {
            economy: Economy::new(&config, seed),
            held: HeldAxes::new(config.key_hold_secs),
            config,
            data,
            source,
            mode: Mode::Menu,
            pending: None,
            menu,
            class_menu: AssetGate::new("Class Menu"),
            custom_menu: AssetGate::new("Custom Menu"),
            map: AssetGate::new("Game"),
            pointer: None,
            menu_hovered: false,
            avatar_index: 0,
            selected_avatar_id: AVATARS[0].id,
            screen_title: String::new(),
            hud: Hud::default(),
            hud_timer: 0.0,
        })
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn menu_masks(&self) -> &MenuMasks {
        &self.menu
    }

    pub fn class_menu_masks(&self) -> Option<&ClassMenuMasks> {
        self.class_menu.get()
    }

    pub fn custom_menu_masks(&self) -> Option<&CustomMenuMasks> {
        self.custom_menu.get()
    }

    pub fn map_masks(&self) -> Option<&MapMasks> {
        self.map.get()
    }

    pub fn menu_hovered(&self) -> bool {
        self.menu_hovered
    }

    pub fn selected_avatar_id(&self) -> &'static str {
        self.selected_avatar_id
    }

    pub fn screen_title(&self) -> &str {
        &self.screen_title
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn canvas(&self) -> Size {
        Size::new(self.config.canvas_width, self.config.canvas_height)
    }

    /// Every menu background is drawn centered on the canvas.
    pub fn canvas_center(&self) -> Point {
        Point::new(self.config.canvas_width / 2.0, self.config.canvas_height / 2.0)
    }

    /// Scale for a menu whose background mask is `mask`.
    pub fn menu_scale(&self, mask: &Mask) -> f64 {
        fit_scale(&self.config, mask.width() as f64)
    }

    pub fn map_scale(&self) -> f64 {
        let width = self.map.get().map_or(0.0, |m| m.walk.width() as f64);
        fit_scale(&self.config, width) * self.config.map_zoom
    }

    /// Loading overlay text while a transition waits on its gate.
    pub fn loading_message(&self) -> Option<String> {
        let target = self.pending?;
        let (name, error) = match target {
            Mode::ClassMenu => (self.class_menu.name(), self.class_menu.error()),
            Mode::CustomMenu => (self.custom_menu.name(), self.custom_menu.error()),
            Mode::Game => (self.map.name(), self.map.error()),
            Mode::Menu | Mode::Screen => return None,
        };
        match error {
            Some(e) => Some(format!("Failed to load {name}: {e}\nEsc to go back")),
            None => Some(format!("Loading {name}...")),
        }
    }

    // ── Transitions ──────────────────────────────────────────

    pub fn show_menu(&mut self) {
        info!("mode -> menu");
        self.mode = Mode::Menu;
        self.pending = None;
        self.economy.end_session();
        self.held.clear();
        self.menu_hovered = false;
        self.screen_title.clear();
        self.hud = Hud::default();
    }

    pub fn open_class_menu(&mut self) {
        self.request(Mode::ClassMenu);
    }

    pub fn show_class_menu(&mut self) {
        if self.class_menu.get().is_none() {
            warn!("class menu shown before its masks loaded");
            return;
        }
        info!("mode -> class menu");
        self.mode = Mode::ClassMenu;
    }

    pub fn open_custom_menu(&mut self) {
        self.request(Mode::CustomMenu);
    }

    pub fn show_custom_menu(&mut self) {
        if self.custom_menu.get().is_none() {
            warn!("custom menu shown before its masks loaded");
            return;
        }
        info!("mode -> custom menu");
        self.mode = Mode::CustomMenu;
        self.sync_avatar();
    }

    pub fn start_game(&mut self) {
        self.request(Mode::Game);
    }

    fn enter_game(&mut self) {
        let Some(map) = self.map.get() else {
            warn!("game started before map masks loaded");
            return;
        };
        let spawn = map.spawn.center_local();
        let area = Size::new(map.walk.width() as f64, map.walk.height() as f64);
        info!("mode -> game");
        self.economy.begin_session(&self.data, &self.config, spawn, area);
        self.mode = Mode::Game;
        self.held.clear();
        self.hud_timer = 0.0;
        self.refresh_hud();
    }

    pub fn show_screen(&mut self, title: &str) {
        info!("mode -> screen ({title})");
        self.mode = Mode::Screen;
        self.pending = None;
        self.economy.end_session();
        self.held.clear();
        self.screen_title = title.to_string();
    }

    /// Enter `target` now if its assets are ready, otherwise remember it and
    /// start the load. A newer request replaces an older pending one.
    fn request(&mut self, target: Mode) {
        let ticket = match target {
            Mode::ClassMenu => self.class_menu.request(),
            Mode::CustomMenu => self.custom_menu.request(),
            Mode::Game => self.map.request(),
            Mode::Menu | Mode::Screen => None,
        };
        if ticket.is_some() {
            self.pending = Some(target);
        } else {
            self.pending = None;
            self.enter(target);
        }
    }

    fn enter(&mut self, target: Mode) {
        match target {
            Mode::Menu => self.show_menu(),
            Mode::ClassMenu => self.show_class_menu(),
            Mode::CustomMenu => self.show_custom_menu(),
            Mode::Game => self.enter_game(),
            Mode::Screen => self.show_screen(""),
        }
    }

    // ── Frame update ─────────────────────────────────────────

    /// One frame. `dt` is in seconds.
    pub fn update(&mut self, dt: f64) {
        self.poll_gates();
        self.resume_pending();

        match self.mode {
            Mode::Menu => self.update_hover(),
            Mode::Game => self.update_game(dt),
            Mode::ClassMenu | Mode::CustomMenu | Mode::Screen => {}
        }
    }

    fn poll_gates(&mut self) {
        let source = self.source.as_ref();
        let threshold = self.config.alpha_threshold;
        self.class_menu.poll(|| ClassMenuMasks::load(source, threshold));
        self.custom_menu.poll(|| CustomMenuMasks::load(source, threshold));
        self.map.poll(|| MapMasks::load(source, threshold));
    }

    fn resume_pending(&mut self) {
        let Some(target) = self.pending else {
            return;
        };
        let ready = match target {
            Mode::ClassMenu => self.class_menu.get().is_some(),
            Mode::CustomMenu => self.custom_menu.get().is_some(),
            Mode::Game => self.map.get().is_some(),
            Mode::Menu | Mode::Screen => true,
        };
        if ready {
            self.pending = None;
            self.enter(target);
        }
    }

    fn update_hover(&mut self) {
        let anchor = self.canvas_center();
        let scale = self.menu_scale(&self.menu.area);
        let mask = if self.menu_hovered {
            &self.menu.hover
        } else {
            &self.menu.area
        };
        self.menu_hovered = mask.hit(self.pointer, anchor, scale);
    }

    fn update_game(&mut self, dt: f64) {
        let map_scale = self.map_scale();
        let axis = self.held.axis();
        let walk = self.map.get().map(|m| &m.walk);
        let defeated = self
            .economy
            .step(&self.data, &self.config, dt, axis, walk, map_scale);
        self.held.tick(dt);
        if defeated {
            self.show_screen(DEFEAT_MESSAGE);
            return;
        }
        self.hud_timer += dt;
        if self.hud_timer >= self.config.hud_interval_secs {
            self.hud_timer = 0.0;
            self.refresh_hud();
        }
    }

    fn refresh_hud(&mut self) {
        self.hud = Hud {
            status: self.economy.status_text(),
            info: self.economy.info_log().joined(),
            loot: self.economy.loot_log().joined(),
        };
    }

    // ── Input ────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved(p) => self.pointer = p,
            InputEvent::Click(p) => {
                self.pointer = p;
                self.click(p);
            }
            InputEvent::Move(dir) => {
                if self.mode == Mode::Game {
                    self.held.press(dir);
                }
            }
            InputEvent::Key(c) => {
                if c.eq_ignore_ascii_case(&'r') && self.mode == Mode::Game {
                    self.economy.spin_class(&self.data);
                }
            }
            InputEvent::Enter => match self.mode {
                Mode::Menu => self.start_game(),
                Mode::Game => {
                    self.economy
                        .start_dungeon(&self.data, &self.config, ENTER_DUNGEON_ID)
                }
                Mode::Screen => self.show_menu(),
                Mode::ClassMenu | Mode::CustomMenu => {}
            },
            InputEvent::Escape => match self.mode {
                Mode::Menu => {
                    if self.pending.take().is_some() {
                        info!("pending transition cancelled");
                    }
                }
                _ => self.show_menu(),
            },
        }
    }

    /// Route a click through the current mode's masks, first match wins.
    fn click(&mut self, point: Option<Point>) {
        let Some(point) = point else {
            return;
        };
        let anchor = self.canvas_center();
        match self.mode {
            Mode::Menu => {
                let scale = self.menu_scale(&self.menu.area);
                let hit = |m: &Mask| m.hit(Some(point), anchor, scale);
                if hit(&self.menu.play) {
                    self.start_game();
                } else if hit(&self.menu.class) {
                    self.open_class_menu();
                } else if hit(&self.menu.custom) {
                    self.open_custom_menu();
                }
            }
            Mode::ClassMenu => {
                let Some(masks) = self.class_menu.get() else {
                    return;
                };
                let scale = self.menu_scale(&masks.back);
                let (back, spin) = (
                    masks.back.hit(Some(point), anchor, scale),
                    masks.spin.hit(Some(point), anchor, scale),
                );
                if back {
                    self.show_menu();
                } else if spin {
                    self.economy.spin_class(&self.data);
                }
            }
            Mode::CustomMenu => {
                let Some(masks) = self.custom_menu.get() else {
                    return;
                };
                let scale = self.menu_scale(&masks.back);
                let hit = |m: &Mask| m.hit(Some(point), anchor, scale);
                if hit(&masks.back) {
                    self.show_menu();
                } else if hit(&masks.scroll_left) {
                    self.avatar_index -= 1;
                    self.sync_avatar();
                } else if hit(&masks.scroll_right) {
                    self.avatar_index += 1;
                    self.sync_avatar();
                }
            }
            Mode::Game | Mode::Screen => {}
        }
    }

    fn sync_avatar(&mut self) {
        if let Some(avatar) = avatar_at(AVATARS, self.avatar_index) {
            self.selected_avatar_id = avatar.id;
        }
    }

    // ── Views ────────────────────────────────────────────────

    pub fn class_menu_view(&self) -> Option<ClassMenuView> {
        let masks = self.class_menu.get()?;
        let anchor = self.canvas_center();
        let scale = self.menu_scale(&masks.back);
        let description_width = masks.description.bounds().map_or(520.0, |b| {
            ((b.max_x - b.min_x) as f64 * scale * 0.85).max(200.0)
        });
        Some(ClassMenuView {
            summary: class_summary(&self.data, self.economy.selected_class_id()),
            current_at: masks.current.center_world(anchor, scale),
            description_at: masks.description.center_world(anchor, scale),
            rolls_at: masks.rolls.center_world(anchor, scale),
            description_width,
        })
    }

    pub fn custom_menu_view(&self) -> Option<CustomMenuView> {
        let masks = self.custom_menu.get()?;
        let anchor = self.canvas_center();
        let scale = self.menu_scale(&masks.back);
        let slot = |mask: &Mask, offset: i64| {
            avatar_at(AVATARS, self.avatar_index + offset).map(|avatar| PreviewSlot {
                avatar: *avatar,
                center: mask.center_world(anchor, scale),
                size: mask.size_world(scale),
            })
        };
        Some(CustomMenuView {
            current: slot(&masks.current, 0)?,
            left: slot(&masks.left, -1)?,
            right: slot(&masks.right, 1)?,
        })
    }

    /// Camera for the current frame, if a game session is running.
    pub fn game_camera(&self) -> Option<Camera> {
        let map = self.map.get()?;
        let session = self.economy.session()?;
        let size = Size::new(map.walk.width() as f64, map.walk.height() as f64);
        Some(camera(size, self.map_scale(), session.player_pos, self.canvas()))
    }
}
