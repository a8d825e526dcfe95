//! Draws the controller's current mode onto the terminal grid.
//!
//! Sprites are the hit-test masks themselves: every cell samples the world
//! point under its center and takes the look of the topmost mask that is
//! opaque there. Text is laid out at the world anchors the controller
//! computes, so what you see lines up with what you can click.

use ratzilla::ratatui::buffer::Buffer;
use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};
use ratzilla::ratatui::Frame;

use crate::click::GridState;
use crate::controller::{Controller, Mode, AVATARS};
use crate::geom::{Point, Size};
use crate::mask::Mask;
use crate::viewport::Viewport;

const HUD_WIDTH: u16 = 32;

// ── Scene widget ───────────────────────────────────────────────

struct Layer<'a> {
    mask: &'a Mask,
    anchor: Point,
    scale: f64,
    fill: char,
    style: Style,
}

/// Mask layers sampled per cell. Later layers paint over earlier ones.
struct Scene<'a> {
    grid: GridState,
    viewport: Viewport,
    layers: Vec<Layer<'a>>,
}

impl<'a> Scene<'a> {
    fn new(grid: GridState, viewport: Viewport) -> Self {
        Self {
            grid,
            viewport,
            layers: Vec::new(),
        }
    }

    fn layer(mut self, mask: &'a Mask, anchor: Point, scale: f64, fill: char, style: Style) -> Self {
        self.layers.push(Layer {
            mask,
            anchor,
            scale,
            fill,
            style,
        });
        self
    }
}

impl Widget for Scene<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in area.top()..area.bottom() {
            for col in area.left()..area.right() {
                let Some(p) = self.grid.cell_to_world(&self.viewport, col, row) else {
                    continue;
                };
                let top = self
                    .layers
                    .iter()
                    .rev()
                    .find(|l| l.mask.hit(Some(p), l.anchor, l.scale));
                if let (Some(layer), Some(cell)) = (top, buf.cell_mut((col, row))) {
                    cell.set_char(layer.fill).set_style(layer.style);
                }
            }
        }
    }
}

// ── Layout helpers ─────────────────────────────────────────────

/// A `width`×`height` rect centered on a cell, shifted to stay inside `area`.
pub fn centered_rect(area: Rect, col: u16, row: u16, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let max_x = area.right().saturating_sub(width);
    let max_y = area.bottom().saturating_sub(height);
    let x = col.saturating_sub(width / 2).clamp(area.x, max_x.max(area.x));
    let y = row.saturating_sub(height / 2).clamp(area.y, max_y.max(area.y));
    Rect::new(x, y, width, height)
}

/// Rows `text` takes when wrapped to `width` columns.
pub fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    text.lines()
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum::<usize>()
        .min(u16::MAX as usize) as u16
}

/// Bordered panel tall enough for `lines` rows of log text.
pub fn log_panel_height(lines: usize) -> u16 {
    u16::try_from(lines).unwrap_or(u16::MAX).saturating_add(2)
}

fn text_width(text: &str) -> u16 {
    text.lines()
        .map(|l| Line::from(l).width())
        .max()
        .unwrap_or(0)
        .min(u16::MAX as usize) as u16
}

struct Painter<'f, 'a> {
    f: &'f mut Frame<'a>,
    grid: GridState,
    viewport: Viewport,
}

impl Painter<'_, '_> {
    fn area(&self) -> Rect {
        self.f.area()
    }

    /// Centered text at a world point. `wrap` is the width in world units.
    fn text(&mut self, at: Point, text: &str, wrap: Option<f64>, style: Style) {
        let Some((col, row)) = self.grid.world_to_cell(&self.viewport, at) else {
            return;
        };
        let (width, height) = match wrap {
            Some(world_width) => {
                let cols = ((world_width * self.viewport.zoom()).floor() as u16).max(8);
                (cols, wrapped_height(text, cols))
            }
            None => (text_width(text), text.lines().count().max(1) as u16),
        };
        let rect = centered_rect(self.area(), col, row, width, height);
        let paragraph = Paragraph::new(text.to_string())
            .style(style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        self.f.render_widget(paragraph, rect);
    }

    fn glyph(&mut self, at: Point, glyph: char, style: Style) {
        let Some((col, row)) = self.grid.world_to_cell(&self.viewport, at) else {
            return;
        };
        if let Some(cell) = self.f.buffer_mut().cell_mut((col, row)) {
            cell.set_char(glyph).set_style(style);
        }
    }

    fn scene(&mut self, scene: Scene<'_>) {
        let area = self.area();
        self.f.render_widget(scene, area);
    }
}

// ── Entry point ────────────────────────────────────────────────

pub fn render(f: &mut Frame, c: &Controller, grid: GridState) {
    let viewport = grid.viewport(c.canvas());
    let mut p = Painter { f, grid, viewport };

    match c.mode() {
        Mode::Menu => render_menu(&mut p, c),
        Mode::ClassMenu => render_class_menu(&mut p, c),
        Mode::CustomMenu => render_custom_menu(&mut p, c),
        Mode::Game => render_game(&mut p, c),
        Mode::Screen => render_screen(&mut p, c),
    }

    render_help(p.f, c.mode());

    if let Some(message) = c.loading_message() {
        render_overlay(p.f, &message);
    }
}

fn button() -> Style {
    Style::default().fg(Color::Black).bg(Color::Yellow)
}

fn panel() -> Style {
    Style::default().fg(Color::White).bg(Color::DarkGray)
}

fn render_menu(p: &mut Painter, c: &Controller) {
    let m = c.menu_masks();
    let anchor = c.canvas_center();
    let scale = c.menu_scale(&m.area);
    let (backdrop, backdrop_style) = if c.menu_hovered() {
        (&m.hover, Style::default().bg(Color::Blue))
    } else {
        (&m.area, Style::default().bg(Color::DarkGray))
    };

    p.scene(
        Scene::new(p.grid, p.viewport)
            .layer(backdrop, anchor, scale, ' ', backdrop_style)
            .layer(&m.play, anchor, scale, ' ', button())
            .layer(&m.class, anchor, scale, ' ', button())
            .layer(&m.custom, anchor, scale, ' ', button()),
    );

    let label = button().add_modifier(Modifier::BOLD);
    p.text(m.play.center_world(anchor, scale), "Play", None, label);
    p.text(m.class.center_world(anchor, scale), "Class", None, label);
    p.text(m.custom.center_world(anchor, scale), "Custom", None, label);
}

fn render_class_menu(p: &mut Painter, c: &Controller) {
    let (Some(m), Some(view)) = (c.class_menu_masks(), c.class_menu_view()) else {
        return;
    };
    let anchor = c.canvas_center();
    let scale = c.menu_scale(&m.back);

    p.scene(
        Scene::new(p.grid, p.viewport)
            .layer(&m.description, anchor, scale, ' ', panel())
            .layer(&m.current, anchor, scale, ' ', panel())
            .layer(&m.rolls, anchor, scale, ' ', panel())
            .layer(&m.back, anchor, scale, ' ', Style::default().bg(Color::Red))
            .layer(&m.spin, anchor, scale, ' ', button()),
    );

    let summary = &view.summary;
    p.text(view.current_at, &summary.current, None, panel().add_modifier(Modifier::BOLD));
    p.text(
        view.description_at,
        &summary.description,
        Some(view.description_width),
        panel(),
    );
    p.text(view.rolls_at, &summary.rolls, None, panel());
    p.text(
        m.back.center_world(anchor, scale),
        "Back",
        None,
        Style::default().fg(Color::White).bg(Color::Red),
    );
    p.text(m.spin.center_world(anchor, scale), "Spin", None, button().add_modifier(Modifier::BOLD));
}

fn render_custom_menu(p: &mut Painter, c: &Controller) {
    let (Some(m), Some(view)) = (c.custom_menu_masks(), c.custom_menu_view()) else {
        return;
    };
    let anchor = c.canvas_center();
    let scale = c.menu_scale(&m.back);
    let slot = Style::default().bg(Color::DarkGray);

    p.scene(
        Scene::new(p.grid, p.viewport)
            .layer(&m.left, anchor, scale, ' ', slot)
            .layer(&m.right, anchor, scale, ' ', slot)
            .layer(&m.current, anchor, scale, ' ', panel())
            .layer(&m.back, anchor, scale, ' ', Style::default().bg(Color::Red))
            .layer(&m.scroll_left, anchor, scale, ' ', button())
            .layer(&m.scroll_right, anchor, scale, ' ', button()),
    );

    let dim = slot.fg(Color::Gray);
    p.glyph(view.left.center, view.left.avatar.glyph, dim);
    p.glyph(view.right.center, view.right.avatar.glyph, dim);
    let current = &view.current;
    p.glyph(
        current.center,
        current.avatar.glyph,
        panel().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    );
    let name_at = Point::new(current.center.x, current.center.y + current.size.height / 4.0);
    p.text(name_at, current.avatar.name, None, panel());

    p.text(
        m.back.center_world(anchor, scale),
        "Back",
        None,
        Style::default().fg(Color::White).bg(Color::Red),
    );
    p.text(m.scroll_left.center_world(anchor, scale), "<", None, button());
    p.text(m.scroll_right.center_world(anchor, scale), ">", None, button());
}

fn render_game(p: &mut Painter, c: &Controller) {
    let (Some(map), Some(cam), Some(session)) =
        (c.map_masks(), c.game_camera(), c.economy().session())
    else {
        return;
    };
    let scale = c.map_scale();
    let map_size = Size::new(map.walk.width() as f64, map.walk.height() as f64);

    p.scene(Scene::new(p.grid, p.viewport).layer(
        &map.walk,
        cam.map_center,
        scale,
        '.',
        Style::default().fg(Color::DarkGray),
    ));

    let enemy_style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
    for enemy in &session.enemies {
        let glyph = enemy.kind.chars().next().unwrap_or('?');
        p.glyph(cam.map_to_world(map_size, scale, enemy.pos), glyph, enemy_style);
    }

    let glyph = AVATARS
        .iter()
        .find(|a| a.id == c.selected_avatar_id())
        .map_or('@', |a| a.glyph);
    p.glyph(
        cam.player_screen,
        glyph,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    );

    render_hud(p.f, c);
}

fn render_hud(f: &mut Frame, c: &Controller) {
    let hud = c.hud();
    let area = f.area();
    let column = Rect::new(
        area.x,
        area.y,
        HUD_WIDTH.min(area.width),
        area.height.saturating_sub(3),
    );
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(log_panel_height(c.config().info_log_cap)),
            Constraint::Min(3),
        ])
        .split(column);

    let sections = [
        (" Status ", hud.status.as_str(), Color::Green),
        (" Info ", hud.info.as_str(), Color::Cyan),
        (" Loot ", hud.loot.as_str(), Color::Magenta),
    ];
    for ((title, text, color), chunk) in sections.into_iter().zip(chunks.iter()) {
        let widget = Paragraph::new(text.to_string())
            .style(Style::default().fg(Color::White))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(title),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(Clear, *chunk);
        f.render_widget(widget, *chunk);
    }
}

fn render_screen(p: &mut Painter, c: &Controller) {
    let area = p.area();
    let title = Paragraph::new(Line::from(Span::styled(
        c.screen_title().to_string(),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    let row = centered_rect(area, area.width / 2, area.height / 2, area.width, 1);
    p.f.render_widget(title, row);
}

fn render_help(f: &mut Frame, mode: Mode) {
    let text = match mode {
        Mode::Menu => "Click Play, Class or Custom  [Enter] Play",
        Mode::ClassMenu => "Click Spin to roll a class  [Esc] Back",
        Mode::CustomMenu => "Click < > to browse avatars  [Esc] Back",
        Mode::Game => "[WASD] Move  [R] Spin class  [Enter] Dungeon  [Esc] Menu",
        Mode::Screen => "[Enter] Back to menu",
    };
    let area = f.area();
    if area.height < 3 {
        return;
    }
    let bar = Rect::new(area.x, area.bottom() - 3, area.width, 3);
    let help = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(Clear, bar);
    f.render_widget(help, bar);
}

fn render_overlay(f: &mut Frame, message: &str) {
    let area = f.area();
    let width = (text_width(message) + 4).min(area.width);
    let height = (message.lines().count() as u16 + 2).min(area.height);
    let rect = centered_rect(area, area.width / 2, area.height / 2, width, height);
    let overlay = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(overlay, rect);
}
