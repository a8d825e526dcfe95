//! Screen ↔ world mapping for the fixed-size logical canvas.
//!
//! The game is laid out on a square logical canvas (1920×1920 by default).
//! The host element can be any size; the canvas is letterboxed inside it.

use crate::config::GameConfig;
use crate::geom::{Point, Size};

/// Placement of the logical canvas inside the host element, in host pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    left: f64,
    top: f64,
    /// Host pixels per world unit.
    zoom: f64,
    logical: Size,
}

impl Viewport {
    /// Largest aspect-preserving fit of `logical` centered in `host`.
    pub fn fit(host: Size, logical: Size) -> Self {
        let zoom = (host.width / logical.width).min(host.height / logical.height);
        let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
        Self {
            left: (host.width - logical.width * zoom) / 2.0,
            top: (host.height - logical.height * zoom) / 2.0,
            zoom,
            logical,
        }
    }

    /// Host pixels per world unit.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// World coordinates of a host pixel, or `None` outside the canvas.
    pub fn to_world(&self, px: f64, py: f64) -> Option<Point> {
        let nx = (px - self.left) / (self.logical.width * self.zoom);
        let ny = (py - self.top) / (self.logical.height * self.zoom);
        if !(0.0..=1.0).contains(&nx) || !(0.0..=1.0).contains(&ny) {
            return None;
        }
        Some(Point::new(nx * self.logical.width, ny * self.logical.height))
    }

    /// Host pixel of a world point.
    pub fn to_screen(&self, p: Point) -> (f64, f64) {
        (self.left + p.x * self.zoom, self.top + p.y * self.zoom)
    }
}

/// Scale that makes a sprite `sprite_width` pixels wide fill the UI fraction
/// of the canvas. Degenerate widths get the bare UI scale.
pub fn fit_scale(config: &GameConfig, sprite_width: f64) -> f64 {
    if !sprite_width.is_finite() || sprite_width <= 0.0 {
        return config.ui_scale;
    }
    config.ui_scale * config.canvas_width / sprite_width
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World position of the map's center.
    pub map_center: Point,
    pub player_screen: Point,
}

impl Camera {
    /// World position of a point given in map pixels.
    pub fn map_to_world(&self, map_size: Size, map_scale: f64, p: Point) -> Point {
        Point::new(
            self.map_center.x - map_size.width * map_scale / 2.0 + p.x * map_scale,
            self.map_center.y - map_size.height * map_scale / 2.0 + p.y * map_scale,
        )
    }
}

/// Follow the player (given in map pixels) without showing past the map
/// edge. A map smaller than the canvas on an axis is centered on it.
pub fn camera(map_size: Size, map_scale: f64, player: Point, canvas: Size) -> Camera {
    let half_w = map_size.width * map_scale / 2.0;
    let half_h = map_size.height * map_scale / 2.0;

    let follow = |canvas_extent: f64, half: f64, p: f64| {
        if half <= canvas_extent / 2.0 {
            canvas_extent / 2.0
        } else {
            (canvas_extent / 2.0 + half - p * map_scale).clamp(canvas_extent - half, half)
        }
    };
    let map_center = Point::new(
        follow(canvas.width, half_w, player.x),
        follow(canvas.height, half_h, player.y),
    );
    let mut cam = Camera {
        map_center,
        player_screen: Point::default(),
    };
    cam.player_screen = cam.map_to_world(map_size, map_scale, player);
    cam
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Size = Size::new(1920.0, 1920.0);

    // ── letterbox ──────────────────────────────────────────────────

    #[test]
    fn wide_host_letterboxes_horizontally() {
        let vp = Viewport::fit(Size::new(1920.0, 960.0), CANVAS);
        // 960px square centered: x in [480, 1440]
        assert_eq!(vp.to_world(480.0, 0.0), Some(Point::new(0.0, 0.0)));
        assert_eq!(vp.to_world(960.0, 480.0), Some(Point::new(960.0, 960.0)));
        assert_eq!(vp.to_world(1440.0, 960.0), Some(Point::new(1920.0, 1920.0)));
        assert_eq!(vp.to_world(479.0, 480.0), None);
        assert_eq!(vp.to_world(1441.0, 480.0), None);
    }

    #[test]
    fn tall_host_letterboxes_vertically() {
        let vp = Viewport::fit(Size::new(480.0, 960.0), CANVAS);
        assert_eq!(vp.to_world(240.0, 480.0), Some(Point::new(960.0, 960.0)));
        assert_eq!(vp.to_world(240.0, 200.0), None);
    }

    #[test]
    fn to_screen_inverts_to_world() {
        let vp = Viewport::fit(Size::new(1000.0, 500.0), CANVAS);
        let p = Point::new(300.0, 1500.0);
        let (sx, sy) = vp.to_screen(p);
        let back = vp.to_world(sx, sy).unwrap();
        assert!((back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn empty_host_does_not_divide_by_zero() {
        let vp = Viewport::fit(Size::new(0.0, 0.0), CANVAS);
        assert!(vp.to_world(f64::NAN, 0.0).is_none());
    }

    // ── scales ─────────────────────────────────────────────────────

    #[test]
    fn fit_scale_fills_ui_fraction() {
        let cfg = GameConfig::default();
        assert!((fit_scale(&cfg, 64.0) - 27.0).abs() < 1e-9);
        assert_eq!(fit_scale(&cfg, 0.0), cfg.ui_scale);
        assert_eq!(fit_scale(&cfg, f64::NAN), cfg.ui_scale);
    }

    // ── camera ─────────────────────────────────────────────────────

    #[test]
    fn small_map_is_centered() {
        let cam = camera(Size::new(10.0, 10.0), 10.0, Point::new(2.0, 8.0), CANVAS);
        assert_eq!(cam.map_center, Point::new(960.0, 960.0));
        assert_eq!(cam.player_screen, Point::new(930.0, 990.0));
    }

    #[test]
    fn large_map_follows_player() {
        // 400 px map at scale 10 = 4000 world units; player mid-map.
        let cam = camera(Size::new(400.0, 400.0), 10.0, Point::new(200.0, 200.0), CANVAS);
        assert_eq!(cam.player_screen, Point::new(960.0, 960.0));
    }

    #[test]
    fn map_to_world_matches_player_screen() {
        let map = Size::new(400.0, 400.0);
        let cam = camera(map, 10.0, Point::new(120.0, 40.0), CANVAS);
        assert_eq!(cam.map_to_world(map, 10.0, Point::new(120.0, 40.0)), cam.player_screen);
        let other = cam.map_to_world(map, 10.0, Point::new(121.0, 40.0));
        assert_eq!(other.x - cam.player_screen.x, 10.0);
    }

    #[test]
    fn large_map_clamps_at_edges() {
        let map = Size::new(400.0, 400.0);
        let cam = camera(map, 10.0, Point::new(0.0, 400.0), CANVAS);
        // Left edge pinned to x=0, bottom edge pinned to y=1920.
        assert_eq!(cam.map_center, Point::new(2000.0, 1920.0 - 2000.0));
        assert_eq!(cam.player_screen, Point::new(0.0, 1920.0));
    }
}
