//! Input events and held-key emulation.
//!
//! The browser shell only reports key presses, not key state. Movement needs
//! "is this key down", so [`HeldAxes`] treats each press as holding its
//! direction for a short window; auto-repeat keeps extending it.

use crate::geom::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// All input the controller reacts to, normalized from keyboard and mouse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A printable key press.
    Key(char),
    Enter,
    Escape,
    /// WASD or an arrow key.
    Move(Direction),
    /// Pointer position in world coordinates; `None` outside the canvas.
    PointerMoved(Option<Point>),
    /// Primary button press at a world position.
    Click(Option<Point>),
}

/// Maps a printable key to a movement direction (WASD).
pub fn wasd(c: char) -> Option<Direction> {
    match c.to_ascii_lowercase() {
        'w' => Some(Direction::Up),
        's' => Some(Direction::Down),
        'a' => Some(Direction::Left),
        'd' => Some(Direction::Right),
        _ => None,
    }
}

/// Remaining hold time per direction.
#[derive(Debug, Clone, PartialEq)]
pub struct HeldAxes {
    hold_secs: f64,
    up: f64,
    down: f64,
    left: f64,
    right: f64,
}

impl HeldAxes {
    pub fn new(hold_secs: f64) -> Self {
        Self {
            hold_secs,
            up: 0.0,
            down: 0.0,
            left: 0.0,
            right: 0.0,
        }
    }

    pub fn press(&mut self, dir: Direction) {
        *self.slot(dir) = self.hold_secs;
    }

    /// Age every held direction by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        for t in [&mut self.up, &mut self.down, &mut self.left, &mut self.right] {
            *t = (*t - dt).max(0.0);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.hold_secs);
    }

    /// Raw axis in `{-1, 0, 1}²`; opposite keys cancel.
    pub fn axis(&self) -> (f64, f64) {
        let held = |t: f64| if t > 0.0 { 1.0 } else { 0.0 };
        (
            held(self.right) - held(self.left),
            held(self.down) - held(self.up),
        )
    }

    fn slot(&mut self, dir: Direction) -> &mut f64 {
        match dir {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_mapping() {
        assert_eq!(wasd('w'), Some(Direction::Up));
        assert_eq!(wasd('A'), Some(Direction::Left));
        assert_eq!(wasd('r'), None);
    }

    #[test]
    fn press_holds_until_window_expires() {
        let mut axes = HeldAxes::new(0.15);
        axes.press(Direction::Right);
        assert_eq!(axes.axis(), (1.0, 0.0));
        axes.tick(0.1);
        assert_eq!(axes.axis(), (1.0, 0.0));
        axes.tick(0.1);
        assert_eq!(axes.axis(), (0.0, 0.0));
    }

    #[test]
    fn repeat_extends_hold() {
        let mut axes = HeldAxes::new(0.15);
        axes.press(Direction::Up);
        axes.tick(0.1);
        axes.press(Direction::Up);
        axes.tick(0.1);
        assert_eq!(axes.axis(), (0.0, -1.0));
    }

    #[test]
    fn diagonal_and_opposites() {
        let mut axes = HeldAxes::new(0.15);
        axes.press(Direction::Down);
        axes.press(Direction::Left);
        assert_eq!(axes.axis(), (-1.0, 1.0));
        axes.press(Direction::Right);
        assert_eq!(axes.axis(), (0.0, 1.0));
    }

    #[test]
    fn clear_releases_everything() {
        let mut axes = HeldAxes::new(0.15);
        axes.press(Direction::Down);
        axes.clear();
        assert_eq!(axes.axis(), (0.0, 0.0));
    }
}
