//! Plain 2D value types shared by the hit-test, viewport and economy code.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned overlap of two squares given by center and edge length.
/// Touching edges do not count.
pub fn squares_overlap(a: Point, a_size: f64, b: Point, b_size: f64) -> bool {
    let reach = (a_size + b_size) / 2.0;
    (a.x - b.x).abs() < reach && (a.y - b.y).abs() < reach
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_squares() {
        assert!(squares_overlap(Point::new(0.0, 0.0), 4.0, Point::new(3.0, 0.0), 3.0));
        assert!(squares_overlap(Point::new(5.0, 5.0), 4.0, Point::new(5.0, 5.0), 3.0));
    }

    #[test]
    fn separated_or_touching_squares() {
        // reach = 3.5
        assert!(!squares_overlap(Point::new(0.0, 0.0), 4.0, Point::new(3.5, 0.0), 3.0));
        assert!(!squares_overlap(Point::new(0.0, 0.0), 4.0, Point::new(0.0, 10.0), 3.0));
    }
}
