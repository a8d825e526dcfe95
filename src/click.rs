/// Pointer handling for the terminal grid.
///
/// The DOM grid is treated as the host element of the logical canvas. Its
/// coordinates are measured in "host units": one unit per column horizontally
/// and `CELL_ASPECT` units per row vertically, so a square canvas stays square
/// on screen. This module keeps the pure conversions separate from web_sys DOM
/// access so they can be unit tested.
use crate::geom::{Point, Size};
use crate::viewport::Viewport;

/// Height of a terminal cell relative to its width.
pub const CELL_ASPECT: f64 = 2.0;

/// Grid dimensions shared between the render loop and the mouse handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridState {
    pub cols: u16,
    pub rows: u16,
}

impl GridState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    pub fn host_size(&self) -> Size {
        Size::new(self.cols as f64, self.rows as f64 * CELL_ASPECT)
    }

    /// Canvas placement for the current grid.
    pub fn viewport(&self, canvas: Size) -> Viewport {
        Viewport::fit(self.host_size(), canvas)
    }

    /// World point under the center of a cell.
    pub fn cell_to_world(&self, vp: &Viewport, col: u16, row: u16) -> Option<Point> {
        vp.to_world(col as f64 + 0.5, (row as f64 + 0.5) * CELL_ASPECT)
    }

    /// Cell containing a world point, if it lies on the grid.
    pub fn world_to_cell(&self, vp: &Viewport, p: Point) -> Option<(u16, u16)> {
        let (hx, hy) = vp.to_screen(p);
        let col = hx.floor();
        let row = (hy / CELL_ASPECT).floor();
        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }
        if col >= self.cols as f64 || row >= self.rows as f64 {
            return None;
        }
        Some((col as u16, row as u16))
    }

    /// Convert a pixel offset inside the grid container to host units.
    ///
    /// `click_x`/`click_y` are relative to the container's top-left corner.
    /// Returns `None` if the pixel is outside the grid or inputs are invalid.
    pub fn pixel_to_host(
        &self,
        click_x: f64,
        click_y: f64,
        grid_width: f64,
        grid_height: f64,
    ) -> Option<(f64, f64)> {
        if self.is_empty() || grid_width <= 0.0 || grid_height <= 0.0 {
            return None;
        }
        if click_x < 0.0 || click_y < 0.0 || click_x >= grid_width || click_y >= grid_height {
            return None;
        }
        let host = self.host_size();
        Some((
            click_x / grid_width * host.width,
            click_y / grid_height * host.height,
        ))
    }

    /// Full pipeline from a grid-relative pixel to a world point.
    pub fn pixel_to_world(
        &self,
        canvas: Size,
        click_x: f64,
        click_y: f64,
        grid_width: f64,
        grid_height: f64,
    ) -> Option<Point> {
        let (hx, hy) = self.pixel_to_host(click_x, click_y, grid_width, grid_height)?;
        self.viewport(canvas).to_world(hx, hy)
    }
}
