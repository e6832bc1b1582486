// Grid geometry
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRID_COLS: u32 = 12;
pub const DEFAULT_GRID_ROWS: u32 = 16;
pub const DEFAULT_CELL_WIDTH_PX: f64 = 80.0;
pub const DEFAULT_CELL_HEIGHT_PX: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: u32,
    pub y: u32,
}

impl GridPoint {
    pub const ORIGIN: GridPoint = GridPoint { x: 0, y: 0 };

    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Occupied cells `[x, x+width) × [y, y+height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRect {
    pub origin: GridPoint,
    pub size: GridSize,
}

impl GridRect {
    pub fn new(origin: GridPoint, size: GridSize) -> Self {
        Self { origin, size }
    }

    pub fn right(&self) -> u32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> u32 {
        self.origin.y + self.size.height
    }

    pub fn overlaps(&self, other: &GridRect) -> bool {
        self.origin.x < other.right()
            && other.origin.x < self.right()
            && self.origin.y < other.bottom()
            && other.origin.y < self.bottom()
    }
}

/// Arrow-key direction for keyboard nudges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Fixed grid dimensions and the pixel size of one cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub cols: u32,
    pub rows: u32,
    pub cell_width_px: f64,
    pub cell_height_px: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            cols: DEFAULT_GRID_COLS,
            rows: DEFAULT_GRID_ROWS,
            cell_width_px: DEFAULT_CELL_WIDTH_PX,
            cell_height_px: DEFAULT_CELL_HEIGHT_PX,
        }
    }
}

impl GridSpec {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            ..Default::default()
        }
    }

    /// Size limited to `[1, cols] × [1, rows]`
    pub fn clamp_size(&self, size: GridSize) -> GridSize {
        GridSize::new(
            size.width.clamp(1, self.cols),
            size.height.clamp(1, self.rows),
        )
    }

    /// Position limited so a `size` rectangle stays on the grid
    pub fn clamp_position(&self, x: i64, y: i64, size: GridSize) -> GridPoint {
        let max_x = i64::from(self.cols.saturating_sub(size.width));
        let max_y = i64::from(self.rows.saturating_sub(size.height));
        GridPoint::new(x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32)
    }

    /// Size limited so that a rectangle anchored at `origin` stays on the grid
    pub fn clamp_size_at(&self, origin: GridPoint, width: i64, height: i64) -> GridSize {
        let max_w = i64::from(self.cols.saturating_sub(origin.x).max(1));
        let max_h = i64::from(self.rows.saturating_sub(origin.y).max(1));
        GridSize::new(width.clamp(1, max_w) as u32, height.clamp(1, max_h) as u32)
    }

    /// Round a pointer delta in pixels to whole cells
    pub fn pixels_to_cells(&self, dx_px: f64, dy_px: f64) -> (i64, i64) {
        let cols = if self.cell_width_px > 0.0 {
            (dx_px / self.cell_width_px).round() as i64
        } else {
            0
        };
        let rows = if self.cell_height_px > 0.0 {
            (dy_px / self.cell_height_px).round() as i64
        } else {
            0
        };
        (cols, rows)
    }

    pub fn contains(&self, rect: &GridRect) -> bool {
        rect.size.width >= 1
            && rect.size.height >= 1
            && rect.right() <= self.cols
            && rect.bottom() <= self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlaps() {
        let a = GridRect::new(GridPoint::new(0, 0), GridSize::new(2, 2));
        let b = GridRect::new(GridPoint::new(1, 1), GridSize::new(2, 2));
        let c = GridRect::new(GridPoint::new(2, 0), GridSize::new(2, 2));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_clamp_position() {
        let spec = GridSpec::new(12, 16);
        let size = GridSize::new(4, 3);
        assert_eq!(spec.clamp_position(-3, 2, size), GridPoint::new(0, 2));
        assert_eq!(spec.clamp_position(11, 20, size), GridPoint::new(8, 13));
    }

    #[test]
    fn test_clamp_size_at() {
        let spec = GridSpec::new(12, 16);
        let origin = GridPoint::new(10, 15);
        assert_eq!(spec.clamp_size_at(origin, 5, 5), GridSize::new(2, 1));
        assert_eq!(spec.clamp_size_at(origin, 0, -4), GridSize::new(1, 1));
    }

    #[test]
    fn test_pixels_to_cells() {
        let spec = GridSpec::default();
        assert_eq!(spec.pixels_to_cells(119.0, -31.0), (1, -1));
        assert_eq!(spec.pixels_to_cells(39.0, 29.0), (0, 0));
        assert_eq!(spec.pixels_to_cells(-240.0, 180.0), (-3, 3));
    }
}
