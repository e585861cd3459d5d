//! Board coordinates and geometry.
//!
//! Cells are addressed as `(row, col)` with row 0 at the top of the board
//! (black's back rank in the standard setup). Pixel positions follow screen
//! conventions: `x` grows with the column, `y` grows with the row.

use std::fmt;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

// =============================================================================
// Cell
// =============================================================================

/// A board cell addressed by row and column.
///
/// Coordinates are signed so that offsets can be applied without casts;
/// whether a cell is on the board is a question for [`BoardGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Row index (0 = top).
    pub row: i32,
    /// Column index (0 = left).
    pub col: i32,
}

impl Cell {
    /// Creates a cell from row and column.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns this cell shifted by a `(row, col)` delta.
    #[must_use]
    pub const fn offset(self, dr: i32, dc: i32) -> Self {
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    /// Chebyshev (king-move) distance between two cells.
    #[must_use]
    pub fn chebyshev(self, other: Cell) -> u32 {
        let dr = (self.row - other.row).unsigned_abs();
        let dc = (self.col - other.col).unsigned_abs();
        dr.max(dc)
    }

    /// Unit step direction from `self` toward `other`, each axis in `{-1, 0, 1}`.
    #[must_use]
    pub fn direction_to(self, other: Cell) -> (i32, i32) {
        (
            (other.row - self.row).signum(),
            (other.col - self.col).signum(),
        )
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.row, cell.col)
    }
}

// =============================================================================
// Board Geometry
// =============================================================================

/// Board dimensions and the pixel size of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardGeometry {
    /// Number of rows.
    pub rows: i32,
    /// Number of columns.
    pub cols: i32,
    /// Cell width in pixels.
    pub cell_width: i32,
    /// Cell height in pixels.
    pub cell_height: i32,
}

impl BoardGeometry {
    /// Standard 8x8 board with 100px cells.
    pub const STANDARD: Self = Self {
        rows: 8,
        cols: 8,
        cell_width: 100,
        cell_height: 100,
    };

    /// Returns true if the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.row < self.rows && cell.col >= 0 && cell.col < self.cols
    }

    /// Top-left pixel of a cell, `(col * cell_width, row * cell_height)`.
    #[must_use]
    pub const fn pixel_origin(&self, cell: Cell) -> IVec2 {
        IVec2::new(cell.col * self.cell_width, cell.row * self.cell_height)
    }

    /// Pixel origin of a cell as floating point, for interpolation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_origin_f32(&self, cell: Cell) -> Vec2 {
        let origin = self.pixel_origin(cell);
        Vec2::new(origin.x as f32, origin.y as f32)
    }

    /// Iterates every cell on the board in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Cell::new(row, col)))
    }
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod cell_tests {
        use super::*;

        #[test]
        fn chebyshev_takes_the_longer_axis() {
            assert_eq!(Cell::new(6, 0).chebyshev(Cell::new(4, 0)), 2);
            assert_eq!(Cell::new(0, 0).chebyshev(Cell::new(3, 1)), 3);
            assert_eq!(Cell::new(2, 2).chebyshev(Cell::new(2, 2)), 0);
        }

        #[test]
        fn direction_is_unit_per_axis() {
            assert_eq!(Cell::new(0, 0).direction_to(Cell::new(0, 3)), (0, 1));
            assert_eq!(Cell::new(5, 5).direction_to(Cell::new(1, 7)), (-1, 1));
            assert_eq!(Cell::new(5, 5).direction_to(Cell::new(5, 5)), (0, 0));
        }

        #[test]
        fn tuple_conversions() {
            let cell: Cell = (3, 4).into();
            assert_eq!(cell, Cell::new(3, 4));
            let back: (i32, i32) = cell.into();
            assert_eq!(back, (3, 4));
        }

        #[test]
        fn display_format() {
            assert_eq!(format!("{}", Cell::new(6, 0)), "(6, 0)");
        }
    }

    mod geometry_tests {
        use super::*;

        #[test]
        fn contains_respects_bounds() {
            let board = BoardGeometry::STANDARD;
            assert!(board.contains(Cell::new(0, 0)));
            assert!(board.contains(Cell::new(7, 7)));
            assert!(!board.contains(Cell::new(8, 0)));
            assert!(!board.contains(Cell::new(0, -1)));
        }

        #[test]
        fn pixel_origin_uses_col_for_x() {
            let board = BoardGeometry {
                rows: 8,
                cols: 8,
                cell_width: 50,
                cell_height: 60,
            };
            assert_eq!(board.pixel_origin(Cell::new(2, 3)), IVec2::new(150, 120));
        }

        #[test]
        fn cells_are_row_major() {
            let board = BoardGeometry {
                rows: 2,
                cols: 3,
                ..BoardGeometry::STANDARD
            };
            let cells: Vec<_> = board.cells().collect();
            assert_eq!(cells.len(), 6);
            assert_eq!(cells[0], Cell::new(0, 0));
            assert_eq!(cells[3], Cell::new(1, 0));
        }
    }
}
