//! Movement rules: per-type offset tables and path obstruction.
//!
//! A [`MovementRules`] instance is built once per piece type and shared
//! read-only (behind an `Arc`) by every piece of that type. It answers two
//! questions: which cells a piece could reach from where it stands, and
//! whether a straight path between two cells is obstructed.
//!
//! Offsets come either from the built-in tables ([`MovementRules::standard`])
//! or from the plain-text movement format ([`MovementRules::parse`]):
//!
//! ```text
//! # pawn (white)
//! -1,0:non_capture
//! -2,0:first_move
//! -1,-1:capture
//! -1,1:capture
//! ```

use tracing::warn;

use crate::board::{BoardGeometry, Cell};
use crate::piece::{Color, PieceKind};

/// Offset table plus board bounds for one piece type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRules {
    offsets: Vec<(i32, i32)>,
    bounds: BoardGeometry,
}

impl MovementRules {
    /// Creates rules from an explicit offset list.
    #[must_use]
    pub fn new(offsets: Vec<(i32, i32)>, bounds: BoardGeometry) -> Self {
        Self { offsets, bounds }
    }

    /// Parses the movement text format.
    ///
    /// Each line is `row_delta,col_delta`, optionally followed by `:tag`.
    /// Blank lines and lines starting with `#` are skipped; malformed lines
    /// are skipped with a warning.
    #[must_use]
    pub fn parse(text: &str, bounds: BoardGeometry) -> Self {
        let offsets = text
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                let coords = line.split_once(':').map_or(line, |(coords, _tag)| coords);
                let parsed = coords.split_once(',').and_then(|(dr, dc)| {
                    Some((dr.trim().parse::<i32>().ok()?, dc.trim().parse::<i32>().ok()?))
                });
                if parsed.is_none() {
                    warn!(line = index + 1, text = line, "skipping malformed movement line");
                }
                parsed
            })
            .collect();
        Self { offsets, bounds }
    }

    /// Built-in offsets for a standard chess piece.
    ///
    /// Sliding pieces get every distance up to the larger board dimension;
    /// pawn offsets point toward the opponent's side.
    #[must_use]
    pub fn standard(kind: PieceKind, color: Color, bounds: BoardGeometry) -> Self {
        const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
        const KNIGHT: [(i32, i32); 8] = [
            (-2, -1),
            (-2, 1),
            (-1, -2),
            (-1, 2),
            (1, -2),
            (1, 2),
            (2, -1),
            (2, 1),
        ];

        let reach = bounds.rows.max(bounds.cols);
        let slide = |dirs: &[(i32, i32)]| -> Vec<(i32, i32)> {
            dirs.iter()
                .flat_map(|&(dr, dc)| (1..reach).map(move |n| (dr * n, dc * n)))
                .collect()
        };

        let offsets = match kind {
            PieceKind::King => ORTHOGONAL.iter().chain(DIAGONAL.iter()).copied().collect(),
            PieceKind::Queen => {
                let mut offsets = slide(&ORTHOGONAL);
                offsets.extend(slide(&DIAGONAL));
                offsets
            }
            PieceKind::Rook => slide(&ORTHOGONAL),
            PieceKind::Bishop => slide(&DIAGONAL),
            PieceKind::Knight => KNIGHT.to_vec(),
            PieceKind::Pawn => {
                let f = color.forward();
                vec![(f, 0), (2 * f, 0), (f, -1), (f, 1)]
            }
        };
        Self { offsets, bounds }
    }

    /// The configured offsets, in table order.
    #[must_use]
    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    /// Board bounds these rules were built for.
    #[must_use]
    pub const fn bounds(&self) -> &BoardGeometry {
        &self.bounds
    }

    /// Every in-bounds cell reachable from `from`, in offset order.
    #[must_use]
    pub fn reachable(&self, from: Cell) -> Vec<Cell> {
        self.offsets
            .iter()
            .map(|&(dr, dc)| from.offset(dr, dc))
            .filter(|cell| self.bounds.contains(*cell))
            .collect()
    }

    /// Returns true if `to` is one of the reachable cells from `from`.
    #[must_use]
    pub fn can_reach(&self, from: Cell, to: Cell) -> bool {
        self.bounds.contains(to)
            && self
                .offsets
                .iter()
                .any(|&(dr, dc)| from.offset(dr, dc) == to)
    }

    /// Returns true if a piece of `kind` moving `start → end` would pass
    /// through an occupied cell.
    ///
    /// Knights never block. Other kinds walk unit steps from `start` toward
    /// `end`, excluding both endpoints. The walk is capped at the Chebyshev
    /// distance, so a non-straight pair terminates instead of overshooting.
    #[must_use]
    pub fn path_blocked<I>(&self, start: Cell, end: Cell, kind: PieceKind, occupied: I) -> bool
    where
        I: IntoIterator<Item = Cell>,
    {
        if kind.jumps() || start == end {
            return false;
        }
        let path = path_between(start, end);
        if path.is_empty() {
            return false;
        }
        occupied.into_iter().any(|cell| path.contains(&cell))
    }
}

/// Cells strictly between `start` and `end` along the unit-step walk.
#[must_use]
pub fn path_between(start: Cell, end: Cell) -> Vec<Cell> {
    let (dr, dc) = start.direction_to(end);
    let steps = start.chebyshev(end);
    (1..steps)
        .map(|n| {
            #[allow(clippy::cast_possible_wrap)]
            let n = n as i32;
            start.offset(dr * n, dc * n)
        })
        .take_while(|cell| *cell != end)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rook() -> MovementRules {
        MovementRules::standard(PieceKind::Rook, Color::White, BoardGeometry::STANDARD)
    }

    mod reachable_tests {
        use super::*;

        #[test]
        fn reachable_filters_out_of_bounds() {
            let rules = MovementRules::new(vec![(-1, 0), (1, 0), (0, 1)], BoardGeometry::STANDARD);
            let cells = rules.reachable(Cell::new(0, 7));
            assert_eq!(cells, vec![Cell::new(1, 7)]);
        }

        #[test]
        fn reachable_preserves_offset_order() {
            let rules = MovementRules::new(vec![(0, 1), (1, 0)], BoardGeometry::STANDARD);
            assert_eq!(
                rules.reachable(Cell::new(3, 3)),
                vec![Cell::new(3, 4), Cell::new(4, 3)]
            );
        }

        #[test]
        fn white_pawn_moves_up() {
            let rules =
                MovementRules::standard(PieceKind::Pawn, Color::White, BoardGeometry::STANDARD);
            let cells = rules.reachable(Cell::new(6, 0));
            assert!(cells.contains(&Cell::new(5, 0)));
            assert!(cells.contains(&Cell::new(4, 0)));
            assert!(cells.contains(&Cell::new(5, 1)));
            assert!(!cells.contains(&Cell::new(5, -1)));
        }

        #[test]
        fn black_pawn_moves_down() {
            let rules =
                MovementRules::standard(PieceKind::Pawn, Color::Black, BoardGeometry::STANDARD);
            assert!(rules.can_reach(Cell::new(1, 3), Cell::new(3, 3)));
            assert!(!rules.can_reach(Cell::new(1, 3), Cell::new(0, 3)));
        }

        #[test]
        fn rook_covers_whole_rank_and_file() {
            let cells = rook().reachable(Cell::new(0, 0));
            assert_eq!(cells.len(), 14);
        }

        #[test]
        fn knight_from_corner() {
            let rules =
                MovementRules::standard(PieceKind::Knight, Color::Black, BoardGeometry::STANDARD);
            let mut cells = rules.reachable(Cell::new(0, 1));
            cells.sort();
            assert_eq!(cells, vec![Cell::new(1, 3), Cell::new(2, 0), Cell::new(2, 2)]);
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn parses_offsets_and_ignores_tags() {
            let text = "# rook\n1,0:capture\n-1, 0\n\n0,1:non_capture\n";
            let rules = MovementRules::parse(text, BoardGeometry::STANDARD);
            assert_eq!(rules.offsets(), &[(1, 0), (-1, 0), (0, 1)]);
        }

        #[test]
        fn skips_malformed_lines() {
            let text = "1,0\nnot a move\n2\n3,x\n0,-1";
            let rules = MovementRules::parse(text, BoardGeometry::STANDARD);
            assert_eq!(rules.offsets(), &[(1, 0), (0, -1)]);
        }

        #[test]
        fn empty_text_gives_no_moves() {
            let rules = MovementRules::parse("", BoardGeometry::STANDARD);
            assert!(rules.reachable(Cell::new(4, 4)).is_empty());
        }
    }

    mod path_tests {
        use super::*;

        #[test]
        fn blocked_by_intermediate_piece() {
            let rules = rook();
            let start = Cell::new(0, 0);
            let end = Cell::new(0, 3);
            assert!(rules.path_blocked(start, end, PieceKind::Rook, [Cell::new(0, 1)]));
            assert!(rules.path_blocked(start, end, PieceKind::Rook, [Cell::new(0, 2)]));
        }

        #[test]
        fn destination_does_not_block() {
            let rules = rook();
            assert!(!rules.path_blocked(
                Cell::new(0, 0),
                Cell::new(0, 3),
                PieceKind::Rook,
                [Cell::new(0, 3)]
            ));
        }

        #[test]
        fn knight_never_blocked() {
            let rules = rook();
            assert!(!rules.path_blocked(
                Cell::new(0, 0),
                Cell::new(0, 3),
                PieceKind::Knight,
                [Cell::new(0, 1), Cell::new(0, 2)]
            ));
        }

        #[test]
        fn same_cell_not_blocked() {
            let rules = rook();
            assert!(!rules.path_blocked(
                Cell::new(2, 2),
                Cell::new(2, 2),
                PieceKind::Queen,
                [Cell::new(2, 2)]
            ));
        }

        #[test]
        fn diagonal_path() {
            assert_eq!(
                path_between(Cell::new(0, 0), Cell::new(3, 3)),
                vec![Cell::new(1, 1), Cell::new(2, 2)]
            );
        }

        #[test]
        fn non_straight_path_terminates() {
            // (0,0) -> (1,3) steps (1,1) then (2,2): bounded, never reaches the end.
            let path = path_between(Cell::new(0, 0), Cell::new(1, 3));
            assert_eq!(path, vec![Cell::new(1, 1), Cell::new(2, 2)]);
        }

        #[test]
        fn adjacent_has_empty_path() {
            assert!(path_between(Cell::new(4, 4), Cell::new(3, 4)).is_empty());
        }
    }
}
