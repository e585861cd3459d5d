//! Tie-break policies for simultaneous same-color arrivals.

use std::fmt;

use crate::piece::Piece;

/// Chooses which of several unsettled friendly pieces sharing a position
/// keeps its move; all others are blocked.
pub trait TieBreak: Send + Sync + fmt::Debug {
    /// Index into `group` of the piece that keeps its move.
    ///
    /// `group` is non-empty and ordered by piece id.
    fn keep(&self, group: &[&Piece]) -> usize;
}

/// Keeps the first piece in id order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstInOrder;

impl TieBreak for FirstInOrder {
    fn keep(&self, _group: &[&Piece]) -> usize {
        0
    }
}

/// Keeps the piece whose last action is oldest; pieces that never acted
/// come first, and id order breaks remaining ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarliestAction;

impl TieBreak for EarliestAction {
    fn keep(&self, group: &[&Piece]) -> usize {
        group
            .iter()
            .enumerate()
            .min_by_key(|(index, piece)| (piece.last_action(), *index))
            .map_or(0, |(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::board::Cell;
    use crate::command::Command;
    use crate::config::SimConfig;
    use crate::piece::{Color, PieceId, PieceKind, PieceType};
    use crate::state::TemplateLibrary;

    fn rook(col: i32, acted_at: Option<u64>) -> Piece {
        let library = TemplateLibrary::standard(&SimConfig::default()).unwrap();
        let piece_type = PieceType::new(PieceKind::Rook, Color::White);
        let cell = Cell::new(7, col);
        let graph = Arc::clone(library.get(piece_type).unwrap());
        let mut piece = Piece::spawn(PieceId::for_spawn(piece_type, cell), &graph, cell, 0);
        if let Some(at) = acted_at {
            let cmd = Command::move_to(at, piece.id().clone(), cell, Cell::new(6, col));
            piece.handle_command(&cmd, at);
        }
        piece
    }

    #[test]
    fn first_in_order_keeps_index_zero() {
        let a = rook(0, Some(500));
        let b = rook(1, Some(100));
        assert_eq!(FirstInOrder.keep(&[&a, &b]), 0);
    }

    #[test]
    fn earliest_action_keeps_oldest() {
        let a = rook(0, Some(500));
        let b = rook(1, Some(100));
        let c = rook(2, Some(300));
        assert_eq!(EarliestAction.keep(&[&a, &b, &c]), 1);
    }

    #[test]
    fn earliest_action_ties_fall_back_to_order() {
        let a = rook(0, Some(100));
        let b = rook(1, Some(100));
        assert_eq!(EarliestAction.keep(&[&a, &b]), 0);
    }

    #[test]
    fn never_acted_wins() {
        let a = rook(0, Some(100));
        let b = rook(1, None);
        assert_eq!(EarliestAction.keep(&[&a, &b]), 1);
    }
}
