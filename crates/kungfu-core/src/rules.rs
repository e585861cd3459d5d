//! Optional move pre-check for input collaborators.
//!
//! The simulation itself never validates moves: a piece accepts any `Move`
//! its state machine allows and collisions sort out the rest. Input layers
//! that want classic legality (reachable cell, clear path, pawn rules) call
//! [`validate_move`] before submitting a command.

use thiserror::Error;

use crate::arena::Arena;
use crate::board::Cell;
use crate::piece::{PieceId, PieceKind};

/// Reason a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    /// No live piece has this id.
    #[error("unknown piece `{0}`")]
    UnknownPiece(PieceId),

    /// The target is not one of the piece's movement offsets.
    #[error("{to} is not reachable from {from}")]
    Unreachable {
        /// Current cell.
        from: Cell,
        /// Requested cell.
        to: Cell,
    },

    /// A piece of the same color stands on the target.
    #[error("{to} is occupied by friendly `{by}`")]
    FriendlyFire {
        /// Requested cell.
        to: Cell,
        /// Occupant.
        by: PieceId,
    },

    /// A pawn cannot advance onto an occupied cell.
    #[error("pawn cannot advance onto occupied {0}")]
    PawnForwardBlocked(Cell),

    /// A pawn moves diagonally only to capture.
    #[error("pawn diagonal to {0} needs an enemy")]
    PawnDiagonalEmpty(Cell),

    /// A pawn double step is only allowed as its first move.
    #[error("pawn has already moved")]
    PawnDoubleStep,

    /// Another piece stands between the endpoints.
    #[error("path {from} -> {to} is blocked")]
    PathBlocked {
        /// Current cell.
        from: Cell,
        /// Requested cell.
        to: Cell,
    },
}

/// Checks a move of piece `id` to `to` against its movement rules and the
/// current board.
///
/// # Errors
///
/// Returns the first [`MoveRejection`] that applies.
pub fn validate_move(arena: &Arena, id: &PieceId, to: Cell) -> Result<(), MoveRejection> {
    let piece = arena
        .get(id)
        .ok_or_else(|| MoveRejection::UnknownPiece(id.clone()))?;
    let from = piece.cell();
    let rules = piece.state().graph().rules();

    if !rules.can_reach(from, to) {
        return Err(MoveRejection::Unreachable { from, to });
    }

    let occupant = arena.piece_at(to).filter(|p| p.id() != id);
    if let Some(other) = occupant {
        if other.color() == piece.color() {
            return Err(MoveRejection::FriendlyFire {
                to,
                by: other.id().clone(),
            });
        }
    }

    if piece.kind() == PieceKind::Pawn {
        if to.col == from.col {
            if occupant.is_some() {
                return Err(MoveRejection::PawnForwardBlocked(to));
            }
            if (to.row - from.row).abs() == 2 && piece.moves().has_moved() {
                return Err(MoveRejection::PawnDoubleStep);
            }
        } else if occupant.is_none() {
            return Err(MoveRejection::PawnDiagonalEmpty(to));
        }
    }

    if rules.path_blocked(from, to, piece.kind(), arena.occupied_cells()) {
        return Err(MoveRejection::PathBlocked { from, to });
    }
    Ok(())
}
