//! Pawn promotion.
//!
//! A `Promotion` command swaps a pawn for a piece of the chosen kind. The
//! replacement keeps the pawn's color, live state (a slide toward the last
//! row carries on), cooldown stamp and move tracking, and its id is the
//! pawn's id re-prefixed for the new kind (`PW_6_0` → `QW_6_0`).

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::arena::{Arena, ArenaError};
use crate::board::BoardGeometry;
use crate::command::Command;
use crate::event::Event;
use crate::piece::{Color, PieceId, PieceKind, PieceType};
use crate::state::TemplateLibrary;
use crate::Millis;

/// Why a promotion could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromotionError {
    /// No live piece has this id.
    #[error("unknown piece `{0}`")]
    UnknownPiece(PieceId),

    /// Only pawns promote.
    #[error("`{0}` is not a pawn")]
    NotAPawn(PieceId),

    /// The pawn is not on (or heading to) its last row.
    #[error("`{piece}` is not on promotion row {row}")]
    NotOnPromotionRow {
        /// The pawn.
        piece: PieceId,
        /// Row it must reach.
        row: i32,
    },

    /// The library has no graph for the replacement type.
    #[error("no template for `{0}`")]
    MissingTemplate(PieceType),

    /// The replacement could not be registered.
    #[error(transparent)]
    Arena(#[from] ArenaError),
}

/// Row on which a pawn of `color` promotes.
#[must_use]
pub const fn promotion_row(color: Color, geometry: &BoardGeometry) -> i32 {
    match color {
        Color::White => 0,
        Color::Black => geometry.rows - 1,
    }
}

/// Replaces the pawn addressed by `cmd` with the chosen kind.
///
/// Commands without a promotion payload fall back to a queen.
///
/// # Errors
///
/// See [`PromotionError`]. On error the arena is left unchanged.
pub fn apply_promotion(
    arena: &mut Arena,
    library: &TemplateLibrary,
    cmd: &Command,
    now: Millis,
) -> Result<Event, PromotionError> {
    let id = cmd.piece();
    let pawn = arena
        .get(id)
        .ok_or_else(|| PromotionError::UnknownPiece(id.clone()))?;
    if pawn.kind() != PieceKind::Pawn {
        return Err(PromotionError::NotAPawn(id.clone()));
    }

    let geometry = pawn.state().graph().physics().geometry;
    let row = promotion_row(pawn.color(), &geometry);
    if pawn.state().physics().target_cell().row != row {
        return Err(PromotionError::NotOnPromotionRow {
            piece: id.clone(),
            row,
        });
    }

    let kind = cmd.promotion_choice().unwrap_or_default().kind();
    let replacement_type = PieceType::new(kind, pawn.color());
    let graph = library
        .get(replacement_type)
        .map(Arc::clone)
        .ok_or(PromotionError::MissingTemplate(replacement_type))?;
    let new_id = id.with_kind(kind);
    let replacement = pawn.replaced_by(new_id.clone(), &graph, now);
    arena.replace(id, replacement)?;

    info!(from = %id, to = %new_id, %kind, now, "pawn promoted");
    Ok(Event::PiecePromoted {
        from: id.clone(),
        to: new_id,
        kind,
    })
}
