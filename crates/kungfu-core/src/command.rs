//! Command types addressed to pieces.
//!
//! A [`Command`] is an immutable action descriptor: when it was issued, which
//! piece it targets, and what it asks for. Input collaborators build them with
//! the constructors below; the state machine synthesizes `Complete` and
//! `Timeout` commands itself.
//!
//! # Example
//!
//! ```
//! use kungfu_core::board::Cell;
//! use kungfu_core::command::{Command, CommandKind};
//! use kungfu_core::piece::PieceId;
//!
//! let id = PieceId::parse("PW_6_0").unwrap();
//! let cmd = Command::move_to(1000, id, Cell::new(6, 0), Cell::new(4, 0));
//!
//! assert_eq!(cmd.kind(), CommandKind::Move);
//! assert_eq!(cmd.target(), Some(Cell::new(4, 0)));
//! assert_eq!(cmd.row_distance(), Some(2));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Cell;
use crate::piece::{PieceId, PieceKind};
use crate::Millis;

// =============================================================================
// Command Kind
// =============================================================================

/// Discriminant of a command, used as the transition-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommandKind {
    /// Slide to another cell.
    Move,
    /// Jump in place.
    Jump,
    /// Stop and return to idle.
    Idle,
    /// Physics finished its movement (synthesized).
    Complete,
    /// A rest timer elapsed (synthesized).
    Timeout,
    /// Attack animation trigger.
    Attack,
    /// Replace a pawn with another kind.
    Promotion,
}

impl CommandKind {
    /// Returns true for the kinds that count as a piece action.
    #[must_use]
    pub const fn is_action(self) -> bool {
        matches!(self, CommandKind::Move | CommandKind::Jump)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::Move => "move",
            CommandKind::Jump => "jump",
            CommandKind::Idle => "idle",
            CommandKind::Complete => "complete",
            CommandKind::Timeout => "timeout",
            CommandKind::Attack => "attack",
            CommandKind::Promotion => "promotion",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Promotion Choice
// =============================================================================

/// Kind a pawn may promote to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PromotionChoice {
    /// Queen (also the fallback for unrecognised input).
    #[default]
    Queen,
    /// Rook.
    Rook,
    /// Bishop.
    Bishop,
    /// Knight.
    Knight,
}

impl PromotionChoice {
    /// Maps a UI letter to a choice, falling back to [`PromotionChoice::Queen`].
    #[must_use]
    pub fn from_code_or_queen(code: char) -> Self {
        match code.to_ascii_uppercase() {
            'R' => PromotionChoice::Rook,
            'B' => PromotionChoice::Bishop,
            'N' => PromotionChoice::Knight,
            _ => PromotionChoice::Queen,
        }
    }

    /// The piece kind the pawn becomes.
    #[must_use]
    pub const fn kind(self) -> PieceKind {
        match self {
            PromotionChoice::Queen => PieceKind::Queen,
            PromotionChoice::Rook => PieceKind::Rook,
            PromotionChoice::Bishop => PieceKind::Bishop,
            PromotionChoice::Knight => PieceKind::Knight,
        }
    }
}

// =============================================================================
// Command Payload
// =============================================================================

/// Kind-specific data carried by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandPayload {
    /// Slide from `from` to `to`.
    Move {
        /// Cell the move was issued from.
        from: Cell,
        /// Destination cell.
        to: Cell,
    },
    /// Jump in place. Both cells are carried for symmetry with `Move`.
    Jump {
        /// Cell the jump was issued from.
        from: Cell,
        /// Cell named by the input (ignored by physics).
        to: Cell,
    },
    /// Return to idle.
    Idle,
    /// Movement finished.
    Complete,
    /// Rest elapsed.
    Timeout,
    /// Attack animation.
    Attack,
    /// Promote the pawn that moved `from` → `to`.
    Promotion {
        /// Cell the pawn moved from.
        from: Cell,
        /// Promotion cell.
        to: Cell,
        /// Replacement kind.
        choice: PromotionChoice,
    },
}

// =============================================================================
// Command
// =============================================================================

/// An immutable action addressed to one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    timestamp: Millis,
    piece: PieceId,
    payload: CommandPayload,
}

impl Command {
    /// Creates a command from its parts.
    #[must_use]
    pub const fn new(timestamp: Millis, piece: PieceId, payload: CommandPayload) -> Self {
        Self {
            timestamp,
            piece,
            payload,
        }
    }

    /// A move from `from` to `to`.
    #[must_use]
    pub const fn move_to(timestamp: Millis, piece: PieceId, from: Cell, to: Cell) -> Self {
        Self::new(timestamp, piece, CommandPayload::Move { from, to })
    }

    /// A jump in place.
    #[must_use]
    pub const fn jump(timestamp: Millis, piece: PieceId, from: Cell, to: Cell) -> Self {
        Self::new(timestamp, piece, CommandPayload::Jump { from, to })
    }

    /// Return to idle.
    #[must_use]
    pub const fn idle(timestamp: Millis, piece: PieceId) -> Self {
        Self::new(timestamp, piece, CommandPayload::Idle)
    }

    /// Movement finished.
    #[must_use]
    pub const fn complete(timestamp: Millis, piece: PieceId) -> Self {
        Self::new(timestamp, piece, CommandPayload::Complete)
    }

    /// Rest elapsed.
    #[must_use]
    pub const fn timeout(timestamp: Millis, piece: PieceId) -> Self {
        Self::new(timestamp, piece, CommandPayload::Timeout)
    }

    /// Attack trigger.
    #[must_use]
    pub const fn attack(timestamp: Millis, piece: PieceId) -> Self {
        Self::new(timestamp, piece, CommandPayload::Attack)
    }

    /// Promote a pawn.
    #[must_use]
    pub const fn promotion(
        timestamp: Millis,
        piece: PieceId,
        from: Cell,
        to: Cell,
        choice: PromotionChoice,
    ) -> Self {
        Self::new(timestamp, piece, CommandPayload::Promotion { from, to, choice })
    }

    /// When the command was issued.
    #[must_use]
    pub const fn timestamp(&self) -> Millis {
        self.timestamp
    }

    /// The addressed piece.
    #[must_use]
    pub const fn piece(&self) -> &PieceId {
        &self.piece
    }

    /// The payload.
    #[must_use]
    pub const fn payload(&self) -> &CommandPayload {
        &self.payload
    }

    /// The payload's discriminant.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self.payload {
            CommandPayload::Move { .. } => CommandKind::Move,
            CommandPayload::Jump { .. } => CommandKind::Jump,
            CommandPayload::Idle => CommandKind::Idle,
            CommandPayload::Complete => CommandKind::Complete,
            CommandPayload::Timeout => CommandKind::Timeout,
            CommandPayload::Attack => CommandKind::Attack,
            CommandPayload::Promotion { .. } => CommandKind::Promotion,
        }
    }

    /// First cell of the payload, if any.
    #[must_use]
    pub const fn source(&self) -> Option<Cell> {
        match self.payload {
            CommandPayload::Move { from, .. }
            | CommandPayload::Jump { from, .. }
            | CommandPayload::Promotion { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Second cell of the payload, if any.
    #[must_use]
    pub const fn target(&self) -> Option<Cell> {
        match self.payload {
            CommandPayload::Move { to, .. }
            | CommandPayload::Jump { to, .. }
            | CommandPayload::Promotion { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Promotion choice, if this is a promotion.
    #[must_use]
    pub const fn promotion_choice(&self) -> Option<PromotionChoice> {
        match self.payload {
            CommandPayload::Promotion { choice, .. } => Some(choice),
            _ => None,
        }
    }

    /// Absolute row difference between source and target.
    #[must_use]
    pub fn row_distance(&self) -> Option<u32> {
        Some((self.target()?.row - self.source()?.row).unsigned_abs())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} {}", self.piece, self.timestamp, self.kind())?;
        if let (Some(from), Some(to)) = (self.source(), self.target()) {
            write!(f, " {from}->{to}")?;
        }
        Ok(())
    }
}
