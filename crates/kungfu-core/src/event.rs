//! Notifications emitted by the simulation.
//!
//! The simulation records [`Event`]s into an [`EventLog`] during each tick.
//! Collaborators (score keeping, audio, network relay) drain it with
//! [`EventLog::take_events`] after stepping.
//!
//! Only [`Event::PieceCaptured`] is guaranteed for every resolved capture; the
//! other variants are orchestrator conveniences.

use serde::{Deserialize, Serialize};

use crate::board::Cell;
use crate::command::Command;
use crate::piece::{Color, Dispatch, Piece, PieceId, PieceKind};
use crate::Millis;

/// How the game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Both kings remain.
    Ongoing,
    /// Only this side's king remains.
    Winner(Color),
    /// No kings remain.
    Draw,
}

impl Outcome {
    /// Returns true once the game has ended.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

/// Summary of a piece removed by a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPiece {
    /// Id of the removed piece.
    pub id: PieceId,
    /// Its kind.
    pub kind: PieceKind,
    /// Its color.
    pub color: Color,
    /// Cell it stood on when removed.
    pub cell: Cell,
}

impl From<&Piece> for CapturedPiece {
    fn from(piece: &Piece) -> Self {
        Self {
            id: piece.id().clone(),
            kind: piece.kind(),
            color: piece.color(),
            cell: piece.cell(),
        }
    }
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A command reached its piece.
    CommandApplied {
        /// The original command.
        command: Command,
        /// What the piece did with it.
        dispatch: Dispatch,
    },
    /// A piece was removed by a capture.
    PieceCaptured {
        /// The removed piece.
        piece: CapturedPiece,
        /// The attacker, when one was identified.
        by: PieceId,
        /// Tick time of the capture.
        at: Millis,
    },
    /// A pawn was replaced by another kind.
    PiecePromoted {
        /// Id of the pawn.
        from: PieceId,
        /// Id of the replacement.
        to: PieceId,
        /// Replacement kind.
        kind: PieceKind,
    },
    /// The game ended.
    GameOver {
        /// Final result.
        outcome: Outcome,
    },
}

/// Per-tick event buffer.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends an event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Drains and returns all recorded events in order.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured() -> Event {
        Event::PieceCaptured {
            piece: CapturedPiece {
                id: PieceId::parse("PB_1_0").unwrap(),
                kind: PieceKind::Pawn,
                color: Color::Black,
                cell: Cell::new(1, 0),
            },
            by: PieceId::parse("QW_7_3").unwrap(),
            at: 1200,
        }
    }

    #[test]
    fn take_events_drains_in_order() {
        let mut log = EventLog::new();
        log.push(captured());
        log.push(Event::GameOver {
            outcome: Outcome::Winner(Color::White),
        });
        assert_eq!(log.len(), 2);

        let events = log.take_events();
        assert!(matches!(events[0], Event::PieceCaptured { .. }));
        assert!(matches!(events[1], Event::GameOver { .. }));
        assert!(log.is_empty());
    }

    #[test]
    fn clear_discards() {
        let mut log = EventLog::new();
        log.push(captured());
        log.clear();
        assert!(log.take_events().is_empty());
    }

    #[test]
    fn outcome_is_over() {
        assert!(!Outcome::Ongoing.is_over());
        assert!(Outcome::Draw.is_over());
        assert!(Outcome::Winner(Color::Black).is_over());
    }

    #[test]
    fn events_serialize() {
        let json = serde_json::to_string(&captured()).unwrap();
        assert!(json.contains("PB_1_0"));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, captured());
    }
}
