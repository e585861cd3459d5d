//! Score keeping from simulation events.
//!
//! A [`ScoreBoard`] is fed the events drained from the simulation. Captures
//! credit the capturing side with the captured kind's value (P=1, N=3, B=3,
//! R=5, Q=9, K=100), and accepted `Move`/`Jump` commands count as moves for
//! the side that issued them.

use serde::{Deserialize, Serialize};

use crate::command::CommandKind;
use crate::event::Event;
use crate::piece::{Color, PieceKind};

/// Running totals for one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideScore {
    /// Sum of captured piece values.
    pub points: u32,
    /// Kinds captured, in capture order.
    pub captured: Vec<PieceKind>,
    /// Accepted moves and jumps.
    pub moves: u32,
}

/// Per-side scores accumulated from events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    white: SideScore,
    black: SideScore,
}

impl ScoreBoard {
    /// Creates an empty score board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts for one event. Events that carry no score are ignored.
    pub fn record(&mut self, event: &Event) {
        match event {
            Event::PieceCaptured { piece, by, .. } => {
                let side = self.side_mut(by.color());
                side.points += piece.kind.value();
                side.captured.push(piece.kind);
            }
            Event::CommandApplied { command, dispatch } => {
                if dispatch.is_transition()
                    && matches!(command.kind(), CommandKind::Move | CommandKind::Jump)
                {
                    self.side_mut(command.piece().color()).moves += 1;
                }
            }
            Event::PiecePromoted { .. } | Event::GameOver { .. } => {}
        }
    }

    /// Accounts for a batch of events in order.
    pub fn record_all<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        for event in events {
            self.record(event);
        }
    }

    /// Totals for one side.
    #[must_use]
    pub const fn side(&self, color: Color) -> &SideScore {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    fn side_mut(&mut self, color: Color) -> &mut SideScore {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Points for one side.
    #[must_use]
    pub const fn points(&self, color: Color) -> u32 {
        self.side(color).points
    }

    /// Move count for one side.
    #[must_use]
    pub const fn moves(&self, color: Color) -> u32 {
        self.side(color).moves
    }

    /// Side with more points, if any.
    #[must_use]
    pub fn leader(&self) -> Option<Color> {
        match self.white.points.cmp(&self.black.points) {
            std::cmp::Ordering::Greater => Some(Color::White),
            std::cmp::Ordering::Less => Some(Color::Black),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Clears both sides.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
