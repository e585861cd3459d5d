//! Pieces: the unit that receives commands.
//!
//! A [`Piece`] owns exactly one live [`State`] (replaced wholesale on every
//! transition), an action [`Cooldown`], and first-move tracking used by the
//! pawn double-step rule.
//!
//! # Command gates
//!
//! [`Piece::handle_command`] applies, in order:
//!
//! 1. addressing: commands for another id are ignored;
//! 2. long rest: `Move`/`Jump` are refused while in `long_rest`;
//! 3. cooldown: anything arriving before the cooldown elapsed is refused;
//! 4. pawn double step: a two-row move is refused once the pawn has moved.
//!
//! Only then is the state asked for a successor.

mod id;

pub use id::{Color, PieceId, PieceIdError, PieceKind, PieceType};

use std::sync::Arc;

use glam::IVec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::board::Cell;
use crate::command::{Command, CommandKind};
use crate::state::{State, StateKind, TemplateGraph};
use crate::Millis;

/// Default minimum spacing between two accepted actions.
pub const DEFAULT_COOLDOWN: Millis = 2000;

// =============================================================================
// Cooldown / Move Tracking
// =============================================================================

/// Action cooldown timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    duration: Millis,
    last_action: Option<Millis>,
}

impl Cooldown {
    /// A cooldown of `duration` that is immediately ready.
    #[must_use]
    pub const fn new(duration: Millis) -> Self {
        Self {
            duration,
            last_action: None,
        }
    }

    /// Returns true if an action at `now` is allowed.
    #[must_use]
    pub fn is_ready(&self, now: Millis) -> bool {
        self.last_action
            .map_or(true, |last| now.saturating_sub(last) >= self.duration)
    }

    /// Records an action at `now`.
    pub fn stamp(&mut self, now: Millis) {
        self.last_action = Some(now);
    }

    /// Forgets the last action.
    pub fn clear(&mut self) {
        self.last_action = None;
    }

    /// Timestamp of the last accepted action.
    #[must_use]
    pub const fn last_action(&self) -> Option<Millis> {
        self.last_action
    }

    /// Configured duration.
    #[must_use]
    pub const fn duration(&self) -> Millis {
        self.duration
    }
}

/// Move counter and first-move flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTracker {
    count: u32,
    has_moved: bool,
}

impl MoveTracker {
    /// Counts one accepted move or jump.
    pub fn record(&mut self) {
        self.count += 1;
        self.has_moved = true;
    }

    /// Resets to the never-moved state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of accepted moves and jumps.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Returns true once the piece has moved.
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// What [`Piece::handle_command`] did with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dispatch {
    /// Addressed to another piece.
    NotAddressed,
    /// Refused: `Move`/`Jump` during long rest.
    Resting,
    /// Refused: cooldown still running.
    CoolingDown,
    /// Refused: pawn double step after the first move.
    DoubleStep,
    /// The state machine produced a new state.
    Transitioned,
    /// No transition; physics still saw the command.
    Stayed,
}

impl Dispatch {
    /// Returns true if the piece changed state.
    #[must_use]
    pub const fn is_transition(self) -> bool {
        matches!(self, Dispatch::Transitioned)
    }
}

// =============================================================================
// Piece
// =============================================================================

/// A live piece on the board.
#[derive(Debug, Clone)]
pub struct Piece {
    id: PieceId,
    state: State,
    cooldown: Cooldown,
    moves: MoveTracker,
}

impl Piece {
    /// Spawns a piece in the idle state of `graph` at `cell`.
    #[must_use]
    pub fn spawn(id: PieceId, graph: &Arc<TemplateGraph>, cell: Cell, now: Millis) -> Self {
        Self {
            id,
            state: State::initial(graph, cell, now),
            cooldown: Cooldown::new(DEFAULT_COOLDOWN),
            moves: MoveTracker::default(),
        }
    }

    /// Overrides the cooldown duration.
    #[must_use]
    pub fn with_cooldown(mut self, duration: Millis) -> Self {
        self.cooldown = Cooldown::new(duration);
        self
    }

    /// Builds a replacement piece with a new id and graph, carrying over the
    /// live state (including any slide in progress), cooldown and move
    /// tracking.
    #[must_use]
    pub fn replaced_by(&self, id: PieceId, graph: &Arc<TemplateGraph>, now: Millis) -> Self {
        Self {
            id,
            state: self.state.carried_into(graph, now),
            cooldown: self.cooldown,
            moves: self.moves,
        }
    }

    /// Applies a command through the gates and the state machine.
    pub fn handle_command(&mut self, cmd: &Command, now: Millis) -> Dispatch {
        if cmd.piece() != &self.id {
            return Dispatch::NotAddressed;
        }
        let kind = cmd.kind();

        if self.state.kind() == StateKind::LongRest && kind.is_action() {
            trace!(piece = %self.id, %kind, now, "dropped: long rest");
            return Dispatch::Resting;
        }
        if !self.cooldown.is_ready(now) {
            trace!(piece = %self.id, %kind, now, "dropped: cooldown");
            return Dispatch::CoolingDown;
        }
        if self.id.kind() == PieceKind::Pawn
            && kind == CommandKind::Move
            && cmd.row_distance() == Some(2)
            && self.moves.has_moved()
        {
            trace!(piece = %self.id, now, "dropped: pawn double step after first move");
            return Dispatch::DoubleStep;
        }

        let dispatch = match self.state.next(cmd, now) {
            Some(next) => {
                self.state = next;
                self.cooldown.stamp(now);
                if kind.is_action() {
                    self.moves.record();
                }
                Dispatch::Transitioned
            }
            None => Dispatch::Stayed,
        };

        // A refused action must not start moving the piece; anything else
        // re-applies its (cancelling) effect.
        if dispatch.is_transition() || !kind.is_action() {
            self.state.physics_mut().apply_command(cmd);
        }
        dispatch
    }

    /// Returns the piece to a fresh idle state at its current cell.
    pub fn reset_to_initial(&mut self, now: Millis) {
        self.cooldown.clear();
        self.moves.clear();
        let cell = self.cell();
        self.state = State::initial(self.state.graph(), cell, now);
        self.state
            .physics_mut()
            .apply_command(&Command::idle(now, self.id.clone()));
    }

    /// Per-frame update; returns true if the state changed.
    pub fn tick(&mut self, now: Millis) -> bool {
        match self.state.tick(&self.id, now) {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }

    /// Stops movement in place and injects an idle command.
    ///
    /// Used by collision resolution for friendly blocks.
    pub fn block(&mut self, now: Millis) {
        self.state.physics_mut().stop();
        self.handle_command(&Command::idle(now, self.id.clone()), now);
    }

    /// Unique id.
    #[must_use]
    pub const fn id(&self) -> &PieceId {
        &self.id
    }

    /// Kind/color code.
    #[must_use]
    pub const fn piece_type(&self) -> PieceType {
        self.id.piece_type()
    }

    /// Piece kind.
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.id.kind()
    }

    /// Owning side.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.id.color()
    }

    /// Current live state.
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Current cell.
    #[must_use]
    pub fn cell(&self) -> Cell {
        self.state.physics().current_cell()
    }

    /// Pixel position at `now`.
    #[must_use]
    pub fn pixel_position(&self, now: Millis) -> IVec2 {
        self.state.physics().pixel_position(now)
    }

    /// Returns true while sliding or jumping.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.state.physics().is_moving()
    }

    /// Not moving and not in a `move`/`jump` state.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.is_moving() && !self.state.kind().is_motion()
    }

    /// Returns true if a slide or jump completed exactly at `now`.
    #[must_use]
    pub fn just_arrived(&self, now: Millis) -> bool {
        self.state.physics().arrived_at() == Some(now)
    }

    /// Cooldown timer.
    #[must_use]
    pub const fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// Timestamp of the last accepted action.
    #[must_use]
    pub const fn last_action(&self) -> Option<Millis> {
        self.cooldown.last_action()
    }

    /// Move tracking.
    #[must_use]
    pub const fn moves(&self) -> &MoveTracker {
        &self.moves
    }
}
