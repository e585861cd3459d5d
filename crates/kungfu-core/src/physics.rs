//! Per-state physics: cell position, movement timing and interpolation.
//!
//! Every [`crate::state::State`] instance owns one [`Physics`]. A `Move`
//! command arms a slide toward the target cell whose duration depends on the
//! Chebyshev distance and the configured speed; a `Jump` arms an in-place
//! animation of fixed length; anything else cancels movement.
//!
//! # Motion flags
//!
//! Three independent flags describe a piece's physical status:
//!
//! - `ANIMATING`: a slide or jump is in progress.
//! - `VULNERABLE`: the piece can be captured.
//! - `ARMED`: the piece can capture.
//!
//! Both slides and jumps clear `VULNERABLE` and `ARMED` for their duration.
//!
//! # Invariant
//!
//! `!is_moving() ⇒ current_cell() == target_cell()`. Cancelling snaps the
//! target back to the current cell.

use bitflags::bitflags;
use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::board::{BoardGeometry, Cell};
use crate::command::{Command, CommandPayload};
use crate::config::SimConfig;
use crate::Millis;

bitflags! {
    /// Physical status flags for a piece.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MotionFlags: u8 {
        /// A slide or jump animation is in progress.
        const ANIMATING = 0b0000_0001;
        /// The piece may be captured.
        const VULNERABLE = 0b0000_0010;
        /// The piece may capture.
        const ARMED = 0b0000_0100;

        /// Flags of a piece standing still.
        const SETTLED = Self::VULNERABLE.bits() | Self::ARMED.bits();
    }
}

/// Parameters shared by every [`Physics`] of a piece type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    /// Slide speed in cells per second.
    pub speed: f32,
    /// Length of a jump-in-place.
    pub jump_duration: Millis,
    /// Board geometry for pixel conversion.
    pub geometry: BoardGeometry,
}

impl PhysicsParams {
    /// Extracts physics parameters from a simulation config.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            speed: config.timing.move_speed,
            jump_duration: config.timing.jump_duration_ms,
            geometry: config.board,
        }
    }
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

/// Position and movement timing of one state instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Physics {
    start_cell: Cell,
    current: Cell,
    target: Cell,
    flags: MotionFlags,
    started_at: Millis,
    duration: Millis,
    arrived_at: Option<Millis>,
    params: PhysicsParams,
}

impl Physics {
    /// Creates stationary physics at `cell`.
    #[must_use]
    pub fn new(cell: Cell, params: PhysicsParams) -> Self {
        Self {
            start_cell: cell,
            current: cell,
            target: cell,
            flags: MotionFlags::SETTLED,
            started_at: 0,
            duration: 0,
            arrived_at: None,
            params,
        }
    }

    /// Copies the start, current and target cells (and the last arrival
    /// time) from another instance.
    ///
    /// Used when a state hands over to the next one.
    pub fn carry_cells_from(&mut self, other: &Physics) {
        self.start_cell = other.start_cell;
        self.current = other.current;
        self.target = other.target;
        self.arrived_at = other.arrived_at;
    }

    /// Arms or cancels movement according to `cmd`.
    pub fn apply_command(&mut self, cmd: &Command) {
        match cmd.payload() {
            CommandPayload::Move { to, .. } => {
                self.target = *to;
                self.duration = self.slide_duration(self.current, *to);
                self.started_at = cmd.timestamp();
                self.arrived_at = None;
                self.flags = MotionFlags::ANIMATING;
            }
            CommandPayload::Jump { .. } => {
                self.target = self.current;
                self.duration = self.params.jump_duration;
                self.started_at = cmd.timestamp();
                self.arrived_at = None;
                self.flags = MotionFlags::ANIMATING;
            }
            _ => self.stop(),
        }
    }

    /// Cancels movement and snaps the target back to the current cell.
    pub fn stop(&mut self) {
        self.target = self.current;
        self.flags = MotionFlags::SETTLED;
    }

    /// Completes movement once its duration has elapsed.
    ///
    /// Returns true only on the call that completes it, and remembers `now`
    /// as the arrival time.
    pub fn advance(&mut self, now: Millis) -> bool {
        if !self.is_moving() || self.elapsed(now) < self.duration {
            return false;
        }
        self.current = self.target;
        self.flags = MotionFlags::SETTLED;
        self.arrived_at = Some(now);
        true
    }

    /// Board-space pixel position at `now`.
    ///
    /// While moving, linearly interpolates between the two cell origins and
    /// truncates to whole pixels; otherwise returns the current cell's origin.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_position(&self, now: Millis) -> IVec2 {
        let geometry = &self.params.geometry;
        if !self.is_moving() || self.duration == 0 {
            return geometry.pixel_origin(self.current);
        }
        let progress = (self.elapsed(now) as f32 / self.duration as f32).clamp(0.0, 1.0);
        let from: Vec2 = geometry.pixel_origin_f32(self.current);
        let to: Vec2 = geometry.pixel_origin_f32(self.target);
        (from + (to - from) * progress).as_ivec2()
    }

    /// Slide duration between two cells at the configured speed.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn slide_duration(&self, from: Cell, to: Cell) -> Millis {
        let cells = f64::from(from.chebyshev(to));
        (cells / f64::from(self.params.speed) * 1000.0).floor() as Millis
    }

    /// Milliseconds since the current movement started.
    #[must_use]
    pub const fn elapsed(&self, now: Millis) -> Millis {
        now.saturating_sub(self.started_at)
    }

    /// Cell the piece was spawned on.
    #[must_use]
    pub const fn start_cell(&self) -> Cell {
        self.start_cell
    }

    /// Cell the piece currently occupies.
    #[must_use]
    pub const fn current_cell(&self) -> Cell {
        self.current
    }

    /// Cell the piece is heading to (equal to current when stationary).
    #[must_use]
    pub const fn target_cell(&self) -> Cell {
        self.target
    }

    /// Returns true while a slide or jump is in progress.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.flags.contains(MotionFlags::ANIMATING)
    }

    /// Returns true if the piece may be captured.
    #[must_use]
    pub const fn can_be_captured(&self) -> bool {
        self.flags.contains(MotionFlags::VULNERABLE)
    }

    /// Returns true if the piece may capture.
    #[must_use]
    pub const fn can_capture(&self) -> bool {
        self.flags.contains(MotionFlags::ARMED)
    }

    /// Current motion flags.
    #[must_use]
    pub const fn flags(&self) -> MotionFlags {
        self.flags
    }

    /// When the current movement started.
    #[must_use]
    pub const fn started_at(&self) -> Millis {
        self.started_at
    }

    /// Clock value at which the last slide or jump completed.
    ///
    /// Cleared when a new movement is armed; a cancelled movement never
    /// arrives.
    #[must_use]
    pub const fn arrived_at(&self) -> Option<Millis> {
        self.arrived_at
    }

    /// Length of the current movement.
    #[must_use]
    pub const fn duration(&self) -> Millis {
        self.duration
    }

    /// Parameters this instance was built with.
    #[must_use]
    pub const fn params(&self) -> &PhysicsParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceId;

    fn id() -> PieceId {
        PieceId::parse("PW_6_0").unwrap()
    }

    fn physics_at(row: i32, col: i32) -> Physics {
        Physics::new(Cell::new(row, col), PhysicsParams::default())
    }

    mod apply_tests {
        use super::*;

        #[test]
        fn move_two_cells_takes_500ms() {
            let mut physics = physics_at(6, 0);
            physics.apply_command(&Command::move_to(1000, id(), Cell::new(6, 0), Cell::new(4, 0)));

            assert!(physics.is_moving());
            assert_eq!(physics.duration(), 500);
            assert_eq!(physics.target_cell(), Cell::new(4, 0));
            assert_eq!(physics.started_at(), 1000);
        }

        #[test]
        fn move_ignores_command_source_cell() {
            let mut physics = physics_at(6, 0);
            // Source says (0,0) but the duration is measured from the current cell.
            physics.apply_command(&Command::move_to(0, id(), Cell::new(0, 0), Cell::new(5, 0)));
            assert_eq!(physics.duration(), 250);
        }

        #[test]
        fn jump_stays_in_place() {
            let mut physics = physics_at(3, 3);
            physics.apply_command(&Command::jump(0, id(), Cell::new(3, 3), Cell::new(5, 5)));

            assert!(physics.is_moving());
            assert_eq!(physics.target_cell(), Cell::new(3, 3));
            assert_eq!(physics.duration(), 1500);
        }

        #[test]
        fn idle_cancels_and_snaps_target() {
            let mut physics = physics_at(6, 0);
            physics.apply_command(&Command::move_to(0, id(), Cell::new(6, 0), Cell::new(2, 0)));
            physics.apply_command(&Command::idle(10, id()));

            assert!(!physics.is_moving());
            assert_eq!(physics.target_cell(), physics.current_cell());
        }

        #[test]
        fn moving_clears_vulnerability_and_arming() {
            let mut physics = physics_at(6, 0);
            assert!(physics.can_be_captured());
            assert!(physics.can_capture());

            physics.apply_command(&Command::jump(0, id(), Cell::new(6, 0), Cell::new(6, 0)));
            assert!(!physics.can_be_captured());
            assert!(!physics.can_capture());
            assert!(physics.flags().contains(MotionFlags::ANIMATING));
        }
    }

    mod advance_tests {
        use super::*;

        #[test]
        fn completes_exactly_at_duration() {
            let mut physics = physics_at(6, 0);
            physics.apply_command(&Command::move_to(0, id(), Cell::new(6, 0), Cell::new(4, 0)));

            assert!(!physics.advance(499));
            assert_eq!(physics.current_cell(), Cell::new(6, 0));

            assert!(physics.advance(500));
            assert_eq!(physics.current_cell(), Cell::new(4, 0));
            assert!(!physics.is_moving());
        }

        #[test]
        fn reports_completion_once() {
            let mut physics = physics_at(6, 0);
            physics.apply_command(&Command::move_to(0, id(), Cell::new(6, 0), Cell::new(5, 0)));
            assert!(physics.advance(1000));
            assert!(!physics.advance(1000));
        }

        #[test]
        fn arrival_time_is_recorded_until_next_move() {
            let mut physics = physics_at(6, 0);
            physics.apply_command(&Command::move_to(0, id(), Cell::new(6, 0), Cell::new(5, 0)));
            assert_eq!(physics.arrived_at(), None);
            physics.advance(300);
            assert_eq!(physics.arrived_at(), Some(300));

            physics.apply_command(&Command::move_to(400, id(), Cell::new(5, 0), Cell::new(4, 0)));
            assert_eq!(physics.arrived_at(), None);
        }

        #[test]
        fn cancelled_move_never_arrives() {
            let mut physics = physics_at(6, 0);
            physics.apply_command(&Command::move_to(0, id(), Cell::new(6, 0), Cell::new(4, 0)));
            physics.apply_command(&Command::idle(100, id()));
            assert!(!physics.advance(1000));
            assert_eq!(physics.arrived_at(), None);
        }

        #[test]
        fn stationary_never_completes() {
            let mut physics = physics_at(0, 0);
            assert!(!physics.advance(10_000));
        }

        #[test]
        fn now_before_start_counts_as_zero_elapsed() {
            let mut physics = physics_at(6, 0);
            physics.apply_command(&Command::move_to(1000, id(), Cell::new(6, 0), Cell::new(5, 0)));
            assert_eq!(physics.elapsed(500), 0);
            assert!(!physics.advance(500));
        }
    }

    mod pixel_tests {
        use super::*;

        #[test]
        fn stationary_uses_cell_origin() {
            let physics = physics_at(6, 2);
            assert_eq!(physics.pixel_position(0), IVec2::new(200, 600));
        }

        #[test]
        fn interpolates_halfway() {
            let mut physics = physics_at(6, 0);
            physics.apply_command(&Command::move_to(0, id(), Cell::new(6, 0), Cell::new(4, 0)));
            assert_eq!(physics.pixel_position(250), IVec2::new(0, 500));
        }

        #[test]
        fn clamps_after_duration() {
            let mut physics = physics_at(6, 0);
            physics.apply_command(&Command::move_to(0, id(), Cell::new(6, 0), Cell::new(4, 0)));
            assert_eq!(physics.pixel_position(9_999), IVec2::new(0, 400));
        }

        #[test]
        fn zero_length_move_reports_origin() {
            let mut physics = physics_at(6, 0);
            physics.apply_command(&Command::move_to(0, id(), Cell::new(6, 0), Cell::new(6, 0)));
            assert_eq!(physics.duration(), 0);
            assert_eq!(physics.pixel_position(0), IVec2::new(0, 600));
            assert!(physics.advance(0));
        }
    }

    #[test]
    fn carry_cells_copies_positions() {
        let mut source = physics_at(6, 0);
        source.apply_command(&Command::move_to(0, id(), Cell::new(6, 0), Cell::new(4, 0)));
        let mut dest = physics_at(0, 0);
        dest.carry_cells_from(&source);
        assert_eq!(dest.current_cell(), Cell::new(6, 0));
        assert_eq!(dest.target_cell(), Cell::new(4, 0));
        assert_eq!(dest.start_cell(), Cell::new(6, 0));
    }
}
