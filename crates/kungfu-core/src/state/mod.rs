//! Live states of a piece's automaton.
//!
//! A [`State`] is one instantiated node of a [`TemplateGraph`]: it knows which
//! template slot it came from, when it was activated, and owns its own
//! [`Physics`] and [`Animation`] bookkeeping. Transitions never mutate a
//! state into another; [`State::next`] and [`State::tick`] return a freshly
//! instantiated successor and the caller swaps it in.
//!
//! # Rest gating
//!
//! A rest state refuses every transition until `now − activation ≥ rest`.
//! Non-rest states can always transition.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kungfu_core::board::Cell;
//! use kungfu_core::command::Command;
//! use kungfu_core::config::SimConfig;
//! use kungfu_core::moves::MovementRules;
//! use kungfu_core::piece::{Color, PieceId, PieceKind, PieceType};
//! use kungfu_core::state::{State, StateKind, TemplateGraph};
//!
//! let config = SimConfig::default();
//! let piece_type = PieceType::new(PieceKind::Rook, Color::White);
//! let rules = Arc::new(MovementRules::standard(PieceKind::Rook, Color::White, config.board));
//! let graph = Arc::new(TemplateGraph::standard(piece_type, rules, &config).unwrap());
//!
//! let id = PieceId::for_spawn(piece_type, Cell::new(7, 0));
//! let idle = State::initial(&graph, Cell::new(7, 0), 0);
//! let moving = idle
//!     .next(&Command::move_to(0, id, Cell::new(7, 0), Cell::new(3, 0)), 0)
//!     .unwrap();
//!
//! assert_eq!(moving.kind(), StateKind::Move);
//! assert!(moving.physics().is_moving());
//! ```

mod template;

pub use template::{
    AnimationSpec, StateIdx, StateKind, StateTemplate, TemplateError, TemplateGraph,
    TemplateGraphBuilder, TemplateLibrary,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Cell;
use crate::command::{Command, CommandKind};
use crate::physics::Physics;
use crate::piece::PieceId;
use crate::Millis;

// =============================================================================
// Animation
// =============================================================================

/// Frame bookkeeping for the renderer.
///
/// The core never draws; it only tracks which frame of the active state's
/// sprite sequence should be shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    spec: AnimationSpec,
    started_at: Millis,
    frame: u32,
}

impl Animation {
    /// Creates bookkeeping that starts at `now` on frame 0.
    #[must_use]
    pub fn new(spec: AnimationSpec, now: Millis) -> Self {
        Self {
            spec,
            started_at: now,
            frame: 0,
        }
    }

    /// Restarts from frame 0.
    pub fn reset(&mut self, now: Millis) {
        self.started_at = now;
        self.frame = 0;
    }

    /// Advances the clock and returns the frame to show.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn update(&mut self, now: Millis) -> u32 {
        let count = self.spec.frame_count.max(1);
        let elapsed = now.saturating_sub(self.started_at) as f64;
        let raw = (elapsed * f64::from(self.spec.fps) / 1000.0).floor() as u64;
        self.frame = if self.spec.looping {
            (raw % u64::from(count)) as u32
        } else {
            raw.min(u64::from(count - 1)) as u32
        };
        self.frame
    }

    /// Frame computed by the last update.
    #[must_use]
    pub const fn frame(&self) -> u32 {
        self.frame
    }

    /// Number of frames in the sequence.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.spec.frame_count
    }

    /// Whether the sequence wraps.
    #[must_use]
    pub const fn is_looping(&self) -> bool {
        self.spec.looping
    }
}

// =============================================================================
// State
// =============================================================================

/// One live, instantiated state of a piece.
#[derive(Debug, Clone)]
pub struct State {
    graph: Arc<TemplateGraph>,
    slot: StateIdx,
    activated_at: Millis,
    physics: Physics,
    animation: Animation,
}

impl State {
    /// Instantiates the graph's idle state at `cell`.
    #[must_use]
    pub fn initial(graph: &Arc<TemplateGraph>, cell: Cell, now: Millis) -> Self {
        Self::instantiate(graph, graph.idle(), Physics::new(cell, *graph.physics()), now)
    }

    fn instantiate(
        graph: &Arc<TemplateGraph>,
        slot: StateIdx,
        physics: Physics,
        now: Millis,
    ) -> Self {
        let spec = *graph.template(slot).animation();
        Self {
            graph: Arc::clone(graph),
            slot,
            activated_at: now,
            physics,
            animation: Animation::new(spec, now),
        }
    }

    /// Template this state was instantiated from.
    #[must_use]
    pub fn template(&self) -> &StateTemplate {
        self.graph.template(self.slot)
    }

    /// State identifier.
    #[must_use]
    pub fn kind(&self) -> StateKind {
        self.template().kind()
    }

    /// Returns true for timed rest states.
    #[must_use]
    pub fn is_rest(&self) -> bool {
        self.template().rest().is_some()
    }

    /// When this instance became active.
    #[must_use]
    pub const fn activated_at(&self) -> Millis {
        self.activated_at
    }

    /// Owned physics.
    #[must_use]
    pub const fn physics(&self) -> &Physics {
        &self.physics
    }

    /// Mutable access to the owned physics.
    pub fn physics_mut(&mut self) -> &mut Physics {
        &mut self.physics
    }

    /// Animation bookkeeping.
    #[must_use]
    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Shared graph this state belongs to.
    #[must_use]
    pub fn graph(&self) -> &Arc<TemplateGraph> {
        &self.graph
    }

    /// Returns true unless this is a rest state whose timer is still running.
    #[must_use]
    pub fn can_transition(&self, now: Millis) -> bool {
        match self.template().rest() {
            None => true,
            Some(rest) => now.saturating_sub(self.activated_at) >= rest,
        }
    }

    /// Computes the successor for `cmd`, if any.
    ///
    /// Returns `None` (stay) when the rest timer forbids leaving or when the
    /// command's kind has no transition. Otherwise the target template is
    /// instantiated, inherits this state's cells, is stamped with the
    /// command's timestamp and has the command applied to its physics.
    #[must_use]
    pub fn next(&self, cmd: &Command, now: Millis) -> Option<State> {
        if !self.can_transition(now) {
            return None;
        }
        let slot = self.template().transition(cmd.kind())?;

        let mut physics = Physics::new(self.physics.current_cell(), *self.graph.physics());
        physics.carry_cells_from(&self.physics);
        physics.apply_command(cmd);

        let next = Self::instantiate(&self.graph, slot, physics, cmd.timestamp());
        debug!(
            piece = %cmd.piece(),
            from = %self.kind(),
            to = %next.kind(),
            trigger = %cmd.kind(),
            "state transition"
        );
        Some(next)
    }

    /// Re-creates this state in another piece type's graph.
    ///
    /// The state of the same kind is used (idle if the graph lacks it), and
    /// physics and activation time are kept, so an in-flight slide or a
    /// running rest timer continues unchanged. Animation restarts at `now`.
    #[must_use]
    pub fn carried_into(&self, graph: &Arc<TemplateGraph>, now: Millis) -> State {
        let slot = graph.find(self.kind()).unwrap_or_else(|| graph.idle());
        let mut state = Self::instantiate(graph, slot, self.physics.clone(), self.activated_at);
        state.animation.reset(now);
        state
    }

    /// Per-frame update.
    ///
    /// Advances animation and physics, then derives at most one automatic
    /// transition: `complete` when movement just finished, `timeout` when a
    /// rest timer has run out, or a late `complete` for a `move` state that
    /// is no longer moving.
    pub fn tick(&mut self, piece: &PieceId, now: Millis) -> Option<State> {
        self.animation.update(now);
        let template = self.template();
        let has_complete = template.has_transition(CommandKind::Complete);
        let has_timeout = template.has_transition(CommandKind::Timeout);
        let is_rest = template.rest().is_some();
        let kind = template.kind();

        if self.physics.advance(now) && has_complete {
            return self.next(&Command::complete(now, piece.clone()), now);
        }
        if is_rest && has_timeout && self.can_transition(now) {
            return self.next(&Command::timeout(now, piece.clone()), now);
        }
        if kind == StateKind::Move && !self.physics.is_moving() && has_complete {
            return self.next(&Command::complete(now, piece.clone()), now);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::moves::MovementRules;
    use crate::physics::PhysicsParams;
    use crate::piece::{Color, PieceKind, PieceType};

    fn rook_type() -> PieceType {
        PieceType::new(PieceKind::Rook, Color::White)
    }

    fn standard_graph() -> Arc<TemplateGraph> {
        let config = SimConfig::default();
        let rules = Arc::new(MovementRules::standard(
            PieceKind::Rook,
            Color::White,
            config.board,
        ));
        Arc::new(TemplateGraph::standard(rook_type(), rules, &config).unwrap())
    }

    fn id() -> PieceId {
        PieceId::for_spawn(rook_type(), Cell::new(7, 0))
    }

    fn moved(graph: &Arc<TemplateGraph>, to: Cell, at: Millis) -> State {
        State::initial(graph, Cell::new(7, 0), 0)
            .next(&Command::move_to(at, id(), Cell::new(7, 0), to), at)
            .unwrap()
    }

    mod can_transition_tests {
        use super::*;

        #[test]
        fn non_rest_always_transitions() {
            let idle = State::initial(&standard_graph(), Cell::new(7, 0), 0);
            assert!(!idle.is_rest());
            assert!(idle.can_transition(0));
        }

        #[test]
        fn rest_boundary_is_inclusive() {
            let graph = standard_graph();
            let mut state = moved(&graph, Cell::new(6, 0), 1000);
            // 1 cell at 4 cells/s → 250ms, then long rest of 3000ms.
            let rest = state.tick(&id(), 1250).unwrap();
            assert_eq!(rest.kind(), StateKind::LongRest);
            assert_eq!(rest.activated_at(), 1250);

            assert!(!rest.can_transition(1250));
            assert!(!rest.can_transition(4249));
            assert!(rest.can_transition(4250));
            assert!(rest.can_transition(100_000));
        }
    }

    mod next_tests {
        use super::*;

        #[test]
        fn move_from_idle_arms_physics() {
            let graph = standard_graph();
            let state = moved(&graph, Cell::new(5, 0), 200);
            assert_eq!(state.kind(), StateKind::Move);
            assert_eq!(state.activated_at(), 200);
            assert_eq!(state.physics().target_cell(), Cell::new(5, 0));
            assert_eq!(state.physics().duration(), 500);
        }

        #[test]
        fn unknown_trigger_stays() {
            let idle = State::initial(&standard_graph(), Cell::new(7, 0), 0);
            assert!(idle.next(&Command::complete(0, id()), 0).is_none());
            assert!(idle.next(&Command::timeout(0, id()), 0).is_none());
        }

        #[test]
        fn missing_target_state_stays_put() {
            // A graph without jump/attack states: idle has no Jump edge.
            let rules = Arc::new(MovementRules::new(vec![], crate::board::BoardGeometry::STANDARD));
            let graph = Arc::new(
                TemplateGraph::builder(rook_type(), rules, PhysicsParams::default())
                    .default_wiring(&SimConfig::default())
                    .build()
                    .unwrap(),
            );
            let idle = State::initial(&graph, Cell::new(7, 0), 0);
            let cmd = Command::jump(0, id(), Cell::new(7, 0), Cell::new(7, 0));
            assert!(idle.next(&cmd, 0).is_none());
            assert!(idle.next(&Command::attack(0, id()), 0).is_none());
        }

        #[test]
        fn rest_state_drops_commands_until_elapsed() {
            let graph = standard_graph();
            let mut state = moved(&graph, Cell::new(6, 0), 0);
            let rest = state.tick(&id(), 250).unwrap();
            // Rest has no Move edge either way, but timeout is refused early.
            assert!(rest.next(&Command::timeout(1000, id()), 1000).is_none());
            let idle = rest.next(&Command::timeout(3250, id()), 3250).unwrap();
            assert_eq!(idle.kind(), StateKind::Idle);
        }

        #[test]
        fn successor_inherits_cells() {
            let graph = standard_graph();
            let mut state = moved(&graph, Cell::new(4, 0), 0);
            let rest = state.tick(&id(), 750).unwrap();
            assert_eq!(rest.physics().current_cell(), Cell::new(4, 0));
            assert_eq!(rest.physics().target_cell(), Cell::new(4, 0));
            assert!(!rest.physics().is_moving());
        }

        #[test]
        fn successor_does_not_share_timers() {
            let graph = standard_graph();
            let a = moved(&graph, Cell::new(6, 0), 0);
            let b = moved(&graph, Cell::new(6, 0), 900);
            assert_eq!(a.physics().started_at(), 0);
            assert_eq!(b.physics().started_at(), 900);
            assert!(Arc::ptr_eq(a.graph(), b.graph()));
        }
    }

    mod tick_tests {
        use super::*;

        #[test]
        fn move_completes_into_long_rest_then_idle() {
            let graph = standard_graph();
            let mut state = moved(&graph, Cell::new(5, 0), 0);

            assert!(state.tick(&id(), 499).is_none());
            let mut rest = state.tick(&id(), 500).unwrap();
            assert_eq!(rest.kind(), StateKind::LongRest);

            assert!(rest.tick(&id(), 3499).is_none());
            let idle = rest.tick(&id(), 3500).unwrap();
            assert_eq!(idle.kind(), StateKind::Idle);
            assert_eq!(idle.physics().current_cell(), Cell::new(5, 0));
        }

        #[test]
        fn jump_goes_to_short_rest() {
            let graph = standard_graph();
            let idle = State::initial(&graph, Cell::new(7, 0), 0);
            let mut jump = idle
                .next(&Command::jump(0, id(), Cell::new(7, 0), Cell::new(7, 0)), 0)
                .unwrap();
            assert_eq!(jump.kind(), StateKind::Jump);
            assert!(jump.tick(&id(), 1499).is_none());

            let short = jump.tick(&id(), 1500).unwrap();
            assert_eq!(short.kind(), StateKind::ShortRest);
            assert_eq!(short.physics().current_cell(), Cell::new(7, 0));
        }

        #[test]
        fn tick_is_idempotent_without_pending_transition() {
            let mut idle = State::initial(&standard_graph(), Cell::new(7, 0), 0);
            let before = idle.clone();
            assert!(idle.tick(&id(), 100).is_none());
            assert!(idle.tick(&id(), 100).is_none());
            assert_eq!(idle.physics(), before.physics());
            assert_eq!(idle.kind(), before.kind());
        }

        #[test]
        fn stopped_move_state_still_completes() {
            let graph = standard_graph();
            let mut state = moved(&graph, Cell::new(3, 0), 0);
            state.physics_mut().stop();

            let rest = state.tick(&id(), 10).unwrap();
            assert_eq!(rest.kind(), StateKind::LongRest);
            assert_eq!(rest.physics().current_cell(), Cell::new(7, 0));
        }
    }

    mod animation_tests {
        use super::*;

        fn spec(frames: u32, looping: bool) -> AnimationSpec {
            AnimationSpec {
                frame_count: frames,
                fps: 6.0,
                looping,
            }
        }

        #[test]
        fn looping_wraps() {
            let mut anim = Animation::new(spec(4, true), 0);
            assert_eq!(anim.update(0), 0);
            assert_eq!(anim.update(500), 3);
            assert_eq!(anim.update(700), 0);
        }

        #[test]
        fn non_looping_holds_last_frame() {
            let mut anim = Animation::new(spec(4, false), 0);
            assert_eq!(anim.update(10_000), 3);
        }

        #[test]
        fn reset_restarts() {
            let mut anim = Animation::new(spec(4, true), 0);
            anim.update(400);
            anim.reset(1000);
            assert_eq!(anim.frame(), 0);
            assert_eq!(anim.update(1100), 0);
        }
    }
}
