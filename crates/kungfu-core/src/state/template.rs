//! Template graphs: the read-only blueprint of a piece type's automaton.
//!
//! A [`TemplateGraph`] is an index arena of [`StateTemplate`]s whose
//! transition tables point at other slots of the same arena. Graphs are
//! validated when built, so a transition can never name a state that does
//! not exist. Live [`super::State`]s hold an `Arc` to their graph and a slot
//! index; every transition instantiates a fresh state from the target slot,
//! which keeps timers independent per piece while the blueprint stays shared.
//!
//! # Default wiring
//!
//! | From         | Trigger    | To                         |
//! |--------------|------------|----------------------------|
//! | `idle`       | `Move`     | `move`                     |
//! | `idle`       | `Jump`     | `jump`                     |
//! | `idle`       | `Attack`   | `attack`                   |
//! | `move`       | `complete` | `long_rest` (else `idle`)  |
//! | `jump`       | `complete` | `short_rest` (else `idle`) |
//! | `jump`       | `timeout`  | `short_rest` (else `idle`) |
//! | `*_rest`     | `timeout`  | `idle`                     |
//! | `attack`     | `complete` | `idle`                     |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::CommandKind;
use crate::config::{AnimationConfig, SimConfig};
use crate::moves::MovementRules;
use crate::physics::PhysicsParams;
use crate::piece::PieceType;
use crate::Millis;

/// Errors raised while assembling a template graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The same state was declared twice.
    #[error("state `{0}` declared more than once")]
    DuplicateState(StateKind),

    /// A transition references a state missing from the graph.
    #[error("transition `{from}` --{trigger}--> `{to}` references an undeclared state")]
    UnknownState {
        /// Source state of the edge.
        from: StateKind,
        /// Trigger of the edge.
        trigger: CommandKind,
        /// Missing endpoint.
        to: StateKind,
    },

    /// Every graph needs an `idle` state to spawn into.
    #[error("template graph for `{0}` has no idle state")]
    MissingIdle(PieceType),
}

// =============================================================================
// State Kind
// =============================================================================

/// Identifier of a state within a piece's automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// Standing still, accepting actions.
    Idle,
    /// Sliding to another cell.
    Move,
    /// Jumping in place.
    Jump,
    /// Brief rest after a jump.
    ShortRest,
    /// Long rest after a move.
    LongRest,
    /// Attack animation.
    Attack,
}

impl StateKind {
    /// States whose physics are in motion by construction.
    #[must_use]
    pub const fn is_motion(self) -> bool {
        matches!(self, StateKind::Move | StateKind::Jump)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::Idle => "idle",
            StateKind::Move => "move",
            StateKind::Jump => "jump",
            StateKind::ShortRest => "short_rest",
            StateKind::LongRest => "long_rest",
            StateKind::Attack => "attack",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Animation Spec
// =============================================================================

/// Sprite animation parameters of one state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationSpec {
    /// Number of frames in the sprite sequence.
    pub frame_count: u32,
    /// Frames per second.
    pub fps: f32,
    /// Wrap around instead of holding the last frame.
    pub looping: bool,
}

impl AnimationSpec {
    /// Builds a spec from the shared animation config.
    #[must_use]
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self {
            frame_count: config.frame_count,
            fps: config.fps,
            looping: config.looping,
        }
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

// =============================================================================
// State Template
// =============================================================================

/// Slot index of a state inside its [`TemplateGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateIdx(usize);

impl StateIdx {
    /// Raw slot index.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

/// One node of a template graph.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTemplate {
    kind: StateKind,
    rest: Option<Millis>,
    animation: AnimationSpec,
    transitions: BTreeMap<CommandKind, StateIdx>,
}

impl StateTemplate {
    /// Which state this is.
    #[must_use]
    pub const fn kind(&self) -> StateKind {
        self.kind
    }

    /// Rest duration, if this is a rest state.
    #[must_use]
    pub const fn rest(&self) -> Option<Millis> {
        self.rest
    }

    /// Animation parameters.
    #[must_use]
    pub const fn animation(&self) -> &AnimationSpec {
        &self.animation
    }

    /// Target slot for a trigger, if wired.
    #[must_use]
    pub fn transition(&self, trigger: CommandKind) -> Option<StateIdx> {
        self.transitions.get(&trigger).copied()
    }

    /// Returns true if the trigger is wired.
    #[must_use]
    pub fn has_transition(&self, trigger: CommandKind) -> bool {
        self.transitions.contains_key(&trigger)
    }
}

// =============================================================================
// Template Graph
// =============================================================================

/// Validated, read-only automaton blueprint for one piece type.
#[derive(Debug, Clone)]
pub struct TemplateGraph {
    piece_type: PieceType,
    states: Vec<StateTemplate>,
    idle: StateIdx,
    rules: Arc<MovementRules>,
    physics: PhysicsParams,
}

impl TemplateGraph {
    /// Starts building a graph.
    #[must_use]
    pub fn builder(
        piece_type: PieceType,
        rules: Arc<MovementRules>,
        physics: PhysicsParams,
    ) -> TemplateGraphBuilder {
        TemplateGraphBuilder {
            piece_type,
            rules,
            physics,
            states: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// The full default graph: all six states with the default wiring.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in wiring; the `Result` mirrors
    /// [`TemplateGraphBuilder::build`].
    pub fn standard(
        piece_type: PieceType,
        rules: Arc<MovementRules>,
        config: &SimConfig,
    ) -> Result<Self, TemplateError> {
        let timing = &config.timing;
        let animation = AnimationSpec::from_config(&config.animation);
        Self::builder(piece_type, rules, PhysicsParams::from_config(config))
            .state(StateKind::Idle, animation)
            .state(StateKind::Move, animation)
            .state(StateKind::Attack, animation)
            .rest_state(StateKind::Jump, timing.jump_rest_ms, animation)
            .rest_state(StateKind::ShortRest, timing.short_rest_ms, animation)
            .rest_state(StateKind::LongRest, timing.long_rest_ms, animation)
            .default_wiring(config)
            .build()
    }

    /// Type this graph belongs to.
    #[must_use]
    pub const fn piece_type(&self) -> PieceType {
        self.piece_type
    }

    /// Shared movement rules.
    #[must_use]
    pub fn rules(&self) -> &Arc<MovementRules> {
        &self.rules
    }

    /// Physics parameters for instantiated states.
    #[must_use]
    pub const fn physics(&self) -> &PhysicsParams {
        &self.physics
    }

    /// Slot of the idle state.
    #[must_use]
    pub const fn idle(&self) -> StateIdx {
        self.idle
    }

    /// Template at a slot.
    ///
    /// Slots only come from this graph's own validated tables, so the
    /// lookup is always in range.
    #[must_use]
    pub fn template(&self, idx: StateIdx) -> &StateTemplate {
        &self.states[idx.0]
    }

    /// Slot of a state kind, if present.
    #[must_use]
    pub fn find(&self, kind: StateKind) -> Option<StateIdx> {
        self.states
            .iter()
            .position(|t| t.kind == kind)
            .map(StateIdx)
    }

    /// Iterates templates in slot order.
    pub fn templates(&self) -> impl Iterator<Item = &StateTemplate> {
        self.states.iter()
    }
}

/// Incremental builder for a [`TemplateGraph`].
#[derive(Debug)]
#[must_use]
pub struct TemplateGraphBuilder {
    piece_type: PieceType,
    rules: Arc<MovementRules>,
    physics: PhysicsParams,
    states: Vec<(StateKind, Option<Millis>, AnimationSpec)>,
    edges: Vec<(StateKind, CommandKind, StateKind)>,
}

impl TemplateGraphBuilder {
    /// Declares a non-rest state.
    pub fn state(mut self, kind: StateKind, animation: AnimationSpec) -> Self {
        self.states.push((kind, None, animation));
        self
    }

    /// Declares a rest state that refuses transitions for `rest` ms.
    pub fn rest_state(mut self, kind: StateKind, rest: Millis, animation: AnimationSpec) -> Self {
        self.states.push((kind, Some(rest), animation));
        self
    }

    /// Wires `from --trigger--> to`.
    pub fn transition(mut self, from: StateKind, trigger: CommandKind, to: StateKind) -> Self {
        self.edges.push((from, trigger, to));
        self
    }

    fn has(&self, kind: StateKind) -> bool {
        self.states.iter().any(|(k, _, _)| *k == kind)
    }

    /// Adds any missing essential state and wires the default table.
    ///
    /// `idle`, `move` and `long_rest` are synthesized from `config` if absent.
    /// An edge is only added when both of its endpoints are declared; edges
    /// out of rest or jump fall back to `idle` when their usual target is
    /// missing.
    pub fn default_wiring(mut self, config: &SimConfig) -> Self {
        let animation = AnimationSpec::from_config(&config.animation);
        if !self.has(StateKind::Idle) {
            self = self.state(StateKind::Idle, animation);
        }
        if !self.has(StateKind::Move) {
            self = self.state(StateKind::Move, animation);
        }
        if !self.has(StateKind::LongRest) {
            self = self.rest_state(StateKind::LongRest, config.timing.long_rest_ms, animation);
        }

        let or_idle = |b: &Self, kind| if b.has(kind) { kind } else { StateKind::Idle };
        let after_move = or_idle(&self, StateKind::LongRest);
        let after_jump = or_idle(&self, StateKind::ShortRest);

        let wiring = [
            (StateKind::Idle, CommandKind::Move, StateKind::Move),
            (StateKind::Idle, CommandKind::Jump, StateKind::Jump),
            (StateKind::Idle, CommandKind::Attack, StateKind::Attack),
            (StateKind::Move, CommandKind::Complete, after_move),
            (StateKind::Jump, CommandKind::Complete, after_jump),
            (StateKind::Jump, CommandKind::Timeout, after_jump),
            (StateKind::LongRest, CommandKind::Timeout, StateKind::Idle),
            (StateKind::ShortRest, CommandKind::Timeout, StateKind::Idle),
            (StateKind::Attack, CommandKind::Complete, StateKind::Idle),
        ];
        for (from, trigger, to) in wiring {
            if self.has(from) && self.has(to) {
                self = self.transition(from, trigger, to);
            }
        }
        self
    }

    /// Validates and freezes the graph.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::DuplicateState`] if a state was declared twice.
    /// - [`TemplateError::UnknownState`] if an edge names an undeclared state.
    /// - [`TemplateError::MissingIdle`] if there is no idle state.
    pub fn build(self) -> Result<TemplateGraph, TemplateError> {
        let mut slots: BTreeMap<StateKind, StateIdx> = BTreeMap::new();
        let mut states = Vec::with_capacity(self.states.len());
        for (kind, rest, animation) in self.states {
            if slots.insert(kind, StateIdx(states.len())).is_some() {
                return Err(TemplateError::DuplicateState(kind));
            }
            states.push(StateTemplate {
                kind,
                rest,
                animation,
                transitions: BTreeMap::new(),
            });
        }

        for (from, trigger, to) in self.edges {
            let missing = TemplateError::UnknownState { from, trigger, to };
            let (Some(&src), Some(&dst)) = (slots.get(&from), slots.get(&to)) else {
                return Err(missing);
            };
            states[src.0].transitions.insert(trigger, dst);
        }

        let idle = *slots
            .get(&StateKind::Idle)
            .ok_or(TemplateError::MissingIdle(self.piece_type))?;

        Ok(TemplateGraph {
            piece_type: self.piece_type,
            states,
            idle,
            rules: self.rules,
            physics: self.physics,
        })
    }
}

// =============================================================================
// Template Library
// =============================================================================

/// Template graphs for every piece type in play.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    graphs: BTreeMap<PieceType, Arc<TemplateGraph>>,
}

impl TemplateLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graphs: BTreeMap::new(),
        }
    }

    /// Standard graphs and built-in movement rules for all twelve types.
    ///
    /// # Errors
    ///
    /// Propagates [`TemplateError`] from graph construction.
    pub fn standard(config: &SimConfig) -> Result<Self, TemplateError> {
        let mut library = Self::new();
        for piece_type in PieceType::all() {
            let rules = Arc::new(MovementRules::standard(
                piece_type.kind,
                piece_type.color,
                config.board,
            ));
            library.insert(TemplateGraph::standard(piece_type, rules, config)?);
        }
        Ok(library)
    }

    /// Adds or replaces the graph for its piece type.
    pub fn insert(&mut self, graph: TemplateGraph) {
        self.graphs.insert(graph.piece_type(), Arc::new(graph));
    }

    /// Graph for a piece type.
    #[must_use]
    pub fn get(&self, piece_type: PieceType) -> Option<&Arc<TemplateGraph>> {
        self.graphs.get(&piece_type)
    }

    /// Number of piece types with a graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Returns true if no graphs are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
