//! Simulation module with the per-tick execution loop.
//!
//! The `Simulation` struct owns the arena, the template library and the
//! resolvers, and drives everything from one caller-supplied clock value per
//! tick:
//!
//! 1. **DRAIN**: Pull every queued command from the inbox, in FIFO order
//! 2. **DISPATCH**: Route each command to its piece (promotions to the
//!    promotion path) and record a `CommandApplied` event
//! 3. **ADVANCE**: Tick every piece in parallel (rayon)
//! 4. **RESOLVE**: Run resolvers in registration order (collisions)
//! 5. **OUTCOME**: Check for a fallen king, then advance the tick counter
//!
//! # Determinism
//!
//! Nothing reads the wall clock. Pieces are iterated in id order (via
//! `BTreeMap`) and share no mutable state during ADVANCE, so the same initial
//! board and the same ordered `(now, Command)` stream yield the same
//! [`Simulation::snapshot`] on every run.
//!
//! # Example
//!
//! ```
//! use kungfu_core::board::Cell;
//! use kungfu_core::command::Command;
//! use kungfu_core::config::SimConfig;
//! use kungfu_core::piece::{Color, PieceKind, PieceType};
//! use kungfu_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(SimConfig::default()).unwrap();
//! let rook = sim
//!     .spawn(PieceType::new(PieceKind::Rook, Color::White), Cell::new(7, 0), 0)
//!     .unwrap();
//!
//! // Input threads hold a cloned sender.
//! let sender = sim.command_sender();
//! sender.send(Command::move_to(0, rook.clone(), Cell::new(7, 0), Cell::new(3, 0)));
//!
//! sim.step(0);
//! sim.step(1000);
//!
//! assert_eq!(sim.arena().get(&rook).unwrap().cell(), Cell::new(3, 0));
//! assert_eq!(sim.tick(), 2);
//! ```

use std::fmt;
use std::sync::mpsc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::arena::{Arena, ArenaError};
use crate::board::Cell;
use crate::command::{Command, CommandKind};
use crate::config::{ConfigError, SimConfig};
use crate::event::{Event, EventLog, Outcome};
use crate::piece::{Color, Dispatch, Piece, PieceId, PieceKind, PieceType};
use crate::promotion::apply_promotion;
use crate::resolver::{CollisionResolver, Resolver, TieBreak};
use crate::rules::{validate_move, MoveRejection};
use crate::state::{StateKind, TemplateError, TemplateLibrary};
use crate::Millis;

/// Back rank from column 0 to 7.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while building or populating a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A template graph failed validation.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A piece could not be registered.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// The library has no graph for this piece type.
    #[error("no template for `{0}`")]
    MissingTemplate(PieceType),

    /// The board cannot hold the classic starting position.
    #[error("standard setup needs 8 columns and at least 4 rows, got {rows}x{cols}")]
    BoardTooSmall {
        /// Configured rows.
        rows: i32,
        /// Configured columns.
        cols: i32,
    },
}

// =============================================================================
// Command Sender
// =============================================================================

/// Cloneable handle for feeding commands from any thread.
#[derive(Debug, Clone)]
pub struct CommandSender {
    inner: mpsc::Sender<Command>,
}

impl CommandSender {
    /// Queues a command for the next tick.
    ///
    /// Returns false if the simulation has been dropped.
    pub fn send(&self, cmd: Command) -> bool {
        self.inner.send(cmd).is_ok()
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Serializable view of one piece, used for comparisons and replays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    /// Piece id.
    pub id: PieceId,
    /// Active state.
    pub state: StateKind,
    /// Current cell.
    pub cell: Cell,
    /// Target cell.
    pub target: Cell,
    /// Pixel position `(x, y)` at the last step.
    pub pixel: (i32, i32),
    /// Whether a slide or jump is in progress.
    pub moving: bool,
    /// Last accepted action.
    pub last_action: Option<Millis>,
    /// Accepted moves and jumps.
    pub moves: u32,
}

impl PieceSnapshot {
    fn capture(piece: &Piece, now: Millis) -> Self {
        let pixel = piece.pixel_position(now);
        Self {
            id: piece.id().clone(),
            state: piece.state().kind(),
            cell: piece.cell(),
            target: piece.state().physics().target_cell(),
            pixel: (pixel.x, pixel.y),
            moving: piece.is_moving(),
            last_action: piece.last_action(),
            moves: piece.moves().count(),
        }
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// The real-time chess orchestrator.
pub struct Simulation {
    arena: Arena,
    config: SimConfig,
    library: TemplateLibrary,
    sender: mpsc::Sender<Command>,
    inbox: mpsc::Receiver<Command>,
    resolvers: Vec<Box<dyn Resolver>>,
    events: EventLog,
    outcome: Outcome,
    now: Millis,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("arena", &self.arena)
            .field("config", &self.config)
            .field("library", &format!("[{} graphs]", self.library.len()))
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("events", &self.events.len())
            .field("outcome", &self.outcome)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates an empty simulation with the standard template library and a
    /// [`CollisionResolver`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the configuration fails validation and
    /// [`SimError::Template`] if a standard graph cannot be built.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let library = TemplateLibrary::standard(&config)?;
        Ok(Self::with_library(config, library))
    }

    /// Creates an empty simulation around a caller-supplied library.
    ///
    /// The configuration is used as-is.
    #[must_use]
    pub fn with_library(config: SimConfig, library: TemplateLibrary) -> Self {
        let (sender, inbox) = mpsc::channel();
        Self {
            arena: Arena::new(),
            config,
            library,
            sender,
            inbox,
            resolvers: vec![Box::new(CollisionResolver::new())],
            events: EventLog::new(),
            outcome: Outcome::Ongoing,
            now: 0,
        }
    }

    /// Swaps the collision resolver's friendly tie-break.
    #[must_use]
    pub fn with_tie_break(mut self, policy: impl TieBreak + 'static) -> Self {
        let collision: Box<dyn Resolver> = Box::new(CollisionResolver::with_tie_break(policy));
        match self.resolvers.iter().position(|r| r.name() == "collision") {
            Some(index) => self.resolvers[index] = collision,
            None => self.resolvers.insert(0, collision),
        }
        self
    }

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------

    /// Spawns one piece in its idle state with the configured cooldown.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingTemplate`] if the library has no graph for
    /// the type, or [`SimError::Arena`] if the id or cell is taken.
    pub fn spawn(
        &mut self,
        piece_type: PieceType,
        cell: Cell,
        now: Millis,
    ) -> Result<PieceId, SimError> {
        let graph = self
            .library
            .get(piece_type)
            .ok_or(SimError::MissingTemplate(piece_type))?;
        let id = PieceId::for_spawn(piece_type, cell);
        let piece = Piece::spawn(id.clone(), graph, cell, now)
            .with_cooldown(self.config.timing.cooldown_ms);
        self.arena.spawn(piece)?;
        Ok(id)
    }

    /// Spawns the classic starting position: black on rows 0-1, white on the
    /// last two rows.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::BoardTooSmall`] for boards that cannot hold it and
    /// propagates spawn errors.
    pub fn standard_setup(&mut self, now: Millis) -> Result<(), SimError> {
        let board = self.config.board;
        if board.cols != 8 || board.rows < 4 {
            return Err(SimError::BoardTooSmall {
                rows: board.rows,
                cols: board.cols,
            });
        }
        for (color, back, pawns) in [
            (Color::Black, 0, 1),
            (Color::White, board.rows - 1, board.rows - 2),
        ] {
            for (col, kind) in (0..).zip(BACK_RANK) {
                self.spawn(PieceType::new(kind, color), Cell::new(back, col), now)?;
                self.spawn(PieceType::new(PieceKind::Pawn, color), Cell::new(pawns, col), now)?;
            }
        }
        debug!(pieces = self.arena.len(), now, "standard setup");
        Ok(())
    }

    /// Returns every piece to a fresh idle state on its current cell.
    ///
    /// Cooldowns and move tracking are cleared; queued commands and recorded
    /// events are discarded.
    pub fn reset_all(&mut self, now: Millis) {
        for piece in self.arena.pieces_mut() {
            piece.reset_to_initial(now);
        }
        let discarded = self.inbox.try_iter().count();
        self.events.clear();
        debug!(now, discarded, "reset all pieces");
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// A handle input threads can use to queue commands.
    #[must_use]
    pub fn command_sender(&self) -> CommandSender {
        CommandSender {
            inner: self.sender.clone(),
        }
    }

    /// Queues a command for the next tick.
    pub fn submit(&self, cmd: Command) {
        // The receiver lives in `self`, so the channel is always open here.
        let _ = self.sender.send(cmd);
    }

    /// Checks a move against movement rules and the current board.
    ///
    /// # Errors
    ///
    /// See [`MoveRejection`].
    pub fn validate_move(&self, id: &PieceId, to: Cell) -> Result<(), MoveRejection> {
        validate_move(&self.arena, id, to)
    }

    // -------------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------------

    /// Executes one tick at clock value `now`.
    ///
    /// Once the game is over, queued commands are still drained but dropped.
    pub fn step(&mut self, now: Millis) {
        self.now = now;

        // PHASE 1: DRAIN
        let commands: Vec<Command> = self.inbox.try_iter().collect();

        // PHASE 2: DISPATCH
        for cmd in commands {
            if self.outcome.is_over() {
                trace!(command = %cmd, now, "dropped: game over");
                continue;
            }
            self.dispatch(cmd, now);
        }

        // PHASE 3: ADVANCE
        let changed = self.arena.tick_pieces(now);
        trace!(tick = self.arena.current_tick(), now, changed, "pieces advanced");

        // PHASE 4: RESOLVE
        for resolver in &self.resolvers {
            resolver.resolve(now, &mut self.arena, &mut self.events);
        }

        // PHASE 5: OUTCOME
        self.check_outcome(now);
        self.arena.advance_tick();
    }

    fn dispatch(&mut self, cmd: Command, now: Millis) {
        if cmd.kind() == CommandKind::Promotion {
            match apply_promotion(&mut self.arena, &self.library, &cmd, now) {
                Ok(promoted) => {
                    self.events.push(Event::CommandApplied {
                        command: cmd,
                        dispatch: Dispatch::Transitioned,
                    });
                    self.events.push(promoted);
                }
                Err(err) => trace!(command = %cmd, %err, now, "dropped: promotion"),
            }
            return;
        }

        let Some(piece) = self.arena.get_mut(cmd.piece()) else {
            trace!(command = %cmd, now, "dropped: unknown piece");
            return;
        };
        let dispatch = piece.handle_command(&cmd, now);
        self.events.push(Event::CommandApplied {
            command: cmd,
            dispatch,
        });
    }

    fn check_outcome(&mut self, now: Millis) {
        if self.outcome.is_over() {
            return;
        }
        let king_fell = self.events.events().iter().any(|event| {
            matches!(event, Event::PieceCaptured { piece, .. } if piece.kind == PieceKind::King)
        });
        if !king_fell {
            return;
        }

        let white = self.arena.count(PieceKind::King, Color::White) > 0;
        let black = self.arena.count(PieceKind::King, Color::Black) > 0;
        let outcome = match (white, black) {
            (true, true) => Outcome::Ongoing,
            (true, false) => Outcome::Winner(Color::White),
            (false, true) => Outcome::Winner(Color::Black),
            (false, false) => Outcome::Draw,
        };
        if !outcome.is_over() {
            return;
        }
        self.outcome = outcome;
        info!(outcome = ?self.outcome, now, "game over");
        self.events.push(Event::GameOver {
            outcome: self.outcome,
        });
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Drains all events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    /// Per-piece view at the last step, in id order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PieceSnapshot> {
        self.arena
            .pieces()
            .map(|piece| PieceSnapshot::capture(piece, self.now))
            .collect()
    }

    /// Read-only arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable arena for setup. Avoid mutating it between steps.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Template library pieces are spawned from.
    #[must_use]
    pub const fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    /// How the game stands.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Number of completed steps.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Clock value of the last step.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.now
    }

    /// Adds a resolver that runs after the existing ones.
    pub fn add_resolver(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    /// Number of registered resolvers.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
