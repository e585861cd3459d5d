//! # Kung-Fu Core
//!
//! Real-time chess core: every piece runs its own timed state machine and
//! moves continuously across the board. There are no turns. Actions are
//! gated by a per-piece cooldown and by rest states, and captures happen when
//! two pieces resolve to the same board position during a tick.
//!
//! ## Architecture
//!
//! - **Commands** ([`command`]): immutable action descriptors fed in by an
//!   input collaborator through a thread-safe queue.
//! - **Pieces** ([`piece`]): own one live [`state::State`] each, plus an
//!   action cooldown and first-move tracking.
//! - **States** ([`state`]): nodes of a per-type automaton instantiated from a
//!   shared, read-only [`state::TemplateGraph`]. Each state owns its
//!   [`physics::Physics`].
//! - **Resolvers** ([`resolver`]): tick-level services; the
//!   [`resolver::CollisionResolver`] turns same-position occupancy into forced
//!   idles or captures.
//! - **Simulation** ([`simulation`]): the per-tick loop tying it all together.
//!
//! ## Determinism
//!
//! All timers are driven by the `now` value handed to
//! [`simulation::Simulation::step`]; nothing reads the wall clock. Given the same
//! initial pieces and the same ordered `(now, Command)` stream, two runs
//! produce identical results.
//!
//! ## Usage
//!
//! ```
//! use kungfu_core::board::Cell;
//! use kungfu_core::command::Command;
//! use kungfu_core::config::SimConfig;
//! use kungfu_core::piece::PieceId;
//! use kungfu_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(SimConfig::default()).unwrap();
//! sim.standard_setup(0).unwrap();
//!
//! let pawn = PieceId::parse("PW_6_4").unwrap();
//! sim.submit(Command::move_to(0, pawn.clone(), Cell::new(6, 4), Cell::new(4, 4)));
//!
//! sim.step(0);
//! sim.step(500);
//!
//! let piece = sim.arena().get(&pawn).unwrap();
//! assert_eq!(piece.cell(), Cell::new(4, 4));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod board;
pub mod command;
pub mod config;
pub mod event;
pub mod moves;
pub mod physics;
pub mod piece;
pub mod promotion;
pub mod resolver;
pub mod rules;
pub mod score;
pub mod simulation;
pub mod state;

/// Milliseconds on the simulation clock.
///
/// All timestamps and durations in the core use this unit. The clock is
/// supplied by the caller of [`simulation::Simulation::step`].
pub type Millis = u64;

#[cfg(test)]
mod tests;
