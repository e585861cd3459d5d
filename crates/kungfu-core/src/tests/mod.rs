//! Cross-module tests for the simulation.
//!
//! - **Determinism tests**: identical command streams give identical boards
//! - **Integration tests**: end-to-end scenarios through [`crate::simulation::Simulation`]
//! - **Property tests**: invariants under random command streams (proptest)
//!
//! # Test Structure
//!
//! - `determinism.rs`: replays seeded random command streams twice
//! - `integration.rs`: timing, gating, collision and game-flow scenarios
//! - `properties.rs`: proptest invariants
//! - `helpers.rs`: setup utilities and factory functions

mod helpers;

pub use helpers::*;
