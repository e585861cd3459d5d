//! Test helper functions for setting up simulations and pieces.

use crate::board::Cell;
use crate::command::Command;
use crate::config::SimConfig;
use crate::event::{CapturedPiece, Event};
use crate::piece::{Color, PieceId, PieceKind, PieceType};
use crate::simulation::Simulation;
use crate::Millis;

/// Frame length used by the stepping helpers.
pub const FRAME: Millis = 50;

/// Installs a test-writer subscriber once per process.
///
/// Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// =============================================================================
// Simulation Setup
// =============================================================================

/// An empty simulation with the default configuration.
pub fn new_sim() -> Simulation {
    init_tracing();
    Simulation::new(SimConfig::default()).unwrap()
}

/// An empty simulation with a custom configuration.
pub fn sim_with(config: SimConfig) -> Simulation {
    init_tracing();
    Simulation::new(config).unwrap()
}

/// A simulation with the classic 32-piece starting position.
pub fn standard_sim() -> Simulation {
    let mut sim = new_sim();
    sim.standard_setup(0).unwrap();
    sim
}

/// Spawns a piece at `(row, col)` at time 0.
pub fn spawn(sim: &mut Simulation, kind: PieceKind, color: Color, row: i32, col: i32) -> PieceId {
    sim.spawn(PieceType::new(kind, color), Cell::new(row, col), 0)
        .unwrap()
}

// =============================================================================
// Commands and Stepping
// =============================================================================

/// A move command for `id` from its current cell.
pub fn move_cmd(sim: &Simulation, id: &PieceId, at: Millis, to: Cell) -> Command {
    let from = sim.arena().get(id).unwrap().cell();
    Command::move_to(at, id.clone(), from, to)
}

/// A jump command for `id` in place.
pub fn jump_cmd(sim: &Simulation, id: &PieceId, at: Millis) -> Command {
    let cell = sim.arena().get(id).unwrap().cell();
    Command::jump(at, id.clone(), cell, cell)
}

/// Steps the simulation every [`FRAME`] ms over `from..=until`, collecting
/// all events.
pub fn run(sim: &mut Simulation, from: Millis, until: Millis) -> Vec<Event> {
    let mut events = Vec::new();
    let mut now = from;
    while now <= until {
        sim.step(now);
        events.extend(sim.take_events());
        now += FRAME;
    }
    events
}

// =============================================================================
// Queries
// =============================================================================

/// Captured pieces in event order.
pub fn captures(events: &[Event]) -> Vec<(CapturedPiece, PieceId)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::PieceCaptured { piece, by, .. } => Some((piece.clone(), by.clone())),
            _ => None,
        })
        .collect()
}

/// Current cell of a live piece.
pub fn cell_of(sim: &Simulation, id: &PieceId) -> Cell {
    sim.arena().get(id).unwrap().cell()
}
