//! Arena: the registry of live pieces.
//!
//! The arena exclusively owns every live [`Piece`]. It provides:
//! - Storage with deterministic iteration order (`BTreeMap` keyed by id)
//! - Spawn/despawn lifecycle
//! - Position queries by cell and by interpolated pixel position
//! - A tick counter
//!
//! # Determinism
//!
//! Iteration is always in [`PieceId`] order. Collision buckets are keyed by
//! `(y, x)` pixel coordinates in a `BTreeMap`, and pieces inside a bucket
//! appear in id order, so every consumer sees the same order on every run.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kungfu_core::arena::Arena;
//! use kungfu_core::board::Cell;
//! use kungfu_core::config::SimConfig;
//! use kungfu_core::piece::{Color, Piece, PieceId, PieceKind, PieceType};
//! use kungfu_core::state::TemplateLibrary;
//!
//! let library = TemplateLibrary::standard(&SimConfig::default()).unwrap();
//! let knight = PieceType::new(PieceKind::Knight, Color::White);
//! let cell = Cell::new(7, 1);
//! let id = PieceId::for_spawn(knight, cell);
//!
//! let mut arena = Arena::new();
//! arena.spawn(Piece::spawn(id.clone(), library.get(knight).unwrap(), cell, 0)).unwrap();
//!
//! assert_eq!(arena.piece_at(cell).map(|p| p.id()), Some(&id));
//! ```

use std::collections::BTreeMap;

use rayon::prelude::*;
use thiserror::Error;

use crate::board::Cell;
use crate::piece::{Color, Piece, PieceId, PieceKind};
use crate::Millis;

/// Errors raised by arena lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// A piece with this id is already registered.
    #[error("piece `{0}` already exists")]
    DuplicateId(PieceId),

    /// No piece with this id is registered.
    #[error("piece `{0}` does not exist")]
    Missing(PieceId),

    /// Another piece already stands on the spawn cell.
    #[error("cell {cell} is occupied by `{by}`")]
    Occupied {
        /// Requested spawn cell.
        cell: Cell,
        /// Current occupant.
        by: PieceId,
    },
}

/// Pixel key of a collision bucket, ordered by `(y, x)`.
pub type PixelKey = (i32, i32);

/// Registry of live pieces.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    pieces: BTreeMap<PieceId, Piece>,
    tick: u64,
}

impl Arena {
    /// Creates an empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pieces: BTreeMap::new(),
            tick: 0,
        }
    }

    /// Registers a piece.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::DuplicateId`] if the id is taken and
    /// [`ArenaError::Occupied`] if another piece stands on its cell.
    pub fn spawn(&mut self, piece: Piece) -> Result<&Piece, ArenaError> {
        if self.pieces.contains_key(piece.id()) {
            return Err(ArenaError::DuplicateId(piece.id().clone()));
        }
        if let Some(other) = self.piece_at(piece.cell()) {
            return Err(ArenaError::Occupied {
                cell: piece.cell(),
                by: other.id().clone(),
            });
        }
        let id = piece.id().clone();
        Ok(self.pieces.entry(id).or_insert(piece))
    }

    /// Swaps the piece registered as `old` for `piece` and returns the old one.
    ///
    /// Unlike [`Arena::spawn`], the cell is not checked: the replacement takes
    /// over its predecessor's position even if a friend shares it. On error
    /// the arena is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Missing`] if `old` is not registered and
    /// [`ArenaError::DuplicateId`] if another piece already uses the new id.
    pub fn replace(&mut self, old: &PieceId, piece: Piece) -> Result<Piece, ArenaError> {
        if !self.pieces.contains_key(old) {
            return Err(ArenaError::Missing(old.clone()));
        }
        if piece.id() != old && self.pieces.contains_key(piece.id()) {
            return Err(ArenaError::DuplicateId(piece.id().clone()));
        }
        let previous = self
            .pieces
            .remove(old)
            .ok_or_else(|| ArenaError::Missing(old.clone()))?;
        self.pieces.insert(piece.id().clone(), piece);
        Ok(previous)
    }

    /// Removes and returns a piece.
    pub fn despawn(&mut self, id: &PieceId) -> Option<Piece> {
        self.pieces.remove(id)
    }

    /// Looks up a piece.
    #[must_use]
    pub fn get(&self, id: &PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    /// Looks up a piece mutably.
    pub fn get_mut(&mut self, id: &PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id)
    }

    /// Returns true if the piece is registered.
    #[must_use]
    pub fn contains(&self, id: &PieceId) -> bool {
        self.pieces.contains_key(id)
    }

    /// Iterates pieces in id order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    /// Iterates pieces mutably in id order.
    pub fn pieces_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.pieces.values_mut()
    }

    /// Piece ids in sorted order.
    #[must_use]
    pub fn ids_sorted(&self) -> Vec<PieceId> {
        self.pieces.keys().cloned().collect()
    }

    /// Number of live pieces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Returns true if no pieces are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Removes every piece.
    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    /// First piece (in id order) whose current cell is `cell`.
    #[must_use]
    pub fn piece_at(&self, cell: Cell) -> Option<&Piece> {
        self.pieces.values().find(|p| p.cell() == cell)
    }

    /// Current cells of every piece.
    pub fn occupied_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.pieces.values().map(Piece::cell)
    }

    /// Number of live pieces of a kind and color.
    #[must_use]
    pub fn count(&self, kind: PieceKind, color: Color) -> usize {
        self.pieces
            .values()
            .filter(|p| p.kind() == kind && p.color() == color)
            .count()
    }

    /// Groups piece ids by interpolated pixel position at `now`.
    #[must_use]
    pub fn buckets_by_pixel(&self, now: Millis) -> BTreeMap<PixelKey, Vec<PieceId>> {
        let mut buckets: BTreeMap<PixelKey, Vec<PieceId>> = BTreeMap::new();
        for piece in self.pieces.values() {
            let pos = piece.pixel_position(now);
            buckets.entry((pos.y, pos.x)).or_default().push(piece.id().clone());
        }
        buckets
    }

    /// Advances every piece by one frame, in parallel.
    ///
    /// Pieces share no mutable state, so the result does not depend on
    /// scheduling. Returns the number of pieces that changed state.
    pub fn tick_pieces(&mut self, now: Millis) -> usize {
        self.pieces
            .par_iter_mut()
            .map(|(_, piece)| usize::from(piece.tick(now)))
            .sum()
    }

    /// Returns the current tick number.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the tick counter by one.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}
