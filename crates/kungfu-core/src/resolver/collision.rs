//! Collision resolver: same-position occupancy becomes blocks or captures.
//!
//! Runs once per tick after every piece has advanced. Pieces are bucketed by
//! their interpolated pixel position (not their discrete cell), and each
//! bucket with more than one occupant is resolved:
//!
//! A piece counts as *active* while it is unsettled, and also on the tick its
//! slide or jump lands: by then ADVANCE has already moved it into its rest
//! state, but it is still the piece that arrived.
//!
//! - **Same color.** If inactive and active pieces share the spot, every
//!   active one is blocked. If all are active, all but the one chosen by the
//!   [`TieBreak`] policy are blocked. If none is active nothing happens. A
//!   blocked piece stops in place (target snapped to its current cell) and
//!   receives an idle command.
//! - **Mixed colors.** The active occupant is the attacker; when that is
//!   ambiguous, the most recent action wins. One defender of the other color,
//!   preferably inactive, is captured. There is no piece-value comparison.
//!
//! Captured pieces are removed after all buckets are scanned, and one
//! [`Event::PieceCaptured`] is recorded per removal.

use std::collections::BTreeMap;

use tracing::debug;

use super::tie_break::{FirstInOrder, TieBreak};
use super::Resolver;
use crate::arena::Arena;
use crate::event::{CapturedPiece, Event, EventLog};
use crate::piece::{Color, Piece, PieceId};
use crate::Millis;

/// Resolves same-position collisions each tick.
#[derive(Debug)]
pub struct CollisionResolver {
    tie_break: Box<dyn TieBreak>,
}

impl CollisionResolver {
    /// Creates a resolver with the [`FirstInOrder`] tie-break.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tie_break(FirstInOrder)
    }

    /// Creates a resolver with a custom friendly tie-break.
    #[must_use]
    pub fn with_tie_break(policy: impl TieBreak + 'static) -> Self {
        Self {
            tie_break: Box::new(policy),
        }
    }

    /// Ids of friendly pieces in `group` that must stop.
    fn friendly_blocks(&self, group: &[&Piece], now: Millis) -> Vec<PieceId> {
        let active = group.iter().filter(|p| is_active(p, now)).count();
        if active == 0 {
            return Vec::new();
        }
        if active < group.len() {
            return group
                .iter()
                .filter(|p| is_active(p, now))
                .map(|p| p.id().clone())
                .collect();
        }

        let keep = self.tie_break.keep(group);
        group
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != keep)
            .map(|(_, p)| p.id().clone())
            .collect()
    }
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Unsettled, or landed exactly at `now`.
fn is_active(piece: &Piece, now: Millis) -> bool {
    !piece.is_settled() || piece.just_arrived(now)
}

/// Piece with the latest action; earlier entries win ties.
fn most_recent<'a>(pieces: &[&'a Piece]) -> Option<&'a Piece> {
    pieces.iter().copied().fold(None, |best, piece| match best {
        Some(b) if b.last_action() >= piece.last_action() => Some(b),
        _ => Some(piece),
    })
}

/// Picks `(defender, attacker)` for a mixed-color bucket.
fn enemy_capture<'a>(occupants: &[&'a Piece], now: Millis) -> Option<(&'a Piece, &'a Piece)> {
    let active: Vec<&Piece> = occupants.iter().copied().filter(|p| is_active(p, now)).collect();
    let attacker = if !active.is_empty() && active.len() < occupants.len() {
        most_recent(&active)?
    } else {
        most_recent(occupants)?
    };
    let defender = occupants
        .iter()
        .copied()
        .filter(|p| p.color() != attacker.color())
        .min_by_key(|p| (is_active(p, now), p.last_action()))?;
    Some((defender, attacker))
}

impl Resolver for CollisionResolver {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn resolve(&self, now: Millis, arena: &mut Arena, events: &mut EventLog) {
        let mut blocks: Vec<PieceId> = Vec::new();
        let mut captures: BTreeMap<PieceId, PieceId> = BTreeMap::new();

        for ids in arena.buckets_by_pixel(now).into_values() {
            if ids.len() < 2 {
                continue;
            }
            let occupants: Vec<&Piece> = ids.iter().filter_map(|id| arena.get(id)).collect();

            for color in Color::ALL {
                let group: Vec<&Piece> = occupants
                    .iter()
                    .copied()
                    .filter(|p| p.color() == color)
                    .collect();
                if group.len() > 1 {
                    blocks.extend(self.friendly_blocks(&group, now));
                }
            }

            let mixed = occupants.iter().any(|p| p.color() == Color::White)
                && occupants.iter().any(|p| p.color() == Color::Black);
            if mixed {
                if let Some((defender, attacker)) = enemy_capture(&occupants, now) {
                    captures.insert(defender.id().clone(), attacker.id().clone());
                }
            }
        }

        for id in &blocks {
            if captures.contains_key(id) {
                continue;
            }
            if let Some(piece) = arena.get_mut(id) {
                debug!(piece = %id, now, "friendly collision: blocked");
                piece.block(now);
            }
        }

        for (victim, attacker) in captures {
            if let Some(piece) = arena.despawn(&victim) {
                debug!(piece = %victim, by = %attacker, now, "captured");
                events.push(Event::PieceCaptured {
                    piece: CapturedPiece::from(&piece),
                    by: attacker,
                    at: now,
                });
            }
        }
    }
}
