//! Resolvers run after every piece has been advanced for the tick.
//!
//! A resolver inspects the arena as a whole and applies cross-piece effects
//! that no single piece can decide alone. Resolvers run in registration order
//! and record what they did into the tick's [`EventLog`].
//!
//! # Invariants
//!
//! - Resolvers MUST be deterministic given the same arena and `now`
//! - Resolvers iterate pieces in id order (the arena's natural order)
//!
//! # Available Resolvers
//!
//! - [`CollisionResolver`]: friendly blocks and enemy captures

mod collision;
mod tie_break;

pub use collision::CollisionResolver;
pub use tie_break::{EarliestAction, FirstInOrder, TieBreak};

use crate::arena::Arena;
use crate::event::EventLog;
use crate::Millis;

/// A tick-level service that mutates the arena after pieces have advanced.
///
/// # Example
///
/// ```
/// use kungfu_core::arena::Arena;
/// use kungfu_core::event::EventLog;
/// use kungfu_core::resolver::Resolver;
///
/// struct Noop;
///
/// impl Resolver for Noop {
///     fn name(&self) -> &'static str {
///         "noop"
///     }
///
///     fn resolve(&self, _now: u64, _arena: &mut Arena, _events: &mut EventLog) {}
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Applies this resolver's effects for the tick at `now`.
    fn resolve(&self, now: Millis, arena: &mut Arena, events: &mut EventLog);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn Resolver>) {}
        fn _accepts_slice(_resolvers: &[Box<dyn Resolver>]) {}
    }

    #[test]
    fn tie_break_is_object_safe() {
        fn _accepts_boxed(_policy: Box<dyn TieBreak>) {}
    }
}
