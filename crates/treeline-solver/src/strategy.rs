//! Decision-producing strategies.

use std::fmt::Debug;

use crate::decision::Decision;

/// Produces the next decision to branch on.
///
/// A strategy owns whatever view of the model it needs (typically a shared
/// handle on the variable store); the search core only asks it for fresh
/// decisions and treats `None` as "the current node is a leaf".
pub trait Strategy: Debug {
    /// Prepares internal structures before the search starts.
    ///
    /// Returning false reports that the strategy can never produce a
    /// decision (for instance, an empty variable scope it rejects), which
    /// makes `Move::init` fail and the search end without exploring.
    fn init(&mut self) -> bool {
        true
    }

    /// The next decision, or `None` at a leaf.
    fn next_decision(&mut self) -> Option<Decision>;
}
