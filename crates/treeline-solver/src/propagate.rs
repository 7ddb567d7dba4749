//! Propagation collaborator.

use crate::scope::SearchScope;

/// A propagation failure at the current node.
///
/// Contradictions are expected and frequent; they carry no payload and are
/// recovered locally by `repair`, never surfaced to the caller as an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contradiction;

impl std::fmt::Display for Contradiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("contradiction")
    }
}

/// The filtering engine seen from the search loop.
///
/// Implementations must, in order:
/// 1. consume the pending LNS fragment, if any
///    ([`SearchScope::take_fragment`]), freezing the listed variables;
/// 2. apply the current branch of the last decision on the path, if any;
/// 3. run constraint propagation to fixpoint.
///
/// Any of the three steps may fail with a [`Contradiction`].
pub trait Propagate {
    fn execute(&mut self, scope: &mut SearchScope) -> Result<(), Contradiction>;
}
