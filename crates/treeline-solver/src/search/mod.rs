//! The move family: composable tree-exploration policies.
//!
//! A [`Move`] decides how the search tree is walked. `extend` deepens the
//! current branch with a fresh decision, `repair` reacts to a dead end by
//! finding the next branch to try. Wrapper moves (restarts, large
//! neighborhoods) and the sequencer compose over inner moves; the closed
//! [`SearchMove`] enum keeps composition allocation-free at the call sites.

mod dds;
mod dfs;
mod hbfs;
mod lds;
mod lns;
mod restart;
mod seq;

#[cfg(test)]
mod tests;

pub use dds::MoveDds;
pub use dfs::MoveDfs;
pub use hbfs::MoveHbfs;
pub use lds::MoveLds;
pub use lns::MoveLns;
pub use restart::{MoveRestart, RestartOn};
pub use seq::MoveSeq;

use crate::decision::Decision;
use crate::scope::SearchScope;
use crate::strategy::Strategy;

/// A tree-exploration policy.
pub trait Move {
    /// Prepares the move before the search starts. Returning false aborts
    /// the search as trivially infeasible.
    fn init(&mut self, scope: &mut SearchScope) -> bool;

    /// Tries to deepen the current branch with one more decision.
    /// Returns false at a leaf.
    fn extend(&mut self, scope: &mut SearchScope) -> bool;

    /// Reacts to a dead end: rewinds to the next branch to explore.
    /// Returning false means this move's sub-tree is exhausted.
    fn repair(&mut self, scope: &mut SearchScope) -> bool;

    /// The decision-producing strategy, if this move owns one.
    fn strategy(&self) -> Option<&dyn Strategy>;

    /// Replaces the decision-producing strategy.
    ///
    /// # Panics
    ///
    /// Panics on moves that do not own a strategy (sequences, LNS wrappers).
    fn set_strategy(&mut self, strategy: Box<dyn Strategy>);

    /// Moves this one composes over. Empty for leaf moves.
    fn child_moves(&self) -> &[SearchMove];

    /// Replaces the composed moves.
    ///
    /// # Panics
    ///
    /// Panics when `moves` has the wrong length for this move's shape.
    fn set_child_moves(&mut self, moves: Vec<SearchMove>);

    /// Path position this move must not rewind past.
    fn top_decision_position(&self) -> usize;

    fn set_top_decision_position(&mut self, position: usize);
}

/// The closed set of shipped moves.
#[derive(Debug)]
pub enum SearchMove {
    Dfs(MoveDfs),
    Lds(MoveLds),
    Dds(MoveDds),
    Hbfs(MoveHbfs),
    Lns(MoveLns),
    Restart(MoveRestart),
    Seq(MoveSeq),
}

macro_rules! delegate {
    ($self:expr, $m:pat => $body:expr) => {
        match $self {
            SearchMove::Dfs($m) => $body,
            SearchMove::Lds($m) => $body,
            SearchMove::Dds($m) => $body,
            SearchMove::Hbfs($m) => $body,
            SearchMove::Lns($m) => $body,
            SearchMove::Restart($m) => $body,
            SearchMove::Seq($m) => $body,
        }
    };
}

impl Move for SearchMove {
    fn init(&mut self, scope: &mut SearchScope) -> bool {
        delegate!(self, m => m.init(scope))
    }

    fn extend(&mut self, scope: &mut SearchScope) -> bool {
        delegate!(self, m => m.extend(scope))
    }

    fn repair(&mut self, scope: &mut SearchScope) -> bool {
        delegate!(self, m => m.repair(scope))
    }

    fn strategy(&self) -> Option<&dyn Strategy> {
        delegate!(self, m => m.strategy())
    }

    fn set_strategy(&mut self, strategy: Box<dyn Strategy>) {
        delegate!(self, m => m.set_strategy(strategy))
    }

    fn child_moves(&self) -> &[SearchMove] {
        delegate!(self, m => m.child_moves())
    }

    fn set_child_moves(&mut self, moves: Vec<SearchMove>) {
        delegate!(self, m => m.set_child_moves(moves))
    }

    fn top_decision_position(&self) -> usize {
        delegate!(self, m => m.top_decision_position())
    }

    fn set_top_decision_position(&mut self, position: usize) {
        delegate!(self, m => m.set_top_decision_position(position))
    }
}

impl SearchMove {
    /// Seeds the first large-neighborhood move found in this composition
    /// with a known solution. Returns false if there is none.
    pub fn load_from_solution(&mut self, values: &[i64]) -> bool {
        match self {
            SearchMove::Lns(m) => {
                m.load_from_solution(values);
                true
            }
            SearchMove::Restart(m) => m.inner_mut().load_from_solution(values),
            SearchMove::Seq(m) => m
                .moves_mut()
                .iter_mut()
                .any(|child| child.load_from_solution(values)),
            _ => false,
        }
    }
}

/// Asks the strategy for a decision, commits its first branch and pushes it.
/// Returns false at a leaf.
pub(crate) fn extend_from(strategy: &mut dyn Strategy, scope: &mut SearchScope) -> bool {
    match strategy.next_decision() {
        Some(mut decision) => {
            decision.build_next();
            scope.push_decision(decision);
            true
        }
        None => false,
    }
}

/// Walks the path back towards `top`, committing the first available branch
/// that `gate` lets through. Exhausted decisions are dropped from the path
/// along with their world. Returns false once the path is back at `top`.
///
/// Callers pop the failed branch's world before rewinding, so the loop runs
/// at the parent state of the last decision at every step.
pub(crate) fn rewind(
    scope: &mut SearchScope,
    top: usize,
    gate: &mut dyn FnMut() -> bool,
) -> bool {
    loop {
        if scope.decision_path().len() <= top {
            return false;
        }
        let branch_left = scope
            .decision_path()
            .last()
            .is_some_and(Decision::has_next);
        if branch_left && gate() {
            if let Some(last) = scope.decision_path_mut().last_mut() {
                last.build_next();
            }
            scope.env().world_push();
            return true;
        }
        scope.env().world_pop();
        scope.decision_path_mut().remove_last();
    }
}
