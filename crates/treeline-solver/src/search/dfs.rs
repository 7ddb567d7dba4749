//! Depth-first search.

use crate::scope::SearchScope;
use crate::strategy::Strategy;

use super::{extend_from, rewind, Move, SearchMove};

/// Plain chronological depth-first search: dive left, backtrack to the most
/// recent open branch on failure.
#[derive(Debug)]
pub struct MoveDfs {
    strategy: Box<dyn Strategy>,
    top: usize,
}

impl MoveDfs {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self { strategy, top: 0 }
    }
}

impl Move for MoveDfs {
    fn init(&mut self, scope: &mut SearchScope) -> bool {
        self.top = scope.decision_path().len();
        self.strategy.init()
    }

    fn extend(&mut self, scope: &mut SearchScope) -> bool {
        extend_from(self.strategy.as_mut(), scope)
    }

    fn repair(&mut self, scope: &mut SearchScope) -> bool {
        scope.measures_mut().inc_backtracks();
        scope.env().world_pop();
        rewind(scope, self.top, &mut || true)
    }

    fn strategy(&self) -> Option<&dyn Strategy> {
        Some(self.strategy.as_ref())
    }

    fn set_strategy(&mut self, strategy: Box<dyn Strategy>) {
        self.strategy = strategy;
    }

    fn child_moves(&self) -> &[SearchMove] {
        &[]
    }

    fn set_child_moves(&mut self, moves: Vec<SearchMove>) {
        assert!(moves.is_empty(), "depth-first search composes over no move");
    }

    fn top_decision_position(&self) -> usize {
        self.top
    }

    fn set_top_decision_position(&mut self, position: usize) {
        self.top = position;
    }
}
