//! Depth-bounded discrepancy search.

use treeline_core::{Env, ReversibleInt};

use crate::scope::SearchScope;
use crate::strategy::Strategy;

use super::{rewind, Move, SearchMove};

/// Iterative depth-bounded discrepancy search.
///
/// Like limited-discrepancy search, but the wave with budget `k` spends its
/// discrepancies near the root: when exactly one unit of budget remains, a
/// fresh decision commits its refutation directly, so deeper levels follow
/// the strategy's advice.
#[derive(Debug)]
pub struct MoveDds {
    strategy: Box<dyn Strategy>,
    dis: ReversibleInt,
    max_discrepancy: i32,
    top: usize,
}

impl MoveDds {
    pub fn new(env: &Env, strategy: Box<dyn Strategy>, max_discrepancy: u32) -> Self {
        Self {
            strategy,
            dis: env.make_int(0),
            max_discrepancy: max_discrepancy as i32,
            top: 0,
        }
    }
}

impl Move for MoveDds {
    fn init(&mut self, scope: &mut SearchScope) -> bool {
        self.top = scope.decision_path().len();
        self.strategy.init()
    }

    fn extend(&mut self, scope: &mut SearchScope) -> bool {
        match self.strategy.next_decision() {
            Some(mut decision) => {
                decision.build_next();
                if self.dis.get() == 1 {
                    decision.build_next();
                }
                scope.push_decision(decision);
                true
            }
            None => false,
        }
    }

    fn repair(&mut self, scope: &mut SearchScope) -> bool {
        scope.measures_mut().inc_backtracks();
        scope.env().world_pop();
        let dis = &self.dis;
        let repaired = rewind(scope, self.top, &mut || {
            if dis.get() > 0 {
                dis.add(-1);
                true
            } else {
                false
            }
        });
        if repaired {
            return true;
        }
        if self.dis.get() < self.max_discrepancy {
            scope.env().world_pop_until(scope.search_world());
            self.dis.add(1);
            tracing::debug!(discrepancy = self.dis.get(), "widening discrepancy budget");
            scope.restart();
            return true;
        }
        false
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
        assert!(
            moves.is_empty(),
            "depth-bounded discrepancy search composes over no move"
        );
    }

    fn top_decision_position(&self) -> usize {
        self.top
    }

    fn set_top_decision_position(&mut self, position: usize) {
        self.top = position;
    }
}
