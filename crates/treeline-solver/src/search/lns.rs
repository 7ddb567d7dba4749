//! Large-neighborhood search.

use crate::neighbor::Neighbor;
use crate::scope::SearchScope;
use crate::strategy::Strategy;

use super::{Move, SearchMove};

/// Wraps an inner move with a neighborhood scheme.
///
/// Until a first solution exists the inner move runs untouched. From then on
/// each restart freezes a fragment of the last solution (staged on the scope
/// and consumed by the next propagation) and the inner move repairs only the
/// relaxed part. Local exhaustions relax the neighborhood and restart; the
/// search only ends when the neighbor reports it cannot relax further.
#[derive(Debug)]
pub struct MoveLns {
    inner: Box<SearchMove>,
    neighbor: Box<dyn Neighbor>,
    /// Solution count as of the last time this move looked.
    solutions: u64,
    fresh_restart: bool,
    solution_loaded: bool,
    skip_restrict_once: bool,
    fail_frequency: Option<u64>,
    next_fail_limit: u64,
}

impl MoveLns {
    pub fn new(
        inner: SearchMove,
        neighbor: Box<dyn Neighbor>,
        fail_frequency: Option<u64>,
    ) -> Self {
        Self {
            inner: Box::new(inner),
            neighbor,
            solutions: 0,
            fresh_restart: false,
            solution_loaded: false,
            skip_restrict_once: false,
            fail_frequency,
            next_fail_limit: u64::MAX,
        }
    }

    /// Seeds the neighborhood with an externally known solution, so
    /// fragments apply from the very first restart. The first restart skips
    /// the relaxation step: the loaded solution has not been explored yet.
    pub fn load_from_solution(&mut self, values: &[i64]) {
        self.neighbor.load_from_solution(values);
        self.solution_loaded = true;
        self.skip_restrict_once = true;
        self.fresh_restart = true;
    }

    fn active(&self) -> bool {
        self.solutions > 0 || self.solution_loaded
    }

    fn do_restart(&mut self, scope: &mut SearchScope) {
        if self.skip_restrict_once {
            self.skip_restrict_once = false;
        } else {
            self.neighbor.restrict_less();
        }
        self.fresh_restart = true;
        self.next_fail_limit = match self.fail_frequency {
            Some(frequency) => scope.measures().fails().saturating_add(frequency),
            None => u64::MAX,
        };
        scope.restart();
    }

    /// Notices a solution validated since the last call, if any.
    fn record_improvement(&mut self, scope: &mut SearchScope) -> bool {
        if self.solutions < scope.measures().solutions() {
            self.solutions = scope.measures().solutions();
            self.neighbor.record_solution();
            tracing::debug!(solutions = self.solutions, "neighborhood rebuilt around new solution");
            self.do_restart(scope);
            true
        } else {
            false
        }
    }
}

impl Move for MoveLns {
    fn init(&mut self, scope: &mut SearchScope) -> bool {
        self.neighbor.init();
        self.solutions = scope.measures().solutions();
        self.next_fail_limit = match self.fail_frequency {
            Some(frequency) => scope.measures().fails().saturating_add(frequency),
            None => u64::MAX,
        };
        self.inner.init(scope)
    }

    fn extend(&mut self, scope: &mut SearchScope) -> bool {
        if !self.active() {
            return self.inner.extend(scope);
        }
        if self.fresh_restart {
            self.fresh_restart = false;
            let fragment = self.neighbor.fix_some_variables();
            scope.set_fragment(fragment);
        }
        if scope.measures().fails() >= self.next_fail_limit {
            self.do_restart(scope);
            return true;
        }
        self.inner.extend(scope)
    }

    fn repair(&mut self, scope: &mut SearchScope) -> bool {
        if self.record_improvement(scope) {
            return true;
        }
        if !self.active() {
            return self.inner.repair(scope);
        }
        if self.inner.repair(scope) {
            true
        } else if !self.neighbor.is_search_complete() {
            // the fragment is exhausted, not the tree: relax and go again
            self.do_restart(scope);
            true
        } else {
            false
        }
    }

    fn strategy(&self) -> Option<&dyn Strategy> {
        self.inner.strategy()
    }

    fn set_strategy(&mut self, _strategy: Box<dyn Strategy>) {
        panic!("large-neighborhood search delegates branching; set the strategy on the inner move");
    }

    fn child_moves(&self) -> &[SearchMove] {
        std::slice::from_ref(&*self.inner)
    }

    fn set_child_moves(&mut self, mut moves: Vec<SearchMove>) {
        assert_eq!(
            moves.len(),
            1,
            "large-neighborhood search wraps exactly one move"
        );
        if let Some(only) = moves.pop() {
            self.inner = Box::new(only);
        }
    }

    fn top_decision_position(&self) -> usize {
        self.inner.top_decision_position()
    }

    fn set_top_decision_position(&mut self, position: usize) {
        self.inner.set_top_decision_position(position);
    }
}
