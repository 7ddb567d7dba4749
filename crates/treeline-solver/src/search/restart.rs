//! Restart wrapper.

use crate::cutoff::Cutoff;
use crate::scope::SearchScope;
use crate::strategy::Strategy;

use super::{Move, SearchMove};

/// Counter a restart cutoff is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOn {
    Fails,
    Nodes,
}

/// Wraps an inner move and forces a restart every time the watched counter
/// crosses the current cutoff. After `cap` restarts the wrapper goes
/// dormant and the inner move runs to completion.
#[derive(Debug)]
pub struct MoveRestart {
    inner: Box<SearchMove>,
    cutoff: Cutoff,
    on: RestartOn,
    cap: u64,
    num_restarts: u64,
    limit: u64,
}

impl MoveRestart {
    pub fn new(inner: SearchMove, cutoff: Cutoff, on: RestartOn, cap: u64) -> Self {
        Self {
            inner: Box::new(inner),
            cutoff,
            on,
            cap,
            num_restarts: 0,
            limit: u64::MAX,
        }
    }

    pub(crate) fn inner_mut(&mut self) -> &mut SearchMove {
        &mut self.inner
    }

    fn counter(&self, scope: &SearchScope) -> u64 {
        match self.on {
            RestartOn::Fails => scope.measures().fails(),
            RestartOn::Nodes => scope.measures().nodes(),
        }
    }

    fn cutoff_reached(&self, scope: &SearchScope) -> bool {
        self.counter(scope) >= self.limit
    }

    fn do_restart(&mut self, scope: &mut SearchScope) {
        self.num_restarts += 1;
        scope.restart();
        self.limit = if self.num_restarts >= self.cap {
            u64::MAX
        } else {
            self.counter(scope)
                .saturating_add(self.cutoff.nth(self.num_restarts))
        };
    }
}

impl Move for MoveRestart {
    fn init(&mut self, scope: &mut SearchScope) -> bool {
        self.num_restarts = 0;
        self.limit = self.counter(scope).saturating_add(self.cutoff.nth(0));
        self.inner.init(scope)
    }

    fn extend(&mut self, scope: &mut SearchScope) -> bool {
        if self.cutoff_reached(scope) {
            self.do_restart(scope);
            true
        } else {
            self.inner.extend(scope)
        }
    }

    fn repair(&mut self, scope: &mut SearchScope) -> bool {
        if self.cutoff_reached(scope) {
            self.do_restart(scope);
            true
        } else {
            self.inner.repair(scope)
        }
    }

    fn strategy(&self) -> Option<&dyn Strategy> {
        self.inner.strategy()
    }

    fn set_strategy(&mut self, strategy: Box<dyn Strategy>) {
        self.inner.set_strategy(strategy);
    }

    fn child_moves(&self) -> &[SearchMove] {
        std::slice::from_ref(&*self.inner)
    }

    fn set_child_moves(&mut self, mut moves: Vec<SearchMove>) {
        assert_eq!(moves.len(), 1, "a restart wrapper composes over one move");
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
