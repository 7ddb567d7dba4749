//! Shared fixtures: a toy binary CSP exercising the whole loop.
//!
//! The model is `n` binary variables stored as reversible ints, `-1` meaning
//! unassigned. The propagation engine applies the pending fragment and the
//! last decision's branch, then rejects the node when a caller-supplied
//! predicate flags the partial assignment.

use std::cell::RefCell;
use std::rc::Rc;

use treeline_core::{Env, ReversibleInt};

use crate::decision::{Decision, VarId};
use crate::objective::{BoundManager, ObjectivePolicy};
use crate::propagate::{Contradiction, Propagate};
use crate::scope::SearchScope;
use crate::strategy::Strategy;

#[derive(Debug, Clone)]
pub(crate) struct ToyModel {
    vars: Rc<Vec<ReversibleInt>>,
}

impl ToyModel {
    pub(crate) fn new(env: &Env, n: usize) -> Self {
        Self {
            vars: Rc::new((0..n).map(|_| env.make_int(-1)).collect()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.vars.len()
    }

    pub(crate) fn value(&self, v: VarId) -> i32 {
        self.vars[v].get()
    }

    pub(crate) fn assign(&self, v: VarId, value: i32) {
        self.vars[v].set(value);
    }

    /// Current values, `-1` for unassigned.
    pub(crate) fn snapshot(&self) -> Vec<i32> {
        self.vars.iter().map(ReversibleInt::get).collect()
    }
}

/// Branches on the first unassigned variable, trying 0 first.
#[derive(Debug, Clone)]
pub(crate) struct ToyStrategy {
    model: ToyModel,
}

impl ToyStrategy {
    pub(crate) fn new(model: ToyModel) -> Self {
        Self { model }
    }
}

impl Strategy for ToyStrategy {
    fn next_decision(&mut self) -> Option<Decision> {
        (0..self.model.len())
            .find(|&v| self.model.value(v) < 0)
            .map(|v| Decision::binary(v, 0))
    }
}

/// Applies fragments and decision branches, then checks a predicate over the
/// partial assignment.
pub(crate) struct ToyPropagate {
    model: ToyModel,
    forbidden: Rc<dyn Fn(&[i32]) -> bool>,
}

impl ToyPropagate {
    pub(crate) fn new(model: ToyModel, forbidden: Rc<dyn Fn(&[i32]) -> bool>) -> Self {
        Self { model, forbidden }
    }

    pub(crate) fn accept_all(model: ToyModel) -> Self {
        Self::new(model, Rc::new(|_| false))
    }

    fn assign_checked(&self, v: VarId, value: i32) -> Result<(), Contradiction> {
        let current = self.model.value(v);
        if current >= 0 && current != value {
            return Err(Contradiction);
        }
        self.model.assign(v, value);
        Ok(())
    }
}

impl Propagate for ToyPropagate {
    fn execute(&mut self, scope: &mut SearchScope) -> Result<(), Contradiction> {
        if let Some(fragment) = scope.take_fragment() {
            for (v, value) in fragment.iter() {
                self.assign_checked(v, value as i32)?;
            }
        }
        if let Some(d) = scope.decision_path().last() {
            let value = if d.is_refutation() {
                1 - d.value() as i32
            } else {
                d.value() as i32
            };
            self.assign_checked(d.variable(), value)?;
        }
        if (self.forbidden)(&self.model.snapshot()) {
            return Err(Contradiction);
        }
        Ok(())
    }
}

/// Minimizes the number of variables assigned 1. The count of ones among
/// assigned variables is an admissible bound: unassigned ones may still
/// become 0.
#[derive(Debug)]
pub(crate) struct CountOnes {
    model: ToyModel,
    best: Rc<RefCell<i64>>,
}

impl CountOnes {
    pub(crate) fn new(model: ToyModel) -> Self {
        Self {
            model,
            best: Rc::new(RefCell::new(i64::MAX)),
        }
    }

    pub(crate) fn best_handle(&self) -> Rc<RefCell<i64>> {
        Rc::clone(&self.best)
    }

    fn ones(&self) -> i64 {
        self.model
            .snapshot()
            .iter()
            .filter(|&&v| v == 1)
            .count() as i64
    }
}

impl BoundManager for CountOnes {
    fn policy(&self) -> ObjectivePolicy {
        ObjectivePolicy::Minimize
    }

    fn best_bound(&self) -> i64 {
        *self.best.borrow()
    }

    fn current_bound(&self) -> i64 {
        self.ones()
    }

    fn on_solution(&mut self) {
        let bound = self.ones();
        let mut best = self.best.borrow_mut();
        if bound < *best {
            *best = bound;
        }
    }
}
