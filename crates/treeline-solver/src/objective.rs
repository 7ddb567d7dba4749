//! Objective-bound collaborator.
//!
//! The search core never computes bounds itself; it asks the model layer
//! through [`BoundManager`]. Hybrid best-first search ranks and prunes open
//! branches with these answers, and the loop notifies the manager whenever a
//! solution is validated so it can tighten the incumbent.

use std::fmt::Debug;

/// Optimization policy of the problem being solved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObjectivePolicy {
    /// No objective: any solution is as good as any other.
    #[default]
    Satisfaction,
    Minimize,
    Maximize,
}

/// Bound queries answered by the model/objective layer.
pub trait BoundManager: Debug {
    fn policy(&self) -> ObjectivePolicy;

    /// Bound of the best solution found so far.
    fn best_bound(&self) -> i64;

    /// Bound of the sub-tree rooted at the current node, under the current
    /// propagation state.
    fn current_bound(&self) -> i64;

    /// A solution was just validated; tighten the incumbent.
    fn on_solution(&mut self) {}
}

/// Returns true if `bound` can still improve on `best` under `policy`.
/// Always false for satisfaction problems.
pub fn is_improving(policy: ObjectivePolicy, bound: i64, best: i64) -> bool {
    match policy {
        ObjectivePolicy::Satisfaction => false,
        ObjectivePolicy::Minimize => bound < best,
        ObjectivePolicy::Maximize => bound > best,
    }
}

/// Default manager for satisfaction problems.
#[derive(Debug, Clone, Copy, Default)]
pub struct Satisfaction;

impl BoundManager for Satisfaction {
    fn policy(&self) -> ObjectivePolicy {
        ObjectivePolicy::Satisfaction
    }

    fn best_bound(&self) -> i64 {
        0
    }

    fn current_bound(&self) -> i64 {
        0
    }
}
