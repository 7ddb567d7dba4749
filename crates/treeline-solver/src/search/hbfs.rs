//! Hybrid best-first search.
//!
//! Alternates depth-first dives with best-first jumps: each dive runs under a
//! backtrack budget, and when the budget runs out the open right branches of
//! the abandoned path are stored in a priority queue keyed by their objective
//! bound. The next dive replays the most promising open branch. The budget
//! adapts to keep the replay overhead between two ratios.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::decision::Decision;
use crate::objective::{is_improving, ObjectivePolicy};
use crate::scope::SearchScope;
use crate::strategy::Strategy;

use super::{extend_from, rewind, Move, SearchMove};

/// A suspended right branch: the decisions to replay and the objective bound
/// of its parent node at the time it was harvested.
#[derive(Debug, Clone)]
struct OpenBranch {
    path: Vec<Decision>,
    bound: i64,
    minimization: bool,
}

impl PartialEq for OpenBranch {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenBranch {}

impl PartialOrd for OpenBranch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenBranch {
    /// Best bound first; on ties, the deeper branch.
    fn cmp(&self, other: &Self) -> Ordering {
        let by_bound = if self.minimization {
            other.bound.cmp(&self.bound)
        } else {
            self.bound.cmp(&other.bound)
        };
        by_bound.then_with(|| self.path.len().cmp(&other.path.len()))
    }
}

#[derive(Debug)]
pub struct MoveHbfs {
    strategy: Box<dyn Strategy>,
    opens: BinaryHeap<OpenBranch>,
    /// Open branch currently being replayed.
    copen: Vec<Decision>,
    /// Next decision of `copen` to replay.
    current: usize,
    policy: ObjectivePolicy,
    minimization: bool,
    /// Backtrack budget of the current dive.
    z: u64,
    /// Backtrack count at which the dive is abandoned.
    limit: u64,
    /// Budget adaptation: replay-ratio window and budget ceiling.
    a: f64,
    b: f64,
    n: u64,
    nodes_replayed: u64,
    nodes_at_extraction: u64,
    top: usize,
}

impl MoveHbfs {
    pub fn new(strategy: Box<dyn Strategy>, a: f64, b: f64, n: u64) -> Self {
        Self {
            strategy,
            opens: BinaryHeap::new(),
            copen: Vec::new(),
            current: 0,
            policy: ObjectivePolicy::Satisfaction,
            minimization: false,
            z: 1,
            limit: 1,
            a,
            b,
            n,
            nodes_replayed: 0,
            nodes_at_extraction: 0,
            top: 0,
        }
    }

    /// Harvests the open right branches of the abandoned path, then replays
    /// the best stored branch from scratch.
    fn extract_open_right_branches(&mut self, scope: &mut SearchScope) {
        self.adapt_budget(scope);

        // branches at or below the prefix shared with the replayed branch
        // were harvested when that branch was itself extracted
        let shared = self.shared_prefix_len(scope);
        let stop = self.top + shared;
        while scope.decision_path().len() > stop {
            let bound = scope.objective().current_bound();
            let best = scope.objective().best_bound();
            let open = scope
                .decision_path()
                .last()
                .is_some_and(Decision::has_next);
            if open && is_improving(self.policy, bound, best) {
                let mut branch: Vec<Decision> = scope
                    .decision_path()
                    .iter()
                    .skip(self.top)
                    .cloned()
                    .collect();
                if let Some(tail) = branch.last_mut() {
                    tail.build_next();
                }
                self.opens.push(OpenBranch {
                    path: branch,
                    bound,
                    minimization: self.minimization,
                });
            }
            scope.decision_path_mut().remove_last();
            scope.env().world_pop();
        }

        let best = scope.objective().best_bound();
        self.copen.clear();
        self.current = 0;
        while let Some(open) = self.opens.pop() {
            // entries queued before the incumbent tightened may be stale
            if is_improving(self.policy, open.bound, best) {
                self.copen = open.path;
                break;
            }
        }
        if !self.copen.is_empty() {
            self.nodes_replayed = 0;
            self.nodes_at_extraction = scope.measures().nodes();
            scope.restart();
        }
    }

    /// Doubles the dive budget when replaying dominates the work, halves it
    /// when replaying is negligible.
    fn adapt_budget(&mut self, scope: &SearchScope) {
        let expended = scope
            .measures()
            .nodes()
            .saturating_sub(self.nodes_at_extraction)
            .max(1);
        let ratio = self.nodes_replayed as f64 / expended as f64;
        if ratio > self.b && self.z <= self.n / 2 {
            self.z *= 2;
        } else if ratio < self.a && self.z >= 2 {
            self.z /= 2;
        }
        self.limit = scope.measures().backtracks().saturating_add(self.z);
    }

    /// Length of the prefix the current path shares with the branch being
    /// replayed, capped at what has actually been replayed.
    fn shared_prefix_len(&self, scope: &SearchScope) -> usize {
        let path_len = scope.decision_path().len().saturating_sub(self.top);
        let max = path_len.min(self.current).min(self.copen.len());
        let mut i = 0;
        while i < max {
            let matches = scope
                .decision_path()
                .get(self.top + i)
                .is_some_and(|d| d.is_equivalent_to(&self.copen[i]));
            if !matches {
                break;
            }
            i += 1;
        }
        i
    }
}

impl Move for MoveHbfs {
    fn init(&mut self, scope: &mut SearchScope) -> bool {
        self.policy = scope.objective().policy();
        assert!(
            self.policy != ObjectivePolicy::Satisfaction,
            "hybrid best-first search requires an optimization objective"
        );
        self.minimization = self.policy == ObjectivePolicy::Minimize;
        self.top = scope.decision_path().len();
        self.limit = self.z;
        self.strategy.init()
    }

    fn extend(&mut self, scope: &mut SearchScope) -> bool {
        if self.current < self.copen.len() {
            let decision = self.copen[self.current].clone();
            self.current += 1;
            self.nodes_replayed += 1;
            scope.push_decision(decision);
            true
        } else {
            extend_from(self.strategy.as_mut(), scope)
        }
    }

    fn repair(&mut self, scope: &mut SearchScope) -> bool {
        scope.measures_mut().inc_backtracks();
        scope.env().world_pop();
        let mut repaired = if scope.measures().backtracks() < self.limit {
            rewind(scope, self.top, &mut || true)
        } else {
            false
        };
        if !repaired {
            self.extract_open_right_branches(scope);
            repaired = self.current < self.copen.len();
        }
        repaired
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
            "hybrid best-first search composes over no move"
        );
    }

    fn top_decision_position(&self) -> usize {
        self.top
    }

    fn set_top_decision_position(&mut self, position: usize) {
        self.top = position;
    }
}
