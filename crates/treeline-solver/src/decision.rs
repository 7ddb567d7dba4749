//! Decisions and the decision path.
//!
//! A [`Decision`] is a choice point: "variable `v` takes value `x`, else
//! refute". The [`DecisionPath`] is the live, index-addressed history of
//! decisions currently applied; duplicating a decision is a value copy and
//! "previous" is an index, so there are no ownership cycles between records.

use treeline_core::Env;

/// Identifies a decision variable in the external model.
pub type VarId = usize;

/// A binary (or unary) choice point.
///
/// The branch counter `tries` records how many alternatives have been
/// committed so far: 0 for a freshly produced decision, 1 after the first
/// branch (the assignment), 2 after the refutation. The counter is plain,
/// non-reversible state on purpose: surviving backtracking is exactly what
/// makes `has_next` meaningful during repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    variable: VarId,
    value: i64,
    arity: u32,
    tries: u32,
    position: usize,
    world: usize,
}

impl Decision {
    /// A binary decision: try `variable = value`, else refute.
    pub fn binary(variable: VarId, value: i64) -> Self {
        Self {
            variable,
            value,
            arity: 2,
            tries: 0,
            position: 0,
            world: 0,
        }
    }

    /// A unary, non-refutable decision.
    pub fn unary(variable: VarId, value: i64) -> Self {
        Self {
            variable,
            value,
            arity: 1,
            tries: 0,
            position: 0,
            world: 0,
        }
    }

    pub fn variable(&self) -> VarId {
        self.variable
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// 1 for unary decisions, 2 for binary ones.
    pub fn arity(&self) -> u32 {
        self.arity
    }

    /// Index of this decision in the path at the time it was pushed.
    pub fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Trail world guarding this decision's effects.
    pub fn world(&self) -> usize {
        self.world
    }

    pub(crate) fn set_world(&mut self, world: usize) {
        self.world = world;
    }

    /// Is another branch available?
    pub fn has_next(&self) -> bool {
        self.tries < self.arity
    }

    /// Commits to the next branch.
    ///
    /// # Panics
    ///
    /// Panics when the decision is already exhausted.
    pub fn build_next(&mut self) {
        assert!(self.has_next(), "decision {self:?} is exhausted");
        self.tries += 1;
    }

    /// Resets the branch counter, as if freshly produced.
    pub fn rewind(&mut self) {
        self.tries = 0;
    }

    /// True once the committed branch is the refutation.
    pub fn is_refutation(&self) -> bool {
        self.tries > 1
    }

    /// Branch-state equivalence, used to recognize a replayed path prefix.
    /// Position and world are bookkeeping and deliberately ignored.
    pub(crate) fn is_equivalent_to(&self, other: &Decision) -> bool {
        self.variable == other.variable && self.value == other.value && self.tries == other.tries
    }
}

/// The ordered, index-addressed history of applied decisions.
///
/// Append-only until backtracking removes records from the end;
/// [`synchronize`](DecisionPath::synchronize) realigns the path with the
/// trail after a multi-world unwind such as a restart.
#[derive(Debug, Default)]
pub struct DecisionPath {
    decisions: Vec<Decision>,
}

impl DecisionPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// The most recent live decision.
    pub fn last(&self) -> Option<&Decision> {
        self.decisions.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Decision> {
        self.decisions.last_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Decision> {
        self.decisions.get(index)
    }

    /// Appends a decision record. Callers go through
    /// [`SearchScope::push_decision`](crate::scope::SearchScope::push_decision),
    /// which stamps position and world first.
    pub(crate) fn push(&mut self, decision: Decision) {
        self.decisions.push(decision);
    }

    /// Discards and returns the most recent decision.
    pub fn remove_last(&mut self) -> Option<Decision> {
        self.decisions.pop()
    }

    /// Truncates the path to the decisions whose guarding world is still
    /// open on the trail.
    pub fn synchronize(&mut self, env: &Env) {
        let world = env.world_index();
        while self.decisions.last().is_some_and(|d| d.world() > world) {
            self.decisions.pop();
        }
    }

    /// Iterates the path from the root outwards.
    pub fn iter(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.iter()
    }
}
