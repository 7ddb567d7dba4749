//! Neighborhood collaborator for large-neighborhood search.

use std::fmt::Debug;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::decision::VarId;

/// The subset of variables an LNS neighbor freezes for the next restart,
/// with the values (from a recorded solution) to freeze them to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    freezes: Vec<(VarId, i64)>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn freeze(&mut self, variable: VarId, value: i64) {
        self.freezes.push((variable, value));
    }

    pub fn len(&self) -> usize {
        self.freezes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freezes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, i64)> + '_ {
        self.freezes.iter().copied()
    }
}

/// Produces fragments around recorded solutions.
///
/// Implementations own their access to the model (to snapshot solutions) and
/// their relaxation schedule. `is_search_complete` returning true promotes a
/// local exhaustion into a global one: the fragment space has been fully
/// relaxed and plain search finished it.
pub trait Neighbor: Debug {
    /// One-time setup before the search starts.
    fn init(&mut self) {}

    /// Chooses the fragment to freeze on the next restart.
    fn fix_some_variables(&mut self) -> Fragment;

    /// A new solution was validated; snapshot it.
    fn record_solution(&mut self);

    /// True once the neighbor cannot restrict the search anymore.
    fn is_search_complete(&self) -> bool {
        false
    }

    /// Relax the neighborhood (called when a restart fires without an
    /// improving solution).
    fn restrict_less(&mut self) {}

    /// Reseeds any internal randomness for reproducible runs. Deterministic
    /// neighbors ignore it.
    fn reseed(&mut self, _seed: u64) {}

    /// Seeds the neighbor with an externally supplied solution.
    fn load_from_solution(&mut self, values: &[i64]);
}

/// Freezes a random, progressively shrinking subset of variables to their
/// values in the last recorded solution.
pub struct RandomNeighbor {
    /// Reads the current model value of a variable, used to snapshot
    /// solutions when one is validated.
    read: Box<dyn Fn(VarId) -> i64>,
    values: Vec<i64>,
    rng: StdRng,
    n_vars: usize,
    n_frozen: usize,
    has_solution: bool,
}

impl Debug for RandomNeighbor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomNeighbor")
            .field("n_vars", &self.n_vars)
            .field("n_frozen", &self.n_frozen)
            .field("has_solution", &self.has_solution)
            .finish()
    }
}

impl RandomNeighbor {
    pub fn new(n_vars: usize, read: Box<dyn Fn(VarId) -> i64>, seed: u64) -> Self {
        Self {
            read,
            values: vec![0; n_vars],
            rng: StdRng::seed_from_u64(seed),
            n_vars,
            n_frozen: initial_frozen(n_vars),
            has_solution: false,
        }
    }
}

fn initial_frozen(n_vars: usize) -> usize {
    n_vars * 2 / 3
}

impl Neighbor for RandomNeighbor {
    fn fix_some_variables(&mut self) -> Fragment {
        let mut fragment = Fragment::new();
        if !self.has_solution || self.n_frozen == 0 {
            return fragment;
        }
        for v in rand::seq::index::sample(&mut self.rng, self.n_vars, self.n_frozen) {
            fragment.freeze(v, self.values[v]);
        }
        fragment
    }

    fn record_solution(&mut self) {
        for (v, slot) in self.values.iter_mut().enumerate() {
            *slot = (self.read)(v);
        }
        self.has_solution = true;
        // a better solution re-opens the neighborhood
        self.n_frozen = initial_frozen(self.n_vars);
    }

    fn is_search_complete(&self) -> bool {
        self.n_frozen == 0
    }

    fn restrict_less(&mut self) {
        self.n_frozen = self.n_frozen * 2 / 3;
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn load_from_solution(&mut self, values: &[i64]) {
        assert_eq!(
            values.len(),
            self.n_vars,
            "solution arity does not match the neighborhood"
        );
        self.values.copy_from_slice(values);
        self.has_solution = true;
        self.n_frozen = initial_frozen(self.n_vars);
    }
}
