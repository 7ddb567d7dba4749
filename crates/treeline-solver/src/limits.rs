//! Search limits.
//!
//! Limits are checked once per loop iteration against the [`Measures`]; any
//! met limit stops the search with [`SearchState::LimitReached`].
//!
//! [`SearchState::LimitReached`]: crate::measures::SearchState::LimitReached

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::measures::Measures;

/// A stopping criterion evaluated against the live measures.
pub trait Limit: Debug {
    fn is_met(&self, measures: &Measures) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct NodeLimit(pub u64);

impl Limit for NodeLimit {
    fn is_met(&self, measures: &Measures) -> bool {
        measures.nodes() >= self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FailLimit(pub u64);

impl Limit for FailLimit {
    fn is_met(&self, measures: &Measures) -> bool {
        measures.fails() >= self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimeLimit(pub Duration);

impl Limit for TimeLimit {
    fn is_met(&self, measures: &Measures) -> bool {
        measures.time_count() >= self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SolutionLimit(pub u64);

impl Limit for SolutionLimit {
    fn is_met(&self, measures: &Measures) -> bool {
        measures.solutions() >= self.0
    }
}

/// A flag another thread can raise to stop the search.
#[derive(Debug, Clone)]
pub struct ExternalLimit(Arc<AtomicBool>);

impl ExternalLimit {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Handle to hand out to the controlling thread.
    pub fn trigger(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

impl Default for ExternalLimit {
    fn default() -> Self {
        Self::new()
    }
}

impl Limit for ExternalLimit {
    fn is_met(&self, _measures: &Measures) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
