//! Resolution measures.

use std::time::{Duration, Instant};

/// Terminal (or current) state of a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchState {
    /// Search has not started yet.
    #[default]
    New,
    /// The loop is running.
    Running,
    /// The tree was proven fully explored.
    Exhausted,
    /// An external limit stopped the search.
    LimitReached,
    /// The caller asked to stop (first solution, early termination).
    Stopped,
}

/// Counters maintained by the search loop and read by moves and limits.
///
/// Counters are plain monotone state: they record work done and must *not*
/// roll back with the trail.
#[derive(Debug, Clone, Default)]
pub struct Measures {
    nodes: u64,
    fails: u64,
    backtracks: u64,
    restarts: u64,
    solutions: u64,
    state: SearchState,
    started: Option<Instant>,
    elapsed: Option<Duration>,
}

impl Measures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opened nodes, i.e. successful `extend` calls plus validated leaves.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Propagation contradictions encountered.
    pub fn fails(&self) -> u64 {
        self.fails
    }

    /// Repair steps taken.
    pub fn backtracks(&self) -> u64 {
        self.backtracks
    }

    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn solutions(&self) -> u64 {
        self.solutions
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Wall-clock time since the search started; frozen once it stops.
    pub fn time_count(&self) -> Duration {
        match (self.elapsed, self.started) {
            (Some(done), _) => done,
            (None, Some(start)) => start.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    pub(crate) fn start(&mut self) {
        self.started = Some(Instant::now());
        self.elapsed = None;
        self.state = SearchState::Running;
    }

    pub(crate) fn stop(&mut self, state: SearchState) {
        self.elapsed = Some(self.time_count());
        self.state = state;
    }

    pub(crate) fn inc_nodes(&mut self) {
        self.nodes += 1;
    }

    pub(crate) fn inc_fails(&mut self) {
        self.fails += 1;
    }

    pub(crate) fn inc_backtracks(&mut self) {
        self.backtracks += 1;
    }

    pub(crate) fn inc_restarts(&mut self) {
        self.restarts += 1;
    }

    pub(crate) fn inc_solutions(&mut self) {
        self.solutions += 1;
    }
}
