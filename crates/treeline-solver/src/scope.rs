//! Shared search context.

use treeline_core::Env;

use crate::decision::{Decision, DecisionPath};
use crate::measures::Measures;
use crate::neighbor::Fragment;
use crate::objective::BoundManager;

/// Everything a move needs to act on the search: the trailed environment,
/// the decision path, the measures, the objective layer and the pending
/// LNS fragment.
///
/// The two recorded worlds delimit the fixed part of the tree:
/// `root_world` is the state before the initial propagation, `search_world`
/// the state just after it. A [`restart`](SearchScope::restart) rewinds to
/// `search_world`, never further.
pub struct SearchScope {
    env: Env,
    path: DecisionPath,
    measures: Measures,
    objective: Box<dyn BoundManager>,
    fragment: Option<Fragment>,
    root_world: usize,
    search_world: usize,
}

impl SearchScope {
    pub fn new(env: Env, objective: Box<dyn BoundManager>) -> Self {
        Self {
            env,
            path: DecisionPath::new(),
            measures: Measures::new(),
            objective,
            fragment: None,
            root_world: 0,
            search_world: 0,
        }
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn decision_path(&self) -> &DecisionPath {
        &self.path
    }

    pub fn decision_path_mut(&mut self) -> &mut DecisionPath {
        &mut self.path
    }

    pub fn measures(&self) -> &Measures {
        &self.measures
    }

    pub(crate) fn measures_mut(&mut self) -> &mut Measures {
        &mut self.measures
    }

    pub fn objective(&self) -> &dyn BoundManager {
        self.objective.as_ref()
    }

    pub(crate) fn objective_mut(&mut self) -> &mut dyn BoundManager {
        self.objective.as_mut()
    }

    /// World index of the state before the initial propagation.
    pub fn root_world(&self) -> usize {
        self.root_world
    }

    /// World index restarts rewind to.
    pub fn search_world(&self) -> usize {
        self.search_world
    }

    pub(crate) fn set_root_world(&mut self, world: usize) {
        self.root_world = world;
    }

    pub(crate) fn set_search_world(&mut self, world: usize) {
        self.search_world = world;
    }

    /// Appends `decision` to the path, opening a new world for its branch.
    pub fn push_decision(&mut self, mut decision: Decision) {
        decision.set_position(self.path.len());
        self.env.world_push();
        decision.set_world(self.env.world_index());
        self.path.push(decision);
    }

    /// Stages a fragment for the next propagation to consume.
    pub fn set_fragment(&mut self, fragment: Fragment) {
        self.fragment = Some(fragment);
    }

    /// Takes the pending fragment, if any. Consumed at most once.
    pub fn take_fragment(&mut self) -> Option<Fragment> {
        self.fragment.take()
    }

    /// Rewinds to the search world, drops the now-dangling decisions and
    /// opens a fresh world for the next dive.
    pub fn restart(&mut self) {
        tracing::debug!(
            restarts = self.measures.restarts() + 1,
            depth = self.path.len(),
            "restarting search"
        );
        self.env.world_pop_until(self.search_world);
        self.path.synchronize(&self.env);
        self.env.world_push();
        self.measures.inc_restarts();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::Satisfaction;

    fn scope() -> SearchScope {
        SearchScope::new(Env::new(), Box::new(Satisfaction))
    }

    #[test]
    fn push_decision_opens_a_world() {
        let mut s = scope();
        let before = s.env().world_index();
        s.push_decision(Decision::binary(0, 1));
        assert_eq!(s.env().world_index(), before + 1);
        let d = s.decision_path().last().unwrap();
        assert_eq!(d.position(), 0);
        assert_eq!(d.world(), before + 1);
    }

    #[test]
    fn restart_rewinds_to_search_world() {
        let mut s = scope();
        s.env().world_push();
        let search_world = s.env().world_index();
        s.set_search_world(search_world);
        s.env().world_push();
        s.push_decision(Decision::binary(0, 1));
        s.push_decision(Decision::binary(1, 0));

        s.restart();
        assert_eq!(s.env().world_index(), search_world + 1);
        assert!(s.decision_path().is_empty());
        assert_eq!(s.measures().restarts(), 1);
    }

    #[test]
    fn fragment_is_consumed_once() {
        let mut s = scope();
        let mut f = Fragment::new();
        f.freeze(3, 7);
        s.set_fragment(f);
        assert!(s.take_fragment().is_some());
        assert!(s.take_fragment().is_none());
    }
}
