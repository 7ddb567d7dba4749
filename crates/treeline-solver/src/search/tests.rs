use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use treeline_core::Env;

use crate::cutoff::Cutoff;
use crate::decision::Decision;
use crate::driver::{Feasibility, SearchLoop};
use crate::limits::NodeLimit;
use crate::measures::SearchState;
use crate::neighbor::{Fragment, Neighbor};
use crate::objective::Satisfaction;
use crate::scope::SearchScope;
use crate::strategy::Strategy;
use crate::test_utils::{CountOnes, ToyModel, ToyPropagate, ToyStrategy};

use super::*;

fn satisfaction_scope(env: &Env) -> SearchScope {
    SearchScope::new(env.clone(), Box::new(Satisfaction))
}

/// Collects a snapshot of the model at every validated solution.
fn collect_solutions(search: &mut SearchLoop, model: &ToyModel) -> Rc<RefCell<Vec<Vec<i32>>>> {
    let solutions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&solutions);
    let model = model.clone();
    search.set_solution_callback(Box::new(move |_| {
        sink.borrow_mut().push(model.snapshot());
    }));
    solutions
}

fn distinct(solutions: &Rc<RefCell<Vec<Vec<i32>>>>) -> BTreeSet<Vec<i32>> {
    solutions.borrow().iter().cloned().collect()
}

#[test]
fn dfs_enumerates_every_assignment() {
    let env = Env::new();
    let model = ToyModel::new(&env, 3);
    let moves = SearchMove::Dfs(MoveDfs::new(Box::new(ToyStrategy::new(model.clone()))));
    let mut search = SearchLoop::new(
        satisfaction_scope(&env),
        moves,
        Box::new(ToyPropagate::accept_all(model.clone())),
    );
    let solutions = collect_solutions(&mut search, &model);

    let report = search.solve();
    assert_eq!(report.feasibility, Feasibility::True);
    assert!(report.complete());
    assert_eq!(report.measures.solutions(), 8);
    assert_eq!(distinct(&solutions).len(), 8);
}

#[test]
fn dfs_first_solution_stops_early() {
    let env = Env::new();
    let model = ToyModel::new(&env, 3);
    let moves = SearchMove::Dfs(MoveDfs::new(Box::new(ToyStrategy::new(model.clone()))));
    let mut search = SearchLoop::new(
        satisfaction_scope(&env),
        moves,
        Box::new(ToyPropagate::accept_all(model.clone())),
    );

    let report = search.solve_first();
    assert_eq!(report.feasibility, Feasibility::True);
    assert_eq!(report.state, SearchState::Stopped);
    assert_eq!(report.measures.solutions(), 1);
    // the strategy tries 0 first at every level
    assert_eq!(model.snapshot(), vec![0, 0, 0]);
}

#[test]
fn root_contradiction_is_infeasible() {
    let env = Env::new();
    let model = ToyModel::new(&env, 2);
    let moves = SearchMove::Dfs(MoveDfs::new(Box::new(ToyStrategy::new(model.clone()))));
    let mut search = SearchLoop::new(
        satisfaction_scope(&env),
        moves,
        Box::new(ToyPropagate::new(model, Rc::new(|_| true))),
    );

    let report = search.solve();
    assert_eq!(report.feasibility, Feasibility::False);
    assert!(report.complete());
    assert_eq!(report.measures.solutions(), 0);
}

#[test]
fn node_limit_cuts_the_search_short() {
    let env = Env::new();
    let model = ToyModel::new(&env, 8);
    let moves = SearchMove::Dfs(MoveDfs::new(Box::new(ToyStrategy::new(model.clone()))));
    let mut search = SearchLoop::new(
        satisfaction_scope(&env),
        moves,
        Box::new(ToyPropagate::accept_all(model)),
    );
    search.add_limit(Box::new(NodeLimit(4)));

    let report = search.solve();
    assert_eq!(report.state, SearchState::LimitReached);
    assert_eq!(report.feasibility, Feasibility::Undefined);
    assert_eq!(report.measures.solutions(), 0);
}

#[test]
fn lds_visits_only_low_discrepancy_leaves() {
    let env = Env::new();
    let model = ToyModel::new(&env, 4);
    let moves = SearchMove::Lds(MoveLds::new(
        &env,
        Box::new(ToyStrategy::new(model.clone())),
        1,
    ));
    let mut search = SearchLoop::new(
        satisfaction_scope(&env),
        moves,
        Box::new(ToyPropagate::accept_all(model.clone())),
    );
    let solutions = collect_solutions(&mut search, &model);

    let report = search.solve();
    assert!(report.complete());
    let leaves = distinct(&solutions);
    // a 1 is a refutation of the 0-first strategy, i.e. a discrepancy
    for leaf in &leaves {
        assert!(leaf.iter().filter(|&&v| v == 1).count() <= 1, "leaf {leaf:?}");
    }
    // every branch with at most one discrepancy: C(4,0) + C(4,1)
    assert_eq!(leaves.len(), 5);
}

#[test]
fn lds_with_full_budget_is_complete() {
    let env = Env::new();
    let model = ToyModel::new(&env, 3);
    let moves = SearchMove::Lds(MoveLds::new(
        &env,
        Box::new(ToyStrategy::new(model.clone())),
        3,
    ));
    let mut search = SearchLoop::new(
        satisfaction_scope(&env),
        moves,
        Box::new(ToyPropagate::accept_all(model.clone())),
    );
    let solutions = collect_solutions(&mut search, &model);

    let report = search.solve();
    assert!(report.complete());
    assert_eq!(distinct(&solutions).len(), 8);
    // one restart per widening wave
    assert_eq!(report.measures.restarts(), 3);
}

#[test]
fn dds_spends_discrepancies_near_the_root() {
    let env = Env::new();
    let model = ToyModel::new(&env, 3);
    let moves = SearchMove::Dds(MoveDds::new(
        &env,
        Box::new(ToyStrategy::new(model.clone())),
        1,
    ));
    let mut search = SearchLoop::new(
        satisfaction_scope(&env),
        moves,
        Box::new(ToyPropagate::accept_all(model.clone())),
    );
    let solutions = collect_solutions(&mut search, &model);

    let report = search.solve();
    assert!(report.complete());
    let leaves = distinct(&solutions);
    // wave 0 dives leftmost, wave 1 commits every refutation directly
    assert!(leaves.contains(&vec![0, 0, 0]));
    assert!(leaves.contains(&vec![1, 1, 1]));
    assert_eq!(leaves.len(), 2);
}

/// Branches on the first unassigned variable in `[lo, hi)` only.
#[derive(Debug, Clone)]
struct RangeStrategy {
    model: ToyModel,
    lo: usize,
    hi: usize,
}

impl Strategy for RangeStrategy {
    fn next_decision(&mut self) -> Option<Decision> {
        (self.lo..self.hi)
            .find(|&v| self.model.value(v) < 0)
            .map(|v| Decision::binary(v, 0))
    }
}

#[test]
fn seq_hands_over_and_backtracks_across_the_boundary() {
    let env = Env::new();
    let model = ToyModel::new(&env, 4);
    let first = SearchMove::Dfs(MoveDfs::new(Box::new(RangeStrategy {
        model: model.clone(),
        lo: 0,
        hi: 2,
    })));
    let second = SearchMove::Dfs(MoveDfs::new(Box::new(RangeStrategy {
        model: model.clone(),
        lo: 2,
        hi: 4,
    })));
    let moves = SearchMove::Seq(MoveSeq::new(&env, vec![first, second]));
    let mut search = SearchLoop::new(
        satisfaction_scope(&env),
        moves,
        Box::new(ToyPropagate::accept_all(model.clone())),
    );
    let solutions = collect_solutions(&mut search, &model);

    let report = search.solve();
    assert!(report.complete());
    // exhaustive despite the handover: repairs crossed the segment boundary
    assert_eq!(distinct(&solutions).len(), 16);
    // the second segment was fenced at the handover frontier
    assert_eq!(search.moves().child_moves()[1].top_decision_position(), 2);
}

#[test]
fn restart_wrapper_honors_cutoff_and_cap() {
    let env = Env::new();
    let model = ToyModel::new(&env, 2);
    let inner = SearchMove::Dfs(MoveDfs::new(Box::new(ToyStrategy::new(model.clone()))));
    let moves = SearchMove::Restart(MoveRestart::new(
        inner,
        Cutoff::Constant { scale: 1 },
        RestartOn::Fails,
        3,
    ));
    // [0, 0] is the only inconsistent assignment, met first on every dive
    let forbidden: Rc<dyn Fn(&[i32]) -> bool> = Rc::new(|s| s.iter().all(|&v| v == 0));
    let mut search = SearchLoop::new(
        satisfaction_scope(&env),
        moves,
        Box::new(ToyPropagate::new(model.clone(), forbidden)),
    );
    let solutions = collect_solutions(&mut search, &model);

    let report = search.solve();
    assert!(report.complete());
    assert_eq!(report.measures.restarts(), 3);
    let leaves = distinct(&solutions);
    assert_eq!(leaves.len(), 3);
    assert!(!leaves.contains(&vec![0, 0]));
}

#[derive(Debug)]
struct MockNeighbor {
    records: Rc<Cell<u32>>,
    relaxes: Rc<Cell<u32>>,
    budget: u32,
}

impl MockNeighbor {
    fn new(budget: u32) -> Self {
        Self {
            records: Rc::new(Cell::new(0)),
            relaxes: Rc::new(Cell::new(0)),
            budget,
        }
    }
}

impl Neighbor for MockNeighbor {
    fn fix_some_variables(&mut self) -> Fragment {
        Fragment::new()
    }

    fn record_solution(&mut self) {
        self.records.set(self.records.get() + 1);
    }

    fn is_search_complete(&self) -> bool {
        self.relaxes.get() >= self.budget
    }

    fn restrict_less(&mut self) {
        self.relaxes.set(self.relaxes.get() + 1);
    }

    fn load_from_solution(&mut self, _values: &[i64]) {}
}

/// Rejects complete assignments that do not improve on the best bound, the
/// way an objective cut would.
fn improvement_cut(best: Rc<RefCell<i64>>) -> Rc<dyn Fn(&[i32]) -> bool> {
    Rc::new(move |s| {
        let complete = s.iter().all(|&v| v >= 0);
        let ones = s.iter().filter(|&&v| v == 1).count() as i64;
        complete && ones >= *best.borrow()
    })
}

#[test]
fn lns_relaxes_until_the_neighbor_gives_up() {
    let env = Env::new();
    let model = ToyModel::new(&env, 3);
    let objective = CountOnes::new(model.clone());
    let best = objective.best_handle();
    let neighbor = MockNeighbor::new(3);
    let records = Rc::clone(&neighbor.records);
    let relaxes = Rc::clone(&neighbor.relaxes);

    let inner = SearchMove::Dfs(MoveDfs::new(Box::new(ToyStrategy::new(model.clone()))));
    let moves = SearchMove::Lns(MoveLns::new(inner, Box::new(neighbor), None));
    let mut search = SearchLoop::new(
        SearchScope::new(env.clone(), Box::new(objective)),
        moves,
        Box::new(ToyPropagate::new(model, improvement_cut(Rc::clone(&best)))),
    );

    let report = search.solve();
    // [0, 0, 0] is optimal and found on the first dive; every later dive
    // fails the cut until the neighbor reports completion
    assert_eq!(report.feasibility, Feasibility::True);
    assert!(report.complete());
    assert_eq!(*best.borrow(), 0);
    assert_eq!(records.get(), 1);
    assert_eq!(relaxes.get(), 3);
}

#[test]
fn lns_loaded_solution_skips_the_first_relaxation() {
    let env = Env::new();
    let model = ToyModel::new(&env, 3);
    let objective = CountOnes::new(model.clone());
    let best = objective.best_handle();
    // pretend an optimal solution is already known
    *best.borrow_mut() = 0;
    let neighbor = MockNeighbor::new(2);
    let records = Rc::clone(&neighbor.records);
    let relaxes = Rc::clone(&neighbor.relaxes);

    let inner = SearchMove::Dfs(MoveDfs::new(Box::new(ToyStrategy::new(model.clone()))));
    let moves = SearchMove::Lns(MoveLns::new(inner, Box::new(neighbor), None));
    let mut search = SearchLoop::new(
        SearchScope::new(env.clone(), Box::new(objective)),
        moves,
        Box::new(ToyPropagate::new(model, improvement_cut(Rc::clone(&best)))),
    );
    assert!(search.load_solution(&[0, 0, 0]));

    let report = search.solve();
    assert_eq!(report.feasibility, Feasibility::False);
    assert!(report.complete());
    assert_eq!(records.get(), 0);
    assert_eq!(relaxes.get(), 2);
    // the first restart reuses the loaded neighborhood without relaxing
    assert_eq!(report.measures.restarts(), 3);
}

#[test]
fn hbfs_finds_the_optimum_through_open_branches() {
    let env = Env::new();
    let model = ToyModel::new(&env, 4);
    let objective = CountOnes::new(model.clone());
    let best = objective.best_handle();
    // reject the all-zero optimum so improving solutions need a refutation
    let cut = {
        let best = Rc::clone(&best);
        Rc::new(move |s: &[i32]| {
            let complete = s.iter().all(|&v| v >= 0);
            let ones = s.iter().filter(|&&v| v == 1).count() as i64;
            complete && (ones == 0 || ones >= *best.borrow())
        }) as Rc<dyn Fn(&[i32]) -> bool>
    };

    let moves = SearchMove::Hbfs(MoveHbfs::new(
        Box::new(ToyStrategy::new(model.clone())),
        0.05,
        0.1,
        32,
    ));
    let mut search = SearchLoop::new(
        SearchScope::new(env.clone(), Box::new(objective)),
        moves,
        Box::new(ToyPropagate::new(model, cut)),
    );

    let report = search.solve();
    assert_eq!(report.feasibility, Feasibility::True);
    assert!(report.complete());
    assert_eq!(*best.borrow(), 1);
    assert!(report.measures.restarts() >= 1);
}

#[test]
#[should_panic(expected = "requires an optimization objective")]
fn hbfs_rejects_satisfaction_problems() {
    let env = Env::new();
    let model = ToyModel::new(&env, 2);
    let moves = SearchMove::Hbfs(MoveHbfs::new(
        Box::new(ToyStrategy::new(model.clone())),
        0.05,
        0.1,
        32,
    ));
    let mut search = SearchLoop::new(
        satisfaction_scope(&env),
        moves,
        Box::new(ToyPropagate::accept_all(model)),
    );
    search.solve();
}

#[test]
fn builder_runs_a_configured_lds() {
    use crate::builder::SearchBuilder;
    use treeline_config::SearchConfig;

    let env = Env::new();
    let model = ToyModel::new(&env, 3);
    let config = SearchConfig::from_toml_str(
        r#"
        [search]
        type = "lds"
        discrepancy = 1
        "#,
    )
    .unwrap();
    let mut search = SearchBuilder::new(env.clone(), config)
        .strategy(Box::new(ToyStrategy::new(model.clone())))
        .build(Box::new(ToyPropagate::accept_all(model.clone())))
        .unwrap();
    let solutions = collect_solutions(&mut search, &model);

    let report = search.solve();
    assert!(report.complete());
    assert_eq!(distinct(&solutions).len(), 4);
}
