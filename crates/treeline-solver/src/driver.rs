//! The search loop.
//!
//! A five-state machine drives the interplay between propagation, the move
//! in charge and the limits: propagate the current node, extend it or
//! validate it as a solution, repair on contradiction, stop when the move
//! gives up or a limit fires.

use crate::limits::Limit;
use crate::measures::{Measures, SearchState};
use crate::propagate::Propagate;
use crate::scope::SearchScope;
use crate::search::{Move, SearchMove};

/// States of the search loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Initialize,
    Propagate,
    Extend,
    Validate,
    Repair,
    Stop,
}

/// Outcome of a search on the feasibility question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feasibility {
    /// At least one solution was found.
    True,
    /// The tree was exhausted without a solution.
    False,
    /// The search stopped before settling the question.
    Undefined,
}

/// Summary handed back when the loop stops.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub feasibility: Feasibility,
    pub state: SearchState,
    pub measures: Measures,
}

impl SearchReport {
    /// True when the search proved its answer rather than being cut short.
    pub fn complete(&self) -> bool {
        self.state == SearchState::Exhausted
    }
}

/// Owns the scope, the move composition, the filtering engine and the
/// limits, and runs the loop.
pub struct SearchLoop {
    scope: SearchScope,
    moves: SearchMove,
    propagate: Box<dyn Propagate>,
    limits: Vec<Box<dyn Limit>>,
    on_solution: Option<Box<dyn FnMut(&SearchScope)>>,
}

impl SearchLoop {
    pub fn new(scope: SearchScope, moves: SearchMove, propagate: Box<dyn Propagate>) -> Self {
        Self {
            scope,
            moves,
            propagate,
            limits: Vec::new(),
            on_solution: None,
        }
    }

    pub fn add_limit(&mut self, limit: Box<dyn Limit>) {
        self.limits.push(limit);
    }

    /// Called on every validated solution, before the loop moves on.
    pub fn set_solution_callback(&mut self, callback: Box<dyn FnMut(&SearchScope)>) {
        self.on_solution = Some(callback);
    }

    pub fn scope(&self) -> &SearchScope {
        &self.scope
    }

    pub fn measures(&self) -> &Measures {
        self.scope.measures()
    }

    pub fn moves(&self) -> &SearchMove {
        &self.moves
    }

    pub fn moves_mut(&mut self) -> &mut SearchMove {
        &mut self.moves
    }

    /// Seeds a large-neighborhood move in the composition with a known
    /// solution. Returns false when no such move is present.
    pub fn load_solution(&mut self, values: &[i64]) -> bool {
        self.moves.load_from_solution(values)
    }

    /// Runs until the first solution, a limit or exhaustion.
    pub fn solve_first(&mut self) -> SearchReport {
        self.launch(true)
    }

    /// Runs until a limit fires or the tree is exhausted, enumerating every
    /// solution through the solution callback.
    pub fn solve(&mut self) -> SearchReport {
        self.launch(false)
    }

    fn launch(&mut self, stop_at_first: bool) -> SearchReport {
        let mut action = Action::Initialize;
        let mut feasibility = Feasibility::Undefined;
        loop {
            if action == Action::Stop {
                break;
            }
            if action != Action::Initialize && self.limit_met() {
                self.scope.measures_mut().stop(SearchState::LimitReached);
                break;
            }
            action = match action {
                Action::Initialize => {
                    if self.initialize() {
                        Action::Propagate
                    } else {
                        feasibility = Feasibility::False;
                        self.scope.measures_mut().stop(SearchState::Exhausted);
                        Action::Stop
                    }
                }
                Action::Propagate => match self.propagate.execute(&mut self.scope) {
                    Ok(()) => Action::Extend,
                    Err(_) => {
                        self.scope.measures_mut().inc_fails();
                        Action::Repair
                    }
                },
                Action::Extend => {
                    if self.moves.extend(&mut self.scope) {
                        self.scope.measures_mut().inc_nodes();
                        Action::Propagate
                    } else {
                        Action::Validate
                    }
                }
                Action::Validate => {
                    self.scope.measures_mut().inc_nodes();
                    self.scope.measures_mut().inc_solutions();
                    self.scope.objective_mut().on_solution();
                    tracing::debug!(
                        solutions = self.scope.measures().solutions(),
                        nodes = self.scope.measures().nodes(),
                        "solution validated"
                    );
                    if let Some(callback) = self.on_solution.as_mut() {
                        callback(&self.scope);
                    }
                    feasibility = Feasibility::True;
                    if stop_at_first {
                        self.scope.measures_mut().stop(SearchState::Stopped);
                        Action::Stop
                    } else {
                        Action::Repair
                    }
                }
                Action::Repair => {
                    if self.moves.repair(&mut self.scope) {
                        Action::Propagate
                    } else {
                        if feasibility == Feasibility::Undefined {
                            feasibility = Feasibility::False;
                        }
                        self.scope.measures_mut().stop(SearchState::Exhausted);
                        Action::Stop
                    }
                }
                Action::Stop => Action::Stop,
            };
        }
        SearchReport {
            feasibility,
            state: self.scope.measures().state(),
            measures: self.scope.measures().clone(),
        }
    }

    /// Worlds opened here, from the bottom: a backup of the input state, the
    /// initial propagation, and a buffer the deepest rewind consumes so that
    /// restarts always find the post-propagation state intact.
    fn initialize(&mut self) -> bool {
        self.scope.measures_mut().start();
        let root = self.scope.env().world_index();
        self.scope.set_root_world(root);

        self.scope.env().world_push();
        if self.propagate.execute(&mut self.scope).is_err() {
            self.scope.measures_mut().inc_fails();
            self.scope.env().world_pop();
            tracing::debug!("infeasible at the root");
            return false;
        }

        self.scope.env().world_push();
        let search_world = self.scope.env().world_index();
        self.scope.set_search_world(search_world);
        self.scope.env().world_push();

        if !self.moves.init(&mut self.scope) {
            self.scope.env().world_pop_until(root);
            return false;
        }
        true
    }

    fn limit_met(&self) -> bool {
        self.limits.iter().any(|l| l.is_met(self.scope.measures()))
    }
}
