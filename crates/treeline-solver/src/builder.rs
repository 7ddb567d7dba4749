//! Assembles a [`SearchLoop`] from a configuration.

use std::collections::VecDeque;
use std::time::Duration;

use treeline_config::{CutoffConfig, LimitsConfig, MoveConfig, SearchConfig};
use treeline_core::Env;

use crate::cutoff::Cutoff;
use crate::driver::SearchLoop;
use crate::error::SearchError;
use crate::limits::{FailLimit, Limit, NodeLimit, SolutionLimit, TimeLimit};
use crate::neighbor::Neighbor;
use crate::objective::{BoundManager, Satisfaction};
use crate::propagate::Propagate;
use crate::scope::SearchScope;
use crate::search::{MoveDds, MoveDfs, MoveHbfs, MoveLds, MoveLns, MoveSeq, MoveRestart, RestartOn, SearchMove};
use crate::strategy::Strategy;

/// Builds a ready-to-run [`SearchLoop`] from a [`SearchConfig`].
///
/// Strategies are supplied in leaf order: the first one goes to the first
/// strategy-owning move encountered in a depth-first reading of the
/// composition, and so on. A composition containing an `lns` move needs a
/// neighbor.
///
/// # Examples
///
/// ```no_run
/// use treeline_config::SearchConfig;
/// use treeline_core::Env;
/// use treeline_solver::SearchBuilder;
/// # use treeline_solver::{Contradiction, Propagate, SearchScope, Strategy, Decision};
/// # #[derive(Debug)] struct MyStrategy;
/// # impl Strategy for MyStrategy {
/// #     fn next_decision(&mut self) -> Option<Decision> { None }
/// # }
/// # struct MyEngine;
/// # impl Propagate for MyEngine {
/// #     fn execute(&mut self, _: &mut SearchScope) -> Result<(), Contradiction> { Ok(()) }
/// # }
///
/// let env = Env::new();
/// let config = SearchConfig::load("search.toml").unwrap_or_default();
/// let mut search = SearchBuilder::new(env, config)
///     .strategy(Box::new(MyStrategy))
///     .build(Box::new(MyEngine))
///     .unwrap();
/// let report = search.solve_first();
/// ```
pub struct SearchBuilder {
    env: Env,
    config: SearchConfig,
    strategies: VecDeque<Box<dyn Strategy>>,
    neighbor: Option<Box<dyn Neighbor>>,
    objective: Option<Box<dyn BoundManager>>,
}

impl SearchBuilder {
    pub fn new(env: Env, config: SearchConfig) -> Self {
        Self {
            env,
            config,
            strategies: VecDeque::new(),
            neighbor: None,
            objective: None,
        }
    }

    /// Queues a strategy for the next strategy-owning move, in leaf order.
    pub fn strategy(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.strategies.push_back(strategy);
        self
    }

    /// Supplies the neighbor an `lns` move in the composition will use. A
    /// `seed` in the configuration reseeds it before the composition is
    /// built.
    pub fn neighbor(mut self, neighbor: Box<dyn Neighbor>) -> Self {
        self.neighbor = Some(neighbor);
        self
    }

    /// Supplies the objective layer. Defaults to satisfaction.
    pub fn objective(mut self, objective: Box<dyn BoundManager>) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn build(mut self, propagate: Box<dyn Propagate>) -> Result<SearchLoop, SearchError> {
        self.config.validate()?;
        if let (Some(seed), Some(neighbor)) = (self.config.seed, self.neighbor.as_deref_mut()) {
            neighbor.reseed(seed);
        }
        let moves = build_move(
            &self.config.search,
            &self.env,
            &mut self.strategies,
            &mut self.neighbor,
        )?;
        let objective = self
            .objective
            .take()
            .unwrap_or_else(|| Box::new(Satisfaction));
        let scope = SearchScope::new(self.env.clone(), objective);
        let mut search = SearchLoop::new(scope, moves, propagate);
        for limit in build_limits(&self.config.limits) {
            search.add_limit(limit);
        }
        Ok(search)
    }
}

fn build_move(
    config: &MoveConfig,
    env: &Env,
    strategies: &mut VecDeque<Box<dyn Strategy>>,
    neighbor: &mut Option<Box<dyn Neighbor>>,
) -> Result<SearchMove, SearchError> {
    Ok(match config {
        MoveConfig::Dfs => {
            let strategy = next_strategy(strategies, "dfs")?;
            SearchMove::Dfs(MoveDfs::new(strategy))
        }
        MoveConfig::Lds { discrepancy } => {
            let strategy = next_strategy(strategies, "lds")?;
            SearchMove::Lds(MoveLds::new(env, strategy, *discrepancy))
        }
        MoveConfig::Dds { discrepancy } => {
            let strategy = next_strategy(strategies, "dds")?;
            SearchMove::Dds(MoveDds::new(env, strategy, *discrepancy))
        }
        MoveConfig::Hbfs { a, b, n } => {
            let strategy = next_strategy(strategies, "hbfs")?;
            SearchMove::Hbfs(MoveHbfs::new(strategy, *a, *b, *n))
        }
        MoveConfig::Restart {
            cutoff,
            cap,
            on,
            inner,
        } => {
            let inner = build_move(inner, env, strategies, neighbor)?;
            SearchMove::Restart(MoveRestart::new(
                inner,
                build_cutoff(cutoff),
                build_restart_on(*on),
                *cap,
            ))
        }
        MoveConfig::Lns {
            fail_frequency,
            inner,
        } => {
            let inner = build_move(inner, env, strategies, neighbor)?;
            let neighbor = neighbor.take().ok_or(SearchError::MissingNeighbor)?;
            SearchMove::Lns(MoveLns::new(inner, neighbor, *fail_frequency))
        }
        MoveConfig::Seq { moves } => {
            let children = moves
                .iter()
                .map(|m| build_move(m, env, strategies, neighbor))
                .collect::<Result<Vec<_>, _>>()?;
            SearchMove::Seq(MoveSeq::new(env, children))
        }
    })
}

fn next_strategy(
    strategies: &mut VecDeque<Box<dyn Strategy>>,
    owner: &'static str,
) -> Result<Box<dyn Strategy>, SearchError> {
    strategies
        .pop_front()
        .ok_or(SearchError::MissingStrategy(owner))
}

fn build_cutoff(config: &CutoffConfig) -> Cutoff {
    match *config {
        CutoffConfig::Constant { scale } => Cutoff::Constant { scale },
        CutoffConfig::Geometric { base, grow } => Cutoff::Geometric { base, grow },
        CutoffConfig::Luby { scale } => Cutoff::Luby { scale },
    }
}

fn build_restart_on(config: treeline_config::RestartOn) -> RestartOn {
    match config {
        treeline_config::RestartOn::Fails => RestartOn::Fails,
        treeline_config::RestartOn::Nodes => RestartOn::Nodes,
    }
}

fn build_limits(config: &LimitsConfig) -> Vec<Box<dyn Limit>> {
    let mut limits: Vec<Box<dyn Limit>> = Vec::new();
    if let Some(secs) = config.time_limit_secs {
        limits.push(Box::new(TimeLimit(Duration::from_secs(secs))));
    }
    if let Some(nodes) = config.node_limit {
        limits.push(Box::new(NodeLimit(nodes)));
    }
    if let Some(fails) = config.fail_limit {
        limits.push(Box::new(FailLimit(fails)));
    }
    if let Some(solutions) = config.solution_limit {
        limits.push(Box::new(SolutionLimit(solutions)));
    }
    limits
}
