//! Search control core for constraint solvers.
//!
//! This crate drives the exploration of an implicit search tree over a
//! reversible memory ([`treeline_core`]): decisions are pushed onto a
//! [`DecisionPath`](decision::DecisionPath), each one guarded by a trail
//! world, and a family of [`Move`](search::Move) strategies decides how the
//! tree is walked:
//!
//! - [`MoveDfs`](search::MoveDfs): depth-first search,
//! - [`MoveLds`](search::MoveLds) / [`MoveDds`](search::MoveDds):
//!   discrepancy-bounded variants,
//! - [`MoveHbfs`](search::MoveHbfs): hybrid best-first search over open
//!   right branches,
//! - [`MoveLns`](search::MoveLns): large-neighborhood search,
//! - [`MoveRestart`](search::MoveRestart): restart wrapper,
//! - [`MoveSeq`](search::MoveSeq): sequential composition.
//!
//! The outer loop ([`driver::SearchLoop`]) alternates `extend` (go deeper)
//! and `repair` (recover from a contradiction) on the installed move, calling
//! a [`Propagate`](propagate::Propagate) collaborator in between. Constraint
//! filtering, the propagation scheduler and model building live outside this
//! crate and are consumed through the narrow traits in [`propagate`],
//! [`objective`] and [`neighbor`].

pub mod builder;
pub mod cutoff;
pub mod decision;
pub mod driver;
pub mod error;
pub mod limits;
pub mod measures;
pub mod neighbor;
pub mod objective;
pub mod propagate;
pub mod scope;
pub mod search;
pub mod strategy;

#[cfg(test)]
pub(crate) mod test_utils;

pub use builder::SearchBuilder;
pub use decision::{Decision, DecisionPath, VarId};
pub use driver::{Feasibility, SearchLoop, SearchReport};
pub use error::SearchError;
pub use measures::{Measures, SearchState};
pub use neighbor::{Fragment, Neighbor};
pub use objective::{BoundManager, ObjectivePolicy};
pub use propagate::{Contradiction, Propagate};
pub use scope::SearchScope;
pub use search::{Move, SearchMove};
pub use strategy::Strategy;
