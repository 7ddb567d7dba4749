//! Error types for search construction.

use thiserror::Error;

/// Errors raised while assembling a search from configuration.
///
/// Search-time contradictions are *not* errors: they are plain
/// [`Contradiction`](crate::propagate::Contradiction) values recovered by
/// `repair`. Structural misuse of the move API (replacing a sequencer's
/// strategy, over-attaching child moves, popping past the root world) panics
/// instead, since it indicates an invalid composition built at setup time.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A leaf move in the configuration had no strategy left to consume.
    #[error("no decision strategy supplied for `{0}` move")]
    MissingStrategy(&'static str),

    /// An LNS move was configured without a neighbor.
    #[error("large-neighborhood search requires a neighbor")]
    MissingNeighbor,

    /// Invalid configuration data.
    #[error(transparent)]
    Config(#[from] treeline_config::ConfigError),
}
