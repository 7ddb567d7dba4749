//! Configuration surface for the treeline search core.
//!
//! Select and tune a search move composition (DFS, LDS, DDS, HBFS, LNS,
//! restarts, sequences) and external stop limits from plain data, loadable
//! from TOML or YAML, without touching solver code.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use treeline_config::{MoveConfig, SearchConfig};
//!
//! let config = SearchConfig::from_toml_str(r#"
//!     [limits]
//!     time_limit_secs = 30
//!     fail_limit = 100000
//!
//!     [search]
//!     type = "restart"
//!     cap = 50
//!     [search.cutoff]
//!     type = "luby"
//!     scale = 100
//!     [search.inner]
//!     type = "dfs"
//! "#).unwrap();
//!
//! assert!(matches!(config.search, MoveConfig::Restart { .. }));
//! ```
//!
//! Fall back to defaults when the file is missing:
//!
//! ```
//! use treeline_config::SearchConfig;
//!
//! let config = SearchConfig::load("search.toml").unwrap_or_default();
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod defaults;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level search configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    /// Random seed for reproducible neighborhood selection.
    #[serde(default)]
    pub seed: Option<u64>,

    /// External stop limits, checked once per loop iteration.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// The move composition driving tree exploration.
    #[serde(default)]
    pub search: MoveConfig,
}

impl SearchConfig {
    /// Creates a new default configuration (plain DFS, no limits).
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the configured wall-clock limit, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.limits.time_limit_secs.map(Duration::from_secs)
    }

    /// Checks cross-field consistency of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()
    }
}

/// External stop limits. `None` means unlimited.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LimitsConfig {
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
    #[serde(default)]
    pub node_limit: Option<u64>,
    #[serde(default)]
    pub fail_limit: Option<u64>,
    #[serde(default)]
    pub solution_limit: Option<u64>,
}

/// Which monotone counter a restart cutoff is compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartOn {
    #[default]
    Fails,
    Nodes,
}

/// A restart cutoff sequence.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CutoffConfig {
    /// Same cutoff every restart.
    Constant { scale: u64 },
    /// `base * grow^i` for restart `i`.
    Geometric { base: u64, grow: f64 },
    /// The Luby sequence (1, 1, 2, 1, 1, 2, 4, ...) times `scale`.
    Luby { scale: u64 },
}

/// Selection and tuning of one move in the composition.
///
/// Wrapper moves (`restart`, `lns`) and the sequencer nest recursively.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveConfig {
    /// Plain depth-first search.
    #[default]
    Dfs,

    /// Limited discrepancy search with the given maximum discrepancy.
    Lds { discrepancy: u32 },

    /// Depth-bounded discrepancy search with the given maximum discrepancy.
    Dds { discrepancy: u32 },

    /// Hybrid best-first search.
    ///
    /// `a` and `b` bound the acceptable node-recomputation ratio; the
    /// backtrack budget between restarts grows by a step adapted within
    /// `[1, n]`.
    Hbfs {
        #[serde(default = "defaults::hbfs_a")]
        a: f64,
        #[serde(default = "defaults::hbfs_b")]
        b: f64,
        #[serde(default = "defaults::hbfs_n")]
        n: u64,
    },

    /// Restart wrapper around an inner move.
    Restart {
        cutoff: CutoffConfig,
        /// Hard cap on the number of restarts issued.
        #[serde(default = "defaults::restart_cap")]
        cap: u64,
        #[serde(default)]
        on: RestartOn,
        inner: Box<MoveConfig>,
    },

    /// Large-neighborhood search around an inner move.
    Lns {
        /// Fast-restart frequency, in fails. `None` disables fast restarts.
        #[serde(default)]
        fail_frequency: Option<u64>,
        inner: Box<MoveConfig>,
    },

    /// Sequential composition; each move runs where the previous one stopped
    /// extending.
    Seq { moves: Vec<MoveConfig> },
}

impl MoveConfig {
    /// Checks parameter ranges, recursively.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            MoveConfig::Dfs | MoveConfig::Lds { .. } | MoveConfig::Dds { .. } => Ok(()),
            MoveConfig::Hbfs { a, b, n } => {
                if !(*a > 0.0 && a < b && *b < 1.0) {
                    return Err(ConfigError::Invalid(format!(
                        "hbfs requires 0 < a < b < 1, got a={a}, b={b}"
                    )));
                }
                if *n == 0 {
                    return Err(ConfigError::Invalid("hbfs requires n >= 1".into()));
                }
                Ok(())
            }
            MoveConfig::Restart { cutoff, inner, .. } => {
                match cutoff {
                    CutoffConfig::Constant { scale } | CutoffConfig::Luby { scale } => {
                        if *scale == 0 {
                            return Err(ConfigError::Invalid(
                                "restart cutoff scale must be positive".into(),
                            ));
                        }
                    }
                    CutoffConfig::Geometric { base, grow } => {
                        if *base == 0 || *grow < 1.0 {
                            return Err(ConfigError::Invalid(format!(
                                "geometric cutoff requires base >= 1 and grow >= 1.0, \
                                 got base={base}, grow={grow}"
                            )));
                        }
                    }
                }
                inner.validate()
            }
            MoveConfig::Lns { inner, .. } => inner.validate(),
            MoveConfig::Seq { moves } => {
                if moves.is_empty() {
                    return Err(ConfigError::Invalid(
                        "seq requires at least one move".into(),
                    ));
                }
                for m in moves {
                    m.validate()?;
                }
                Ok(())
            }
        }
    }
}
