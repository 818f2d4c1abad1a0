//! Module: config
//! Responsibility: planner and executor tuning knobs, loadable from TOML.
//! Does not own: per-query hints (those travel with each `plan_query` call
//! and are merged with `default_hints`).

use crate::plan::QueryHints;
use serde::Deserialize;
use thiserror::Error as ThisError;

pub const DEFAULT_MAX_DNF_BRANCHES: usize = 64;
pub const DEFAULT_SORT_BUFFER_LIMIT: usize = 100_000;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to parse planner config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid planner config: {field} must be at least 1")]
    ZeroLimit { field: &'static str },
}

///
/// PlannerConfig
///
/// Every field is optional in TOML; missing fields take the defaults below.
///
/// ```toml
/// default_hints = ["no_intersection"]
/// enable_intersection = true
/// max_dnf_branches = 64
/// sort_buffer_limit = 100000
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Hints applied to every query in addition to the per-call hints.
    pub default_hints: QueryHints,

    pub enable_intersection: bool,

    /// Disjunctive normal forms wider than this plan as one full scan.
    pub max_dnf_branches: usize,

    /// Rows a sort stage may buffer for one run before it fails.
    pub sort_buffer_limit: usize,
}

impl PlannerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dnf_branches == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_dnf_branches",
            });
        }
        if self.sort_buffer_limit == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "sort_buffer_limit",
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn with_default_hints(mut self, hints: QueryHints) -> Self {
        self.default_hints = hints;
        self
    }

    #[must_use]
    pub const fn with_intersection(mut self, enabled: bool) -> Self {
        self.enable_intersection = enabled;
        self
    }

    #[must_use]
    pub const fn with_max_dnf_branches(mut self, limit: usize) -> Self {
        self.max_dnf_branches = limit;
        self
    }

    #[must_use]
    pub const fn with_sort_buffer_limit(mut self, limit: usize) -> Self {
        self.sort_buffer_limit = limit;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_hints: QueryHints::empty(),
            enable_intersection: true,
            max_dnf_branches: DEFAULT_MAX_DNF_BRANCHES,
            sort_buffer_limit: DEFAULT_SORT_BUFFER_LIMIT,
        }
    }
}

///
/// TESTS
///
