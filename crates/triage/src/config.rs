//! Configuration types for compiling Triage questionnaires.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! external sources; every field has a default, so an empty document is a
//! valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`ValidationConfig`] - Validation level and declared entry node.
//! - [`SimplifyConfig`] - Limits of the graph simplifier.
//! - [`ExternalsConfig`] - Flag and numeric names supplied from outside the diagram.
//!
//! # Example
//!
//! ```
//! # use triage::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.simplify().max_iterations(), 32);
//! ```

use std::collections::HashSet;

use serde::Deserialize;

use triage_parser::validate::ValidationLevel;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Validation configuration section.
    #[serde(default)]
    validation: ValidationConfig,

    /// Simplifier configuration section.
    #[serde(default)]
    simplify: SimplifyConfig,

    /// External references section.
    #[serde(default)]
    externals: ExternalsConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        validation: ValidationConfig,
        simplify: SimplifyConfig,
        externals: ExternalsConfig,
    ) -> Self {
        Self {
            validation,
            simplify,
            externals,
        }
    }

    /// Returns the validation configuration.
    pub fn validation(&self) -> &ValidationConfig {
        &self.validation
    }

    /// Returns the simplifier configuration.
    pub fn simplify(&self) -> &SimplifyConfig {
        &self.simplify
    }

    /// Returns the external references.
    pub fn externals(&self) -> &ExternalsConfig {
        &self.externals
    }

    /// Replaces the validation level, keeping everything else.
    pub fn with_level(mut self, level: ValidationLevel) -> Self {
        self.validation.level = level;
        self
    }
}

/// How findings are enforced and where the questionnaire starts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    level: ValidationLevel,

    /// Id of the first question. Without it, every node that starts a path
    /// is an entry.
    #[serde(default)]
    entry: Option<String>,
}

impl ValidationConfig {
    pub fn new(level: ValidationLevel, entry: Option<String>) -> Self {
        Self { level, entry }
    }

    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }
}

/// Limits of the graph simplifier.
#[derive(Debug, Clone, Deserialize)]
pub struct SimplifyConfig {
    /// Rounds of the pass pipeline run before giving up on a fixed point.
    #[serde(default = "default_max_iterations")]
    max_iterations: usize,
}

fn default_max_iterations() -> usize {
    32
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

impl SimplifyConfig {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

/// Names a decision point may refer to that no node in the diagram carries.
///
/// Flags are raised by other questionnaires; numeric names are values
/// computed elsewhere, such as an age derived from a date of birth.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalsConfig {
    #[serde(default)]
    flags: HashSet<String>,

    #[serde(default)]
    numeric: HashSet<String>,
}

impl ExternalsConfig {
    pub fn new(
        flags: impl IntoIterator<Item = impl Into<String>>,
        numeric: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            flags: flags.into_iter().map(Into::into).collect(),
            numeric: numeric.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_flag(&self, name: &str) -> bool {
        self.flags.contains(name.trim())
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric.contains(name.trim())
    }
}
