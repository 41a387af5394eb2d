//! Severity levels for diagnostics.
//!
//! This module defines the severity of diagnostic messages, from document
//! failures that stop everything to advisory warnings.

use std::fmt;

use serde::Serialize;

/// The severity level of a diagnostic.
///
/// Severity determines how the diagnostic should be handled, together with
/// the configured [`ValidationLevel`](crate::validate::ValidationLevel):
/// - [`Severity::Critical`] always aborts
/// - [`Severity::Error`] aborts unless validation is lenient
/// - [`Severity::Warning`] is recorded and never aborts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document itself cannot be read.
    ///
    /// No diagram can be built from it at any validation level.
    Critical,

    /// A structural problem in the diagram.
    ///
    /// The questionnaire it describes would be wrong or incomplete.
    Error,

    /// A non-fatal issue about potential problems.
    ///
    /// Warnings point at diagram content that is suspicious but does not
    /// prevent a questionnaire from being produced.
    Warning,
}

impl Severity {
    /// Returns `true` if this is a critical severity.
    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Critical)
    }

    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}
