//! The core diagnostic type for the Triage error system.
//!
//! A [`Diagnostic`] represents a single finding with optional error code,
//! diagram location and help text.

use std::fmt;

use serde::Serialize;

use crate::error::{Location, Severity, error_code::ErrorCode};

/// A finding about a diagram.
///
/// Diagnostics carry:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - The diagram element the finding applies to, when there is one
/// - Optional help text with suggestions
///
/// Two diagnostics are equal when every one of these parts is equal; the
/// validator uses this to record a finding only once.
///
/// # Example
///
/// ```text
/// error[E300]: diagram contains a cycle through `q2`, `q3`
///   at node:q2
///   = help: remove one of the arrows that leads back to an earlier question
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
}

impl Diagnostic {
    /// Create a critical diagnostic.
    ///
    /// Used for documents that cannot be read at all.
    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }

    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use triage_core::identifier::Id;
    /// # use triage_parser::error::{Diagnostic, ErrorCode, Location};
    ///
    /// let diag = Diagnostic::error("decision point has no `name`")
    ///     .with_code(ErrorCode::E100)
    ///     .with_location(Location::Node(Id::new("d1")))
    ///     .with_help("add a `name` property naming the question it tests");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the location, if any.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Create a new diagnostic with the given severity and message.
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            location: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
