//! Error types for Triage operations.
//!
//! This module provides the main error type [`TriageError`] which wraps the
//! conditions that can stop a questionnaire from compiling.

use std::io;

use thiserror::Error;

use triage_parser::error::ParseError;

/// The main error type for Triage operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries every finding recorded up to the one that
/// stopped the run, together with the document text, so callers can point at
/// the offending cells.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),
}

impl TriageError {
    /// Create a new `Parse` error with the associated document text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
