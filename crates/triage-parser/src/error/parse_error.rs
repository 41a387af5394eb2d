//! The error a parse stops with.
//!
//! A [`ParseError`] names the [`Diagnostic`] that made the validation policy
//! stop (while reading, building, checking the whole diagram or simplifying)
//! and carries every finding recorded before it, so nothing reported so far
//! is lost. It always holds at least the stopping diagnostic.

use std::fmt;

use crate::error::Diagnostic;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Findings in report order, the cause among them. Never empty.
    diagnostics: Vec<Diagnostic>,
    cause: usize,
}

impl ParseError {
    /// Stops on `cause`, keeping the findings `recorded` so far.
    ///
    /// `cause` is appended unless `recorded` already holds it.
    pub fn new(cause: Diagnostic, mut recorded: Vec<Diagnostic>) -> Self {
        let index = match recorded.iter().position(|finding| *finding == cause) {
            Some(index) => index,
            None => {
                recorded.push(cause);
                recorded.len() - 1
            }
        };
        Self {
            diagnostics: recorded,
            cause: index,
        }
    }

    /// The diagnostic the run stopped on.
    pub fn cause(&self) -> &Diagnostic {
        &self.diagnostics[self.cause]
    }

    /// Every finding, in the order it was reported.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause())?;
        match self.diagnostics.len() {
            1 => Ok(()),
            count => write!(f, " (+{} more)", count - 1),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(diagnostic, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_error_from_diagnostic() {
        let diag = Diagnostic::critical("not a draw.io file").with_code(ErrorCode::E001);
        let err: ParseError = diag.into();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.cause().message(), "not a draw.io file");
    }

    #[test]
    fn test_cause_is_appended_after_findings() {
        let recorded = vec![Diagnostic::warning("loose node"), Diagnostic::warning("no label")];
        let err = ParseError::new(Diagnostic::error("cycle"), recorded);

        let messages: Vec<&str> = err.diagnostics().iter().map(Diagnostic::message).collect();
        assert_eq!(messages, ["loose node", "no label", "cycle"]);
        assert_eq!(err.cause().message(), "cycle");
    }

    #[test]
    fn test_recorded_cause_is_not_repeated() {
        let cause = Diagnostic::error("cycle");
        let recorded = vec![cause.clone(), Diagnostic::warning("loose node")];
        let err = ParseError::new(cause, recorded);

        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.cause().message(), "cycle");
    }

    #[test]
    fn test_parse_error_display_single() {
        let diag = Diagnostic::error("diagram has no entry node");
        let err: ParseError = diag.into();

        assert_eq!(err.to_string(), "error: diagram has no entry node");
    }

    #[test]
    fn test_display_leads_with_cause() {
        let recorded = vec![Diagnostic::warning("a warning"), Diagnostic::warning("another")];
        let err = ParseError::new(Diagnostic::error("first error"), recorded);

        assert_eq!(err.to_string(), "error: first error (+2 more)");
    }
}
