//! Error and diagnostic system for the Triage parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Diagram locations (node, edge, group or raw cell)
//! - Severity levels
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single finding with optional error code, location and help text. Check
//! sites only construct diagnostics; whether a finding aborts the run is
//! decided by the [`Validator`](crate::validate::Validator). Findings that
//! abort are wrapped in [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use triage_core::identifier::Id;
//! # use triage_parser::error::{Diagnostic, ErrorCode, Location};
//!
//! let diag = Diagnostic::error("edge target `q9` does not exist")
//!     .with_code(ErrorCode::E202)
//!     .with_location(Location::Edge(Id::new("e4")))
//!     .with_help("reconnect the arrow to a shape on this page");
//! ```

mod diagnostic;
mod error_code;
mod location;
mod parse_error;
mod severity;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use location::Location;
pub use parse_error::ParseError;
pub use severity::Severity;
