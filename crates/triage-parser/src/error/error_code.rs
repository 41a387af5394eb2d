//! Error codes for the Triage diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Document errors
//! - `E1xx` - Element errors
//! - `E2xx` - Relationship errors
//! - `E3xx` - Diagram-wide errors
//! - `E4xx` - Simplification and logic errors

use std::fmt;

use serde::{Serialize, Serializer};

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Document Errors (E0xx)
    // =========================================================================
    /// Unparsable document.
    ///
    /// The input is not well-formed XML.
    E001,

    /// Missing graph model.
    ///
    /// A page has no `mxGraphModel` element, or the model has no `root`.
    E002,

    /// Compressed diagram.
    ///
    /// The page content is stored compressed. Re-save the file from draw.io
    /// with compression turned off.
    E003,

    /// Unknown page.
    ///
    /// The document has no pages, or no page with the requested id or name.
    E004,

    // =========================================================================
    // Element Errors (E1xx)
    // =========================================================================
    /// Missing required attribute.
    ///
    /// A shape lacks an attribute its type requires, such as the `name` of a
    /// decision point.
    E100,

    /// Invalid geometry.
    ///
    /// A coordinate is not a finite number or a size is negative.
    E101,

    /// Empty list.
    ///
    /// A list question has no options.
    E102,

    /// Duplicate id.
    ///
    /// Two cells on the same page share an id.
    E103,

    /// Malformed cell.
    ///
    /// A cell has no `id` attribute, or a `UserObject` wraps no `mxCell`.
    E104,

    // =========================================================================
    // Relationship Errors (E2xx)
    // =========================================================================
    /// Orphan parent reference.
    ///
    /// A cell names a parent that is neither a group, a list nor a layer.
    E200,

    /// Unresolved edge source.
    ///
    /// The source of an edge does not exist on the page.
    E201,

    /// Unresolved edge target.
    ///
    /// The target of an edge does not exist on the page.
    E202,

    /// Ghost edge.
    ///
    /// An edge is missing its source or target attribute.
    E203,

    /// Malformed edge geometry.
    ///
    /// The geometry of an edge contains values that are not numbers.
    E204,

    /// Empty group target.
    ///
    /// An edge points at a group that has no node to stand in for it.
    E205,

    // =========================================================================
    // Diagram-wide Errors (E3xx)
    // =========================================================================
    /// Cycle.
    ///
    /// The questions form a loop; questionnaires must be acyclic.
    E300,

    /// Unreachable node.
    ///
    /// No path leads to the node from the entry node.
    E301,

    /// Inconsistent group membership.
    ///
    /// A group lists a member that does not point back at the group, or the
    /// other way round.
    E302,

    /// Multiple entry nodes.
    ///
    /// More than one question has no incoming arrows.
    E303,

    /// No entry node.
    ///
    /// Every question has an incoming arrow, or the declared entry node does
    /// not exist.
    E304,

    /// Isolated node.
    ///
    /// A node has neither incoming nor outgoing arrows.
    E305,

    /// Orphaned option.
    ///
    /// An option node survived simplification without its list.
    E306,

    /// Dangling edge.
    ///
    /// An edge endpoint refers to a node that no longer exists.
    E307,

    // =========================================================================
    // Simplification and Logic Errors (E4xx)
    // =========================================================================
    /// Simplification did not settle.
    ///
    /// The simplifier reached its iteration cap before the diagram stopped
    /// changing.
    E400,

    /// Unresolved decision reference.
    ///
    /// A decision point names a question that does not exist and is not a
    /// configured external.
    E401,

    /// Unparsable decision label.
    ///
    /// The label of a decision point on a numeric question has no
    /// `operator number` comparison, or a list decision has no `[option]`.
    E402,

    /// Goto cannot be folded.
    ///
    /// A goto has no single outgoing arrow and its `name` does not refer to a
    /// node.
    E403,

    /// Disconnected decision point.
    ///
    /// A decision point has no incoming or no outgoing arrows.
    E404,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Document errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            // Element errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            // Relationship errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            // Diagram-wide errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            ErrorCode::E305 => "E305",
            ErrorCode::E306 => "E306",
            ErrorCode::E307 => "E307",
            // Simplification and logic errors
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
            ErrorCode::E402 => "E402",
            ErrorCode::E403 => "E403",
            ErrorCode::E404 => "E404",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Document errors
            ErrorCode::E001 => "unparsable document",
            ErrorCode::E002 => "missing graph model",
            ErrorCode::E003 => "compressed diagram",
            ErrorCode::E004 => "unknown page",
            // Element errors
            ErrorCode::E100 => "missing required attribute",
            ErrorCode::E101 => "invalid geometry",
            ErrorCode::E102 => "empty list",
            ErrorCode::E103 => "duplicate id",
            ErrorCode::E104 => "malformed cell",
            // Relationship errors
            ErrorCode::E200 => "orphan parent reference",
            ErrorCode::E201 => "unresolved edge source",
            ErrorCode::E202 => "unresolved edge target",
            ErrorCode::E203 => "ghost edge",
            ErrorCode::E204 => "malformed edge geometry",
            ErrorCode::E205 => "empty group target",
            // Diagram-wide errors
            ErrorCode::E300 => "cycle",
            ErrorCode::E301 => "unreachable node",
            ErrorCode::E302 => "inconsistent group membership",
            ErrorCode::E303 => "multiple entry nodes",
            ErrorCode::E304 => "no entry node",
            ErrorCode::E305 => "isolated node",
            ErrorCode::E306 => "orphaned option",
            ErrorCode::E307 => "dangling edge",
            // Simplification and logic errors
            ErrorCode::E400 => "simplification did not settle",
            ErrorCode::E401 => "unresolved decision reference",
            ErrorCode::E402 => "unparsable decision label",
            ErrorCode::E403 => "goto cannot be folded",
            ErrorCode::E404 => "disconnected decision point",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
