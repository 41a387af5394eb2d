//! Where in a diagram a finding applies.

use std::fmt;

use serde::{Serialize, Serializer};
use triage_core::identifier::Id;

/// The diagram element a diagnostic points at.
///
/// Rendered as `node:<id>`, `edge:<id>`, `group:<id>` or `cell:<id>`. Raw
/// cells are used before a cell has been turned into a typed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Node(Id),
    Edge(Id),
    Group(Id),
    Cell(Id),
}

impl Location {
    pub fn id(&self) -> Id {
        match self {
            Location::Node(id) | Location::Edge(id) | Location::Group(id) | Location::Cell(id) => {
                *id
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Location::Node(_) => "node",
            Location::Edge(_) => "edge",
            Location::Group(_) => "group",
            Location::Cell(_) => "cell",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::Node(Id::new("q1")).to_string(), "node:q1");
        assert_eq!(Location::Edge(Id::new("e1")).to_string(), "edge:e1");
        assert_eq!(Location::Group(Id::new("g1")).to_string(), "group:g1");
        assert_eq!(Location::Cell(Id::new("7")).to_string(), "cell:7");
    }

    #[test]
    fn test_location_id() {
        assert_eq!(Location::Edge(Id::new("e1")).id(), Id::new("e1"));
    }
}
