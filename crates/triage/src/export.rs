//! The compiled questionnaire and its JSON form.

use serde::Serialize;

use triage_core::{
    identifier::Id,
    logic::{Answers, Connective, LogicExpr},
    semantic::{Diagram, Edge, Group, Node},
};
use triage_parser::error::Diagnostic;

use crate::{TriageError, logic::NodeLogic};

/// A simplified diagram with the logic of every node and edge.
///
/// Serializes as:
///
/// ```text
/// {"page_id": "...",
///  "nodes": [{"id", "type", "label", ..., "logic"}],
///  "edges": [{"id", "source", "target", "label"?, "logic"?}],
///  "groups": [{"id", "label", "members"}],
///  "findings": [{"severity", "code", "message", "location"}]}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Questionnaire {
    diagram: Diagram,
    logic: NodeLogic,
    findings: Vec<Diagnostic>,
}

#[derive(Serialize)]
struct QuestionnaireJson<'a> {
    page_id: &'a str,
    nodes: Vec<NodeJson<'a>>,
    edges: &'a [Edge],
    groups: Vec<&'a Group>,
    findings: &'a [Diagnostic],
}

#[derive(Serialize)]
struct NodeJson<'a> {
    #[serde(flatten)]
    node: &'a Node,
    logic: &'a LogicExpr,
}

impl Questionnaire {
    pub fn new(diagram: Diagram, logic: NodeLogic, findings: Vec<Diagnostic>) -> Self {
        Self {
            diagram,
            logic,
            findings,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Condition under which node `id` is shown.
    ///
    /// `None` when no logic was derived, as after a cycle.
    pub fn node_logic(&self, id: Id) -> Option<&LogicExpr> {
        self.logic.get(&id)
    }

    /// Whether node `id` is shown for `answers`.
    pub fn is_shown(&self, id: Id, answers: &Answers) -> bool {
        self.diagram.contains_node(id)
            && self
                .logic
                .get(&id)
                .is_none_or(|logic| logic.evaluate(answers))
    }

    pub fn findings(&self) -> &[Diagnostic] {
        &self.findings
    }

    /// Renders the questionnaire as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Export`] if serialization fails.
    pub fn to_json(&self) -> Result<String, TriageError> {
        Ok(serde_json::to_string_pretty(&self.as_json())?)
    }

    /// Renders the questionnaire as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Export`] if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value, TriageError> {
        Ok(serde_json::to_value(self.as_json())?)
    }

    fn as_json(&self) -> QuestionnaireJson<'_> {
        QuestionnaireJson {
            page_id: self.diagram.page_id(),
            nodes: self
                .diagram
                .nodes()
                .map(|node| NodeJson {
                    node,
                    logic: self.logic.get(&node.id()).unwrap_or(&ALWAYS),
                })
                .collect(),
            edges: self.diagram.edges(),
            groups: self.diagram.groups().collect(),
            findings: &self.findings,
        }
    }
}

static ALWAYS: LogicExpr = LogicExpr::Operator {
    operation: Connective::And,
    children: Vec::new(),
};
