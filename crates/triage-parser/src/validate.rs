//! Validation policy and whole-diagram checks.
//!
//! Every check in the crate builds a [`Diagnostic`] and hands it to a
//! [`Validator`]. The validator records it, looks up what to do in the
//! central [`policy`] table, and either keeps going or returns a
//! [`ParseError`] holding every finding recorded so far.
//!
//! [`validate_diagram`] runs the checks that need the whole diagram: cycles,
//! reachability, entry nodes, group consistency and dangling references.

use std::{collections::HashSet, fmt, str::FromStr};

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use triage_core::{
    graph::DiagramGraph,
    identifier::Id,
    semantic::{Diagram, Edge, Node, NodeType},
};

use crate::error::{Diagnostic, ErrorCode, Location, ParseError, Severity};

/// How strictly findings are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Errors abort silently; the caller reports them.
    Strict,
    /// Errors are logged, then abort.
    #[default]
    Normal,
    /// Errors are recorded and processing continues.
    Lenient,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Strict => "strict",
            ValidationLevel::Normal => "normal",
            ValidationLevel::Lenient => "lenient",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationLevel::Strict),
            "normal" => Ok(ValidationLevel::Normal),
            "lenient" => Ok(ValidationLevel::Lenient),
            other => Err(format!(
                "unknown validation level `{other}`, expected strict, normal or lenient"
            )),
        }
    }
}

/// What happens to a reported finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Stop immediately.
    Abort,
    /// Log the finding, then stop.
    LogAndAbort,
    /// Keep the finding and continue.
    Record,
}

/// The policy table: severity × level → disposition.
///
/// | severity \ level | Strict | Normal      | Lenient |
/// |------------------|--------|-------------|---------|
/// | Critical         | Abort  | Abort       | Abort   |
/// | Error            | Abort  | LogAndAbort | Record  |
/// | Warning          | Record | Record      | Record  |
pub fn policy(severity: Severity, level: ValidationLevel) -> Disposition {
    match (severity, level) {
        (Severity::Critical, _) => Disposition::Abort,
        (Severity::Error, ValidationLevel::Strict) => Disposition::Abort,
        (Severity::Error, ValidationLevel::Normal) => Disposition::LogAndAbort,
        (Severity::Error, ValidationLevel::Lenient) => Disposition::Record,
        (Severity::Warning, _) => Disposition::Record,
    }
}

/// Accumulates findings and applies the [`policy`].
#[derive(Debug, Clone, Default)]
pub struct Validator {
    level: ValidationLevel,
    findings: Vec<Diagnostic>,
}

impl Validator {
    pub fn new(level: ValidationLevel) -> Self {
        Self {
            level,
            findings: Vec::new(),
        }
    }

    /// Continues validation on top of findings recorded by an earlier phase.
    pub fn with_findings(level: ValidationLevel, findings: Vec<Diagnostic>) -> Self {
        Self { level, findings }
    }

    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    pub fn findings(&self) -> &[Diagnostic] {
        &self.findings
    }

    /// Reports a finding.
    ///
    /// The finding is recorded unless an identical one already was.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] with every recorded finding when the policy
    /// says to abort.
    pub fn report(&mut self, diagnostic: Diagnostic) -> Result<(), ParseError> {
        let disposition = policy(diagnostic.severity(), self.level);
        let is_new = !self.findings.contains(&diagnostic);
        if is_new {
            self.findings.push(diagnostic.clone());
        }

        match disposition {
            Disposition::Record => {
                if is_new {
                    match diagnostic.location() {
                        Some(location) => warn!(location:%; "{diagnostic}"),
                        None => warn!("{diagnostic}"),
                    }
                }
                Ok(())
            }
            Disposition::LogAndAbort => {
                match diagnostic.location() {
                    Some(location) => error!(location:%; "{diagnostic}"),
                    None => error!("{diagnostic}"),
                }
                Err(ParseError::new(diagnostic, self.findings.clone()))
            }
            Disposition::Abort => Err(ParseError::new(diagnostic, self.findings.clone())),
        }
    }

    /// Records a finding that leaves nothing to continue with, and returns
    /// the error to stop on whatever the policy says.
    pub fn abort(&mut self, diagnostic: Diagnostic) -> ParseError {
        match self.report(diagnostic.clone()) {
            Err(err) => err,
            Ok(()) => ParseError::new(diagnostic, self.findings.clone()),
        }
    }

    /// Wraps `value` with the findings recorded so far.
    pub fn finish<T>(self, value: T) -> Validated<T> {
        Validated {
            value,
            findings: self.findings,
        }
    }

    pub fn into_findings(self) -> Vec<Diagnostic> {
        self.findings
    }
}

/// A result that passed validation, together with the findings that did not
/// stop it.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    value: T,
    findings: Vec<Diagnostic>,
}

impl<T> Validated<T> {
    pub fn new(value: T, findings: Vec<Diagnostic>) -> Self {
        Self { value, findings }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn findings(&self) -> &[Diagnostic] {
        &self.findings
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.findings)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        Validated {
            value: f(self.value),
            findings: self.findings,
        }
    }
}

/// When [`validate_diagram`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Right after the builder.
    Built,
    /// After the simplifier; option nodes must be gone by then.
    Simplified,
}

/// Runs the whole-diagram checks.
///
/// `entry` is the declared entry node; without one, every node that starts a
/// path counts as an entry.
///
/// # Errors
///
/// Returns the [`ParseError`] of the first finding the policy aborts on.
pub fn validate_diagram(
    diagram: &Diagram,
    entry: Option<Id>,
    phase: Phase,
    validator: &mut Validator,
) -> Result<(), ParseError> {
    debug!(phase:?, nodes = diagram.nodes_count(); "Validating diagram");

    check_dangling_edges(diagram, validator)?;
    check_groups(diagram, validator)?;

    let graph = DiagramGraph::new(diagram);
    check_cycles(&graph, validator)?;
    check_connectivity(&graph, entry, validator)?;

    if phase == Phase::Simplified {
        check_orphan_options(diagram, validator)?;
    }
    Ok(())
}

fn check_dangling_edges(diagram: &Diagram, validator: &mut Validator) -> Result<(), ParseError> {
    for edge in diagram.edges() {
        for (role, endpoint) in [("source", edge.source()), ("target", edge.target())] {
            if !diagram.contains_node(endpoint) {
                validator.report(
                    Diagnostic::error(format!(
                        "edge {role} `{endpoint}` is not a node of the diagram"
                    ))
                    .with_code(ErrorCode::E307)
                    .with_location(Location::Edge(edge.id())),
                )?;
            }
        }
    }
    Ok(())
}

fn check_groups(diagram: &Diagram, validator: &mut Validator) -> Result<(), ParseError> {
    for group in diagram.groups() {
        for member in group.members() {
            let points_back = diagram
                .node(*member)
                .is_some_and(|node| node.group() == Some(group.id()));
            if !points_back {
                validator.report(
                    Diagnostic::error(format!(
                        "group lists `{member}`, which is not a node of the group"
                    ))
                    .with_code(ErrorCode::E302)
                    .with_location(Location::Group(group.id())),
                )?;
            }
        }
    }

    for node in diagram.nodes() {
        let Some(group_id) = node.group() else {
            continue;
        };
        let listed = diagram
            .group(group_id)
            .is_some_and(|group| group.members().contains(&node.id()));
        if !listed {
            validator.report(
                Diagnostic::error(format!(
                    "node belongs to group `{group_id}`, which does not list it"
                ))
                .with_code(ErrorCode::E302)
                .with_location(Location::Node(node.id())),
            )?;
        }
    }
    Ok(())
}

fn check_cycles(graph: &DiagramGraph<'_>, validator: &mut Validator) -> Result<(), ParseError> {
    for cycle in graph.cycles() {
        let Some(first) = cycle.first().copied() else {
            continue;
        };
        let members = cycle
            .iter()
            .map(|id| format!("`{id}`"))
            .collect::<Vec<_>>()
            .join(", ");
        validator.report(
            Diagnostic::error(format!("diagram contains a cycle through {members}"))
                .with_code(ErrorCode::E300)
                .with_location(Location::Node(first))
                .with_help("remove one of the arrows that leads back to an earlier question"),
        )?;
    }
    Ok(())
}

/// Whether `id` takes part in any edge, directly or through its list.
///
/// Options are linked to their list by containment rather than by an edge,
/// so a list with connected options is connected and the other way round.
fn is_connected(graph: &DiagramGraph<'_>, id: Id) -> bool {
    let has_edges = |id: Id| graph.in_degree(id) + graph.out_degree(id) > 0;
    let Some(node) = graph.diagram().node(id) else {
        return false;
    };
    has_edges(id)
        || node.options().iter().any(|option| has_edges(*option))
        || node.parent().is_some_and(has_edges)
}

/// Nodes that start a path: no incoming edge other than from help or hint
/// boxes, and an outgoing edge of their own or through one of their options.
///
/// When no node has such an edge the unlinked nodes are the candidates, so a
/// page holding a single question starts at that question.
fn entry_candidates(graph: &DiagramGraph<'_>) -> Vec<Id> {
    let diagram = graph.diagram();
    let from_annotation = |edge: &Edge| {
        diagram
            .node(edge.source())
            .is_some_and(|source| source.is_annotation())
    };
    let (linked, unlinked): (Vec<&Node>, Vec<&Node>) = diagram
        .nodes()
        .filter(|node| node.node_type() != NodeType::SelectOption && !node.is_annotation())
        .filter(|node| graph.incoming(node.id()).all(from_annotation))
        .partition(|node| {
            graph.out_degree(node.id()) > 0
                || node.options().iter().any(|option| graph.out_degree(*option) > 0)
        });

    let candidates = if linked.is_empty() { unlinked } else { linked };
    candidates.into_iter().map(Node::id).collect()
}

/// Reachability that also steps from a list to its options and back.
fn reachable(graph: &DiagramGraph<'_>, starts: &[Id]) -> HashSet<Id> {
    let diagram = graph.diagram();
    let mut reached: HashSet<Id> = HashSet::new();
    let mut frontier: Vec<Id> = starts.to_vec();

    while !frontier.is_empty() {
        let found = graph.reachable_from(&frontier);
        frontier.clear();
        for id in found {
            if !reached.insert(id) {
                continue;
            }
            let Some(node) = diagram.node(id) else {
                continue;
            };
            frontier.extend(node.options().iter().copied().filter(|o| !reached.contains(o)));
            if let Some(parent) = node.parent().filter(|p| !reached.contains(p)) {
                frontier.push(parent);
            }
        }
    }
    reached
}

fn check_connectivity(
    graph: &DiagramGraph<'_>,
    entry: Option<Id>,
    validator: &mut Validator,
) -> Result<(), ParseError> {
    let diagram = graph.diagram();

    let entries = match entry {
        Some(entry) if diagram.contains_node(entry) => vec![entry],
        Some(entry) => {
            validator.report(
                Diagnostic::error(format!("declared entry node `{entry}` does not exist"))
                    .with_code(ErrorCode::E304)
                    .with_help("set `validation.entry` to the id of the first question"),
            )?;
            return Ok(());
        }
        None => entry_candidates(graph),
    };

    match entries.as_slice() {
        [] => {
            validator.report(
                Diagnostic::error("diagram has no entry node")
                    .with_code(ErrorCode::E304)
                    .with_help("the first question must have no incoming arrows"),
            )?;
            return Ok(());
        }
        [_] => {}
        [_, rest @ ..] => {
            let names = entries
                .iter()
                .map(|id| format!("`{id}`"))
                .collect::<Vec<_>>()
                .join(", ");
            validator.report(
                Diagnostic::warning(format!("diagram has {} entry nodes: {names}", 1 + rest.len()))
                    .with_code(ErrorCode::E303),
            )?;
        }
    }

    let reached = reachable(graph, &entries);
    for node in diagram.nodes() {
        let id = node.id();
        if reached.contains(&id) || node.is_annotation() {
            continue;
        }
        let diagnostic = if is_connected(graph, id) {
            Diagnostic::warning("node cannot be reached from the entry node")
                .with_code(ErrorCode::E301)
        } else {
            Diagnostic::warning("node has no incoming or outgoing arrows")
                .with_code(ErrorCode::E305)
        };
        validator.report(diagnostic.with_location(Location::Node(id)))?;
    }
    Ok(())
}

fn check_orphan_options(diagram: &Diagram, validator: &mut Validator) -> Result<(), ParseError> {
    for node in diagram.nodes() {
        if node.node_type() == NodeType::SelectOption {
            validator.report(
                Diagnostic::error("option is no longer attached to a list question")
                    .with_code(ErrorCode::E306)
                    .with_location(Location::Node(node.id())),
            )?;
        }
    }
    Ok(())
}
