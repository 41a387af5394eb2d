//! Four-pass diagram builder.
//!
//! Cells reference each other by id in any order: an option may come before
//! its list, an edge before its endpoints. [`DiagramBuilder`] resolves them in
//! four passes over the same cell slice, each unlocking the next through the
//! builder's type state:
//!
//! 1. [`Empty`] → [`GroupsResolved`]: swimlane containers become groups.
//! 2. [`GroupsResolved`] → [`ListsResolved`]: stacked swimlanes become list
//!    questions.
//! 3. [`ListsResolved`] → [`NodesResolved`]: every other vertex becomes a
//!    node; children of lists become options.
//! 4. [`NodesResolved`] → [`EdgesResolved`]: edges, with their endpoints
//!    resolved against the nodes of pass 3.
//!
//! Passes only create elements. Findings go through the [`Validator`] the
//! builder owns.

use std::{
    collections::{HashMap, HashSet},
    marker::PhantomData,
};

use indexmap::IndexMap;
use log::debug;

use triage_core::{
    cell::{Cell, Geometry},
    identifier::Id,
    semantic::{Diagram, DiagnosisSeverity, Edge, Group, Node, NodeType},
    shape::{self, ColorClass, ShapeTag},
};

use crate::{
    error::{Diagnostic, ErrorCode, Location, ParseError},
    validate::Validator,
};

/// Attributes that describe the cell itself rather than the question.
const STRUCTURAL_ATTRIBUTES: [&str; 6] = [
    "vertex",
    "edge",
    "value",
    "label",
    "placeholders",
    "connectable",
];

/// Nothing resolved yet.
#[derive(Debug)]
pub struct Empty;

/// Groups are known.
#[derive(Debug)]
pub struct GroupsResolved;

/// List questions are known.
#[derive(Debug)]
pub struct ListsResolved;

/// Every node is known.
#[derive(Debug)]
pub struct NodesResolved;

/// Edges are resolved; the diagram is complete.
#[derive(Debug)]
pub struct EdgesResolved;

/// Builds a [`Diagram`] from the cells of one page.
///
/// # Example
///
/// ```
/// # use triage_core::cell::Cell;
/// # use triage_parser::{builder::DiagramBuilder, validate::{ValidationLevel, Validator}};
/// let cells = vec![
///     Cell::vertex("q1", "Fever?", "rounded=0;"),
///     Cell::vertex("q2", "Since when?", "rounded=0;"),
///     Cell::edge("e1", "q1", "q2").with_attribute("value", "yes"),
/// ];
///
/// let (diagram, validator) = DiagramBuilder::new("page-1", Validator::new(ValidationLevel::Normal))
///     .resolve_groups(&cells)?
///     .resolve_lists(&cells)?
///     .resolve_nodes(&cells)?
///     .resolve_edges(&cells)?
///     .finish();
///
/// assert_eq!(diagram.nodes_count(), 2);
/// assert_eq!(diagram.edges().len(), 1);
/// assert!(validator.findings().is_empty());
/// # Ok::<(), triage_parser::error::ParseError>(())
/// ```
#[derive(Debug)]
pub struct DiagramBuilder<S> {
    diagram: Diagram,
    validator: Validator,
    /// Cells that are neither vertices nor edges: the page root and its layers.
    layers: HashSet<Id>,
    /// Ids already turned into an element; later cells with the same id are skipped.
    claimed: HashSet<Id>,
    _state: PhantomData<S>,
}

impl<S> DiagramBuilder<S> {
    /// The diagram resolved so far.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    fn transition<T>(self) -> DiagramBuilder<T> {
        DiagramBuilder {
            diagram: self.diagram,
            validator: self.validator,
            layers: self.layers,
            claimed: self.claimed,
            _state: PhantomData,
        }
    }

    fn claim(&mut self, id: Id) -> bool {
        self.claimed.insert(id)
    }

    fn check_geometry(
        &mut self,
        geometry: Option<Geometry>,
        location: Location,
    ) -> Result<(), ParseError> {
        if geometry.is_some_and(|geometry| !geometry.is_valid()) {
            self.validator.report(
                Diagnostic::warning("geometry has non-finite or negative values")
                    .with_code(ErrorCode::E101)
                    .with_location(location),
            )?;
        }
        Ok(())
    }

    /// The group a list or node is placed in. Layers and a missing parent mean
    /// top level; any other parent is reported.
    fn container_group(&mut self, cell: &Cell, location: Location) -> Result<Option<Id>, ParseError> {
        let Some(parent) = cell.parent() else {
            return Ok(None);
        };
        if self.layers.contains(&parent) {
            return Ok(None);
        }
        if self.diagram.contains_group(parent) {
            return Ok(Some(parent));
        }
        self.validator.report(
            Diagnostic::error(format!(
                "parent `{parent}` is neither a group, a list nor a layer"
            ))
            .with_code(ErrorCode::E200)
            .with_location(location),
        )?;
        Ok(None)
    }

    fn join_group(&mut self, group: Option<Id>, node: Id) {
        if let Some(group) = group.and_then(|group| self.diagram.group_mut(group)) {
            group.add_member(node);
        }
    }
}

fn metadata(cell: &Cell) -> IndexMap<String, String> {
    cell.attributes()
        .iter()
        .filter(|(key, _)| !STRUCTURAL_ATTRIBUTES.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl DiagramBuilder<Empty> {
    pub fn new(page_id: impl Into<String>, validator: Validator) -> Self {
        Self {
            diagram: Diagram::new(page_id),
            validator,
            layers: HashSet::new(),
            claimed: HashSet::new(),
            _state: PhantomData,
        }
    }

    /// Pass 1: layers, duplicate ids and groups.
    ///
    /// # Errors
    ///
    /// Duplicate ids are errors.
    pub fn resolve_groups(
        mut self,
        cells: &[Cell],
    ) -> Result<DiagramBuilder<GroupsResolved>, ParseError> {
        let mut seen = HashSet::with_capacity(cells.len());
        for cell in cells {
            if !seen.insert(cell.id()) {
                self.validator.report(
                    Diagnostic::error(format!("id `{}` is used by more than one cell", cell.id()))
                        .with_code(ErrorCode::E103)
                        .with_location(Location::Cell(cell.id()))
                        .with_help("only the first cell with this id is used"),
                )?;
            }
            if !cell.is_vertex() && !cell.is_edge() {
                self.layers.insert(cell.id());
            }
        }

        for cell in cells {
            if !shape::is_group(cell.attributes(), cell.style()) || !self.claim(cell.id()) {
                continue;
            }
            self.check_geometry(cell.geometry(), Location::Group(cell.id()))?;
            self.diagram
                .insert_group(Group::new(cell.id(), cell.label()).with_geometry(cell.geometry()));
        }

        debug!(groups = self.diagram.groups().count(); "Resolved groups");
        Ok(self.transition())
    }
}

impl DiagramBuilder<GroupsResolved> {
    /// Pass 2: list questions, rounded ones single-choice and sharp ones
    /// multiple-choice.
    ///
    /// # Errors
    ///
    /// A parent that is not a group or layer is an error.
    pub fn resolve_lists(
        mut self,
        cells: &[Cell],
    ) -> Result<DiagramBuilder<ListsResolved>, ParseError> {
        let mut lists = 0;
        for cell in cells {
            if !shape::is_list(cell.attributes(), cell.style()) || !self.claim(cell.id()) {
                continue;
            }
            let id = cell.id();
            let node_type = match ShapeTag::classify(cell.attributes(), cell.style()) {
                ShapeTag::SelectOne => NodeType::SelectOne,
                _ => NodeType::SelectMultiple,
            };
            let group = self.container_group(cell, Location::Node(id))?;
            self.check_geometry(cell.geometry(), Location::Node(id))?;

            let node = Node::new(id, node_type, cell.label())
                .with_geometry(cell.geometry())
                .with_group(group)
                .with_metadata(metadata(cell))
                .with_style(cell.style().clone());
            self.diagram.insert_node(node);
            self.join_group(group, id);
            lists += 1;
        }

        debug!(lists; "Resolved lists");
        Ok(self.transition())
    }
}

/// Node type of a plain vertex from its shape; rounded rectangles read their
/// fill colour as a diagnosis severity.
fn vertex_type(cell: &Cell) -> (NodeType, Option<DiagnosisSeverity>) {
    match ShapeTag::classify(cell.attributes(), cell.style()) {
        ShapeTag::Rhombus => (NodeType::DecisionPoint, None),
        ShapeTag::Hexagon => (NodeType::NumericInteger, None),
        ShapeTag::Ellipse => (NodeType::NumericDecimal, None),
        ShapeTag::Callout => (NodeType::Text, None),
        ShapeTag::OffPageConnector => (NodeType::Goto, None),
        ShapeTag::Rectangle | ShapeTag::SelectOne | ShapeTag::SelectMultiple => {
            if !cell.style().is_rounded() {
                return (NodeType::Note, None);
            }
            let severity = match ColorClass::of_style(cell.style()) {
                Some(ColorClass::Red) => Some(DiagnosisSeverity::Severe),
                Some(ColorClass::Orange | ColorClass::Yellow) => Some(DiagnosisSeverity::Moderate),
                Some(ColorClass::Green) => Some(DiagnosisSeverity::Benign),
                Some(ColorClass::Grey) | None => None,
            };
            match severity {
                Some(severity) => (NodeType::Diagnosis, Some(severity)),
                None => (NodeType::Calculate, None),
            }
        }
    }
}

impl DiagramBuilder<ListsResolved> {
    /// Pass 3: every remaining vertex.
    ///
    /// Vertices inside a list become its options, in document order. Labels
    /// attached to edges are left for pass 4. Nodes and group members end up
    /// in document order.
    ///
    /// # Errors
    ///
    /// Decision points without a `name`, and parents that do not resolve, are
    /// errors.
    pub fn resolve_nodes(
        mut self,
        cells: &[Cell],
    ) -> Result<DiagramBuilder<NodesResolved>, ParseError> {
        let edge_ids: HashSet<Id> = cells.iter().filter(|c| c.is_edge()).map(Cell::id).collect();

        for cell in cells {
            let is_plain_vertex = cell.is_vertex()
                && !shape::is_group(cell.attributes(), cell.style())
                && !shape::is_list(cell.attributes(), cell.style());
            let is_edge_label = cell.parent().is_some_and(|parent| edge_ids.contains(&parent));
            if !is_plain_vertex || is_edge_label || !self.claim(cell.id()) {
                continue;
            }
            self.resolve_vertex(cell)?;
        }

        let lists: Vec<Id> = self
            .diagram
            .nodes()
            .filter(|node| {
                matches!(node.node_type(), NodeType::SelectOne | NodeType::SelectMultiple)
                    && node.options().is_empty()
            })
            .map(Node::id)
            .collect();
        for list in lists {
            self.validator.report(
                Diagnostic::warning("list question has no options")
                    .with_code(ErrorCode::E102)
                    .with_location(Location::Node(list)),
            )?;
        }

        let mut position: HashMap<Id, usize> = HashMap::with_capacity(cells.len());
        for (index, cell) in cells.iter().enumerate() {
            position.entry(cell.id()).or_insert(index);
        }
        self.diagram
            .sort_nodes_by_key(|id| position.get(id).copied().unwrap_or(usize::MAX));

        debug!(nodes = self.diagram.nodes_count(); "Resolved nodes");
        Ok(self.transition())
    }

    fn resolve_vertex(&mut self, cell: &Cell) -> Result<(), ParseError> {
        let id = cell.id();
        let location = Location::Node(id);

        let list_parent = cell.parent().filter(|parent| {
            self.diagram
                .node(*parent)
                .is_some_and(|node| matches!(node.node_type(), NodeType::SelectOne | NodeType::SelectMultiple))
        });
        let (node_type, severity, group) = match list_parent {
            Some(_) => (NodeType::SelectOption, None, None),
            None => {
                let (node_type, severity) = vertex_type(cell);
                (node_type, severity, self.container_group(cell, location)?)
            }
        };

        let node = Node::new(id, node_type, cell.label())
            .with_geometry(cell.geometry())
            .with_group(group)
            .with_parent(list_parent)
            .with_metadata(metadata(cell))
            .with_style(cell.style().clone())
            .with_severity(severity);

        if node_type == NodeType::DecisionPoint && node.name().is_none() {
            self.validator.report(
                Diagnostic::error("decision point has no `name`")
                    .with_code(ErrorCode::E100)
                    .with_location(location)
                    .with_help("add a `name` property naming the question this decision tests"),
            )?;
        }
        self.check_geometry(cell.geometry(), location)?;

        self.diagram.insert_node(node);
        self.join_group(group, id);
        if let Some(list) = list_parent.and_then(|list| self.diagram.node_mut(list)) {
            list.push_option(id);
        }
        Ok(())
    }
}

impl DiagramBuilder<NodesResolved> {
    /// Pass 4: edges.
    ///
    /// An endpoint that names a group stands for the group's first member
    /// that is not a help or hint box.
    ///
    /// # Errors
    ///
    /// Endpoints that resolve to nothing are errors. Edges missing an endpoint
    /// attribute are skipped with a warning.
    pub fn resolve_edges(
        mut self,
        cells: &[Cell],
    ) -> Result<DiagramBuilder<EdgesResolved>, ParseError> {
        for cell in cells {
            if !cell.is_edge() || !self.claim(cell.id()) {
                continue;
            }
            let id = cell.id();
            let location = Location::Edge(id);

            let (Some(source), Some(target)) = (cell.source(), cell.target()) else {
                self.validator.report(
                    Diagnostic::warning("edge is not connected at both ends")
                        .with_code(ErrorCode::E203)
                        .with_location(location)
                        .with_help("connect the arrow to a shape at both ends, or delete it"),
                )?;
                continue;
            };

            let source = self.resolve_endpoint(id, source, ErrorCode::E201, "source")?;
            let target = self.resolve_endpoint(id, target, ErrorCode::E202, "target")?;
            let (Some(source), Some(target)) = (source, target) else {
                continue;
            };

            if cell.geometry().is_some_and(|geometry| !geometry.is_valid()) {
                self.validator.report(
                    Diagnostic::warning("edge geometry has values that are not numbers")
                        .with_code(ErrorCode::E204)
                        .with_location(location),
                )?;
            }

            let edge = Edge::new(id, source, target)
                .with_label(Some(edge_label(cell, cells)))
                .with_style(cell.style().clone());
            self.diagram.push_edge(edge);
        }

        debug!(edges = self.diagram.edges().len(); "Resolved edges");
        Ok(self.transition())
    }

    fn resolve_endpoint(
        &mut self,
        edge: Id,
        endpoint: Id,
        code: ErrorCode,
        role: &str,
    ) -> Result<Option<Id>, ParseError> {
        if self.diagram.contains_node(endpoint) {
            return Ok(Some(endpoint));
        }

        let diagnostic = match self.diagram.group(endpoint) {
            Some(group) => {
                let stand_in = group.members().iter().copied().find(|member| {
                    self.diagram
                        .node(*member)
                        .is_some_and(|node| !node.is_annotation())
                });
                if stand_in.is_some() {
                    return Ok(stand_in);
                }
                Diagnostic::error(format!("edge {role} is group `{endpoint}`, which has no question"))
                    .with_code(ErrorCode::E205)
            }
            None => Diagnostic::error(format!("edge {role} `{endpoint}` does not exist"))
                .with_code(code),
        };
        self.validator
            .report(diagnostic.with_location(Location::Edge(edge)))?;
        Ok(None)
    }
}

/// The edge's own label, or the text of the first label cell attached to it.
fn edge_label(edge: &Cell, cells: &[Cell]) -> String {
    let own = edge.label();
    if !own.is_empty() {
        return own;
    }
    cells
        .iter()
        .filter(|cell| cell.is_vertex() && cell.parent() == Some(edge.id()))
        .map(Cell::label)
        .find(|label| !label.is_empty())
        .unwrap_or_default()
}

impl DiagramBuilder<EdgesResolved> {
    /// Returns the diagram and the validator with every finding recorded.
    pub fn finish(self) -> (Diagram, Validator) {
        (self.diagram, self.validator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationLevel;

    fn layers() -> Vec<Cell> {
        vec![Cell::new("0"), Cell::new("1").with_parent("0")]
    }

    fn build_at(cells: &[Cell], level: ValidationLevel) -> Result<(Diagram, Validator), ParseError> {
        Ok(DiagramBuilder::new("page", Validator::new(level))
            .resolve_groups(cells)?
            .resolve_lists(cells)?
            .resolve_nodes(cells)?
            .resolve_edges(cells)?
            .finish())
    }

    fn build(cells: &[Cell]) -> (Diagram, Validator) {
        build_at(cells, ValidationLevel::Lenient).unwrap()
    }

    fn codes(validator: &Validator) -> Vec<ErrorCode> {
        validator.findings().iter().filter_map(Diagnostic::code).collect()
    }

    fn node_type(diagram: &Diagram, id: &str) -> NodeType {
        diagram.node(Id::new(id)).unwrap().node_type()
    }

    #[test]
    fn test_shape_mapping() {
        let mut cells = layers();
        cells.extend([
            Cell::vertex("d", "Age?", "rhombus;").with_attribute("name", "age").with_parent("1"),
            Cell::vertex("i", "Age", "shape=hexagon;").with_parent("1"),
            Cell::vertex("f", "Weight", "ellipse;").with_parent("1"),
            Cell::vertex("t", "Info", "shape=callout;").with_parent("1"),
            Cell::vertex("g", "Go", "shape=offPageConnector;").with_parent("1"),
            Cell::vertex("n", "Note", "whiteSpace=wrap;").with_parent("1"),
        ]);
        let (diagram, validator) = build(&cells);

        assert_eq!(node_type(&diagram, "d"), NodeType::DecisionPoint);
        assert_eq!(node_type(&diagram, "i"), NodeType::NumericInteger);
        assert_eq!(node_type(&diagram, "f"), NodeType::NumericDecimal);
        assert_eq!(node_type(&diagram, "t"), NodeType::Text);
        assert_eq!(node_type(&diagram, "g"), NodeType::Goto);
        assert_eq!(node_type(&diagram, "n"), NodeType::Note);
        assert!(validator.findings().is_empty());
    }

    #[test]
    fn test_rounded_rectangles_by_colour() {
        let cells = [
            Cell::vertex("red", "Emergency", "rounded=1;fillColor=#ff3333;"),
            Cell::vertex("orange", "See GP", "rounded=1;fillColor=#ff9900;"),
            Cell::vertex("green", "Self care", "rounded=1;fillColor=#33cc33;"),
            Cell::vertex("plain", "BMI", "rounded=1;"),
        ];
        let (diagram, _) = build(&cells);

        let severity = |id: &str| diagram.node(Id::new(id)).unwrap().severity();
        assert_eq!(severity("red"), Some(DiagnosisSeverity::Severe));
        assert_eq!(severity("orange"), Some(DiagnosisSeverity::Moderate));
        assert_eq!(severity("green"), Some(DiagnosisSeverity::Benign));
        assert_eq!(node_type(&diagram, "plain"), NodeType::Calculate);
    }

    #[test]
    fn test_lists_and_options_in_any_order() {
        let mut cells = layers();
        cells.extend([
            Cell::vertex("o1", "Fever", "text;").with_parent("list"),
            Cell::vertex("list", "Symptoms", "swimlane;childLayout=stackLayout;").with_parent("1"),
            Cell::vertex("o2", "Cough", "text;").with_parent("list"),
            Cell::vertex("one", "Smoker", "swimlane;childLayout=stackLayout;rounded=1;"),
        ]);
        let (diagram, validator) = build(&cells);

        let list = diagram.node(Id::new("list")).unwrap();
        assert_eq!(list.node_type(), NodeType::SelectMultiple);
        assert_eq!(list.options(), &[Id::new("o1"), Id::new("o2")]);
        assert_eq!(node_type(&diagram, "o1"), NodeType::SelectOption);
        assert_eq!(diagram.node(Id::new("o1")).unwrap().parent(), Some(Id::new("list")));
        assert_eq!(node_type(&diagram, "one"), NodeType::SelectOne);

        let order: Vec<Id> = diagram.node_ids().collect();
        assert_eq!(order, vec![Id::new("o1"), Id::new("list"), Id::new("o2"), Id::new("one")]);
        assert_eq!(codes(&validator), vec![ErrorCode::E102]);
    }

    #[test]
    fn test_groups_and_membership() {
        let cells = [
            Cell::vertex("q", "Fever?", ""),
            Cell::vertex("g", "Vitals", "swimlane;"),
            Cell::vertex("a", "Pulse", "shape=hexagon;").with_parent("g"),
            Cell::vertex("l", "Pick", "swimlane;childLayout=stackLayout;").with_parent("g"),
            Cell::vertex("o", "A", "").with_parent("l"),
        ];
        let (diagram, validator) = build(&cells);

        let group = diagram.group(Id::new("g")).unwrap();
        assert_eq!(group.label(), "Vitals");
        assert_eq!(group.members(), &[Id::new("a"), Id::new("l")]);
        assert_eq!(diagram.node(Id::new("a")).unwrap().group(), Some(Id::new("g")));
        assert_eq!(diagram.node(Id::new("o")).unwrap().group(), None);
        assert!(validator.findings().is_empty());
    }

    #[test]
    fn test_edges_redirect_group_endpoints() {
        let cells = [
            Cell::vertex("start", "Start", ""),
            Cell::vertex("g", "Vitals", "swimlane;"),
            Cell::vertex("help", "Measure at rest", "fillColor=#33cc33;").with_parent("g"),
            Cell::vertex("pulse", "Pulse", "shape=hexagon;").with_parent("g"),
            Cell::edge("e1", "start", "g").with_attribute("value", "yes"),
        ];
        let (diagram, validator) = build(&cells);

        let edge = diagram.edge(Id::new("e1")).unwrap();
        assert_eq!(edge.target(), Id::new("pulse"));
        assert_eq!(edge.label(), Some("yes"));
        assert!(validator.findings().is_empty());
    }

    #[test]
    fn test_empty_group_target() {
        let cells = [
            Cell::vertex("start", "Start", ""),
            Cell::vertex("g", "Empty", "swimlane;"),
            Cell::edge("e1", "start", "g"),
        ];
        let (diagram, validator) = build(&cells);
        assert!(diagram.edges().is_empty());
        assert_eq!(codes(&validator), vec![ErrorCode::E205]);
    }

    #[test]
    fn test_edge_label_cell() {
        let cells = [
            Cell::vertex("a", "A", ""),
            Cell::vertex("b", "B", ""),
            Cell::edge("e1", "a", "b"),
            Cell::vertex("lbl", "No", "edgeLabel;").with_parent("e1"),
        ];
        let (diagram, _) = build(&cells);
        assert!(!diagram.contains_node(Id::new("lbl")));
        assert_eq!(diagram.edge(Id::new("e1")).unwrap().label(), Some("No"));
    }

    #[test]
    fn test_ghost_and_unresolved_edges() {
        let cells = [
            Cell::vertex("a", "A", ""),
            Cell::new("ghost").with_attribute("edge", "1").with_source("a"),
            Cell::edge("e2", "a", "missing"),
            Cell::edge("e3", "missing", "a"),
        ];
        let (diagram, validator) = build(&cells);
        assert!(diagram.edges().is_empty());
        assert_eq!(
            codes(&validator),
            vec![ErrorCode::E203, ErrorCode::E202, ErrorCode::E201]
        );
    }

    #[test]
    fn test_unresolved_endpoint_aborts_at_normal() {
        let cells = [Cell::vertex("a", "A", ""), Cell::edge("e", "a", "missing")];
        let err = build_at(&cells, ValidationLevel::Normal).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E202));
    }

    #[test]
    fn test_ghost_edge_is_only_a_warning() {
        let cells = [
            Cell::vertex("a", "A", ""),
            Cell::new("ghost").with_attribute("edge", "1").with_target("a"),
        ];
        let (_, validator) = build_at(&cells, ValidationLevel::Strict).unwrap();
        assert_eq!(codes(&validator), vec![ErrorCode::E203]);
    }

    #[test]
    fn test_decision_point_requires_name() {
        let cells = [Cell::vertex("d", "Adult?", "rhombus;")];
        let err = build_at(&cells, ValidationLevel::Normal).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E100));
        assert_eq!(err.diagnostics()[0].location(), Some(Location::Node(Id::new("d"))));
    }

    #[test]
    fn test_orphan_parent() {
        let cells = [
            Cell::vertex("a", "A", ""),
            Cell::vertex("b", "B", "").with_parent("a"),
        ];
        let (diagram, validator) = build(&cells);
        assert!(diagram.contains_node(Id::new("b")));
        assert_eq!(codes(&validator), vec![ErrorCode::E200]);
    }

    #[test]
    fn test_duplicate_ids() {
        let cells = [Cell::vertex("a", "First", ""), Cell::vertex("a", "Second", "")];
        let (diagram, validator) = build(&cells);
        assert_eq!(diagram.node(Id::new("a")).unwrap().label(), "First");
        assert_eq!(codes(&validator), vec![ErrorCode::E103]);
    }

    #[test]
    fn test_invalid_geometry_warns() {
        let cells = [Cell::vertex("a", "A", "").with_geometry(Geometry::new(0.0, 0.0, -5.0, 10.0))];
        let (_, validator) = build_at(&cells, ValidationLevel::Strict).unwrap();
        assert_eq!(codes(&validator), vec![ErrorCode::E101]);
    }

    #[test]
    fn test_metadata_keeps_custom_attributes() {
        let cells = [Cell::vertex("q", "Age?", "shape=hexagon;").with_attribute("name", "age")];
        let (diagram, _) = build(&cells);
        let node = diagram.node(Id::new("q")).unwrap();
        assert_eq!(node.name(), Some("age"));
        assert!(!node.metadata().contains_key("value"));
        assert!(!node.metadata().contains_key("vertex"));
    }
}
