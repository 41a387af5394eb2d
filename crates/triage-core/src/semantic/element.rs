//! Nodes, edges and groups of a questionnaire diagram.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    cell::Geometry, identifier::Id, logic::LogicExpr, shape::ColorClass, style::Style,
};

/// Closed set of node kinds.
///
/// The builder assigns the shape-derived kinds; the simplifier later folds
/// several of them into their consolidated forms (`Calculate` and `Diagnosis`
/// become `Flag`, the two numeric kinds become `Numeric`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    SelectOne,
    SelectMultiple,
    NumericInteger,
    NumericDecimal,
    /// Consolidated numeric question, see [`Node::subtype`].
    Numeric,
    YesNo,
    Flag,
    Diagnosis,
    Calculate,
    Note,
    Text,
    DecisionPoint,
    Goto,
    SelectOption,
    Help,
    Hint,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::SelectOne => "select_one",
            NodeType::SelectMultiple => "select_multiple",
            NodeType::NumericInteger => "numeric_integer",
            NodeType::NumericDecimal => "numeric_decimal",
            NodeType::Numeric => "numeric",
            NodeType::YesNo => "yes_no",
            NodeType::Flag => "flag",
            NodeType::Diagnosis => "diagnosis",
            NodeType::Calculate => "calculate",
            NodeType::Note => "note",
            NodeType::Text => "text",
            NodeType::DecisionPoint => "decision_point",
            NodeType::Goto => "goto",
            NodeType::SelectOption => "select_option",
            NodeType::Help => "help",
            NodeType::Hint => "hint",
        }
    }

    /// Kinds that own an ordered option sequence.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            NodeType::SelectOne | NodeType::SelectMultiple | NodeType::YesNo
        )
    }

    /// Kinds a decision point may compare against as a number.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            NodeType::Numeric | NodeType::NumericInteger | NodeType::NumericDecimal
        )
    }

    /// Kinds that set a flag when traversed.
    pub fn is_flag_like(&self) -> bool {
        matches!(
            self,
            NodeType::Flag | NodeType::Diagnosis | NodeType::Calculate
        )
    }

    /// Kinds drawn as plain rectangles, whose final kind depends on their edges.
    pub fn is_rectangle_origin(&self) -> bool {
        matches!(
            self,
            NodeType::Note | NodeType::Calculate | NodeType::Diagnosis
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity carried by a diagnosis node, from the fill colour of its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisSeverity {
    Severe,
    Moderate,
    Benign,
}

/// Number kind of a consolidated numeric question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericSubtype {
    Integer,
    Decimal,
}

/// A question, decision or annotation in the diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    id: Id,
    #[serde(rename = "type")]
    node_type: NodeType,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<Geometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<Id>,
    /// Option labels a list keeps once its option nodes are flattened away.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    choices: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    metadata: IndexMap<String, String>,
    #[serde(skip)]
    style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<DiagnosisSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtype: Option<NumericSubtype>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_heading: Option<String>,
}

impl Node {
    pub fn new(id: Id, node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            id,
            node_type,
            label: label.into(),
            geometry: None,
            group: None,
            parent: None,
            options: Vec::new(),
            choices: Vec::new(),
            metadata: IndexMap::new(),
            style: Style::default(),
            severity: None,
            subtype: None,
            help_text: None,
            hint_text: None,
            group_heading: None,
        }
    }

    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_geometry(mut self, geometry: Option<Geometry>) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_group(mut self, group: Option<Id>) -> Self {
        self.group = group;
        self
    }

    /// Sets the owning list of a `SelectOption`.
    pub fn with_parent(mut self, parent: Option<Id>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_options(mut self, options: Vec<Id>) -> Self {
        self.options = options;
        self
    }

    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_metadata(mut self, metadata: IndexMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_severity(mut self, severity: Option<DiagnosisSeverity>) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_subtype(mut self, subtype: Option<NumericSubtype>) -> Self {
        self.subtype = subtype;
        self
    }

    pub fn with_help_text(mut self, text: Option<String>) -> Self {
        self.help_text = text;
        self
    }

    pub fn with_hint_text(mut self, text: Option<String>) -> Self {
        self.hint_text = text;
        self
    }

    pub fn with_group_heading(mut self, heading: Option<String>) -> Self {
        self.group_heading = heading;
        self
    }

    /// Appends an option id, keeping document order.
    pub fn push_option(&mut self, option: Id) {
        self.options.push(option);
    }

    /// Replaces option `option` by its label once the option node is gone.
    pub fn flatten_option(&mut self, option: Id, label: impl Into<String>) {
        self.options.retain(|id| *id != option);
        self.choices.push(label.into());
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    pub fn group(&self) -> Option<Id> {
        self.group
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn options(&self) -> &[Id] {
        &self.options
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn metadata(&self) -> &IndexMap<String, String> {
        &self.metadata
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn severity(&self) -> Option<DiagnosisSeverity> {
        self.severity
    }

    pub fn subtype(&self) -> Option<NumericSubtype> {
        self.subtype
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    pub fn hint_text(&self) -> Option<&str> {
        self.hint_text.as_deref()
    }

    pub fn group_heading(&self) -> Option<&str> {
        self.group_heading.as_deref()
    }

    /// The author-assigned `name` attribute, used by decision points and
    /// gotos to refer to other nodes.
    pub fn name(&self) -> Option<&str> {
        self.metadata
            .get("name")
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    /// Help and hint boxes, and the green or grey rectangles that
    /// consolidation may turn into them.
    pub fn is_annotation(&self) -> bool {
        match self.node_type {
            NodeType::Help | NodeType::Hint => true,
            node_type if node_type.is_rectangle_origin() => matches!(
                ColorClass::of_style(&self.style),
                Some(ColorClass::Green | ColorClass::Grey)
            ),
            _ => false,
        }
    }
}

/// Reads a yes/no answer label, ignoring case and surrounding whitespace.
pub fn parse_answer(label: &str) -> Option<bool> {
    match label.trim().to_ascii_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    id: Id,
    source: Id,
    target: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logic: Option<LogicExpr>,
    #[serde(skip)]
    style: Style,
}

impl Edge {
    pub fn new(id: Id, source: Id, target: Id) -> Self {
        Self {
            id,
            source,
            target,
            label: None,
            logic: None,
            style: Style::default(),
        }
    }

    /// Sets the label; blank labels are stored as `None`.
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label.filter(|text| !text.trim().is_empty());
        self
    }

    pub fn with_logic(mut self, logic: Option<LogicExpr>) -> Self {
        self.logic = logic;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_source(mut self, source: Id) -> Self {
        self.source = source;
        self
    }

    pub fn with_target(mut self, target: Id) -> Self {
        self.target = target;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn logic(&self) -> Option<&LogicExpr> {
        self.logic.as_ref()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    /// `Some(true)` for a "Yes" edge, `Some(false)` for a "No" edge.
    pub fn answer(&self) -> Option<bool> {
        self.label.as_deref().and_then(parse_answer)
    }
}

/// A labelled container of nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    id: Id,
    label: String,
    members: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<Geometry>,
}

impl Group {
    pub fn new(id: Id, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            members: Vec::new(),
            geometry: None,
        }
    }

    pub fn with_geometry(mut self, geometry: Option<Geometry>) -> Self {
        self.geometry = geometry;
        self
    }

    /// Adds a member, ignoring ids that are already present.
    pub fn add_member(&mut self, node: Id) {
        if !self.members.contains(&node) {
            self.members.push(node);
        }
    }

    pub fn remove_member(&mut self, node: Id) {
        self.members.retain(|member| *member != node);
    }

    pub fn sort_members_by_key<K: Ord>(&mut self, key: impl FnMut(&Id) -> K) {
        self.members.sort_by_key(key);
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn members(&self) -> &[Id] {
        &self.members
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }
}
