use std::collections::HashSet;

use triage_core::{
    semantic::{Diagram, Node, NodeType, NumericSubtype, parse_answer},
    shape::ColorClass,
};
use triage_parser::error::ParseError;

use super::{Pass, PassContext};

/// Settles node types.
///
/// Plain and rounded rectangles are refined on the first round of a run
/// only, in this order:
///
/// 1. every outgoing edge is labelled yes or no (and there is at least one):
///    `yes_no`;
/// 2. no incoming edges and a green fill: `help`; a grey fill: `hint`;
/// 3. `calculate` and `diagnosis` become `flag`, keeping their severity.
///
/// Later rounds leave rectangles as they are, since other passes rewire
/// their edges.
///
/// Lists whose options are exactly yes and no become `yes_no`, and the two
/// numeric kinds become `numeric` with a subtype.
pub struct ConsolidateTypes;

impl Pass for ConsolidateTypes {
    fn name(&self) -> &'static str {
        "consolidate_types"
    }

    fn apply(&self, diagram: &Diagram, cx: &mut PassContext<'_>) -> Result<Diagram, ParseError> {
        let refine_rectangles = cx.round() == 1;
        let mut next = diagram.clone();
        for node in diagram.nodes() {
            let Some(node_type) = consolidated_type(diagram, node, refine_rectangles) else {
                continue;
            };
            if let Some(target) = next.node_mut(node.id()) {
                *target = retyped(node.clone(), node_type);
            }
        }
        Ok(next)
    }
}

fn consolidated_type(diagram: &Diagram, node: &Node, refine_rectangles: bool) -> Option<NodeType> {
    let node_type = node.node_type();
    if node_type.is_rectangle_origin() {
        return refine_rectangles.then(|| rectangle_type(diagram, node));
    }

    match node_type {
        NodeType::SelectOne if has_yes_no_options(diagram, node) => Some(NodeType::YesNo),
        NodeType::NumericInteger | NodeType::NumericDecimal => Some(NodeType::Numeric),
        _ => None,
    }
}

fn rectangle_type(diagram: &Diagram, node: &Node) -> NodeType {
    let mut outgoing = diagram.outgoing(node.id()).peekable();
    let has_outgoing = outgoing.peek().is_some();
    if has_outgoing && outgoing.all(|edge| edge.answer().is_some()) {
        return NodeType::YesNo;
    }

    if diagram.incoming(node.id()).next().is_none() {
        match ColorClass::of_style(node.style()) {
            Some(ColorClass::Green) => return NodeType::Help,
            Some(ColorClass::Grey) => return NodeType::Hint,
            _ => {}
        }
    }

    match node.node_type() {
        NodeType::Calculate | NodeType::Diagnosis => NodeType::Flag,
        other => other,
    }
}

fn has_yes_no_options(diagram: &Diagram, list: &Node) -> bool {
    let answers: Vec<Option<bool>> = list
        .options()
        .iter()
        .filter_map(|option| diagram.node(*option))
        .map(|option| parse_answer(option.label()))
        .collect();
    let distinct: HashSet<Option<bool>> = answers.iter().copied().collect();

    answers.len() == 2 && distinct.len() == 2 && !distinct.contains(&None)
}

fn retyped(node: Node, node_type: NodeType) -> Node {
    let subtype = match node.node_type() {
        NodeType::NumericInteger => Some(NumericSubtype::Integer),
        NodeType::NumericDecimal => Some(NumericSubtype::Decimal),
        _ => node.subtype(),
    };
    let severity = match node_type {
        NodeType::Flag | NodeType::Diagnosis => node.severity(),
        _ => None,
    };
    node.with_node_type(node_type)
        .with_subtype(subtype)
        .with_severity(severity)
}

#[cfg(test)]
mod tests {
    use triage_core::{
        identifier::Id,
        semantic::{DiagnosisSeverity, Edge},
        style::Style,
    };
    use triage_parser::validate::{ValidationLevel, Validator};

    use super::*;
    use crate::config::ExternalsConfig;

    fn apply(diagram: &Diagram) -> Diagram {
        apply_in_round(diagram, 1)
    }

    fn apply_in_round(diagram: &Diagram, round: usize) -> Diagram {
        let mut validator = Validator::new(ValidationLevel::Strict);
        let externals = ExternalsConfig::default();
        let mut cx = PassContext::new(&mut validator, &externals);
        cx.set_round(round);
        ConsolidateTypes.apply(diagram, &mut cx).unwrap()
    }

    fn node_type(diagram: &Diagram, id: &str) -> NodeType {
        diagram.node(Id::new(id)).unwrap().node_type()
    }

    fn edge(id: &str, source: &str, target: &str, label: Option<&str>) -> Edge {
        Edge::new(Id::new(id), Id::new(source), Id::new(target))
            .with_label(label.map(str::to_string))
    }

    #[test]
    fn test_flag_consolidation_keeps_severity() {
        let mut diagram = Diagram::new("p");
        diagram.insert_node(Node::new(Id::new("start"), NodeType::Note, "Start"));
        diagram.insert_node(
            Node::new(Id::new("dx"), NodeType::Diagnosis, "Emergency")
                .with_severity(Some(DiagnosisSeverity::Severe)),
        );
        diagram.insert_node(Node::new(Id::new("calc"), NodeType::Calculate, "Score"));
        diagram.push_edge(edge("e1", "start", "dx", None));
        diagram.push_edge(edge("e2", "start", "calc", None));

        let result = apply(&diagram);

        let dx = result.node(Id::new("dx")).unwrap();
        assert_eq!(dx.node_type(), NodeType::Flag);
        assert_eq!(dx.severity(), Some(DiagnosisSeverity::Severe));
        assert_eq!(node_type(&result, "calc"), NodeType::Flag);
        assert_eq!(node_type(&result, "start"), NodeType::Note);
    }

    #[test]
    fn test_rectangle_with_yes_no_edges() {
        let mut diagram = Diagram::new("p");
        for id in ["q", "a", "b", "c"] {
            diagram.insert_node(Node::new(Id::new(id), NodeType::Note, id));
        }
        diagram.push_edge(edge("e1", "q", "a", Some("Yes")));
        diagram.push_edge(edge("e2", "q", "b", Some("no")));
        diagram.push_edge(edge("e3", "a", "c", Some("yes")));
        diagram.push_edge(edge("e4", "a", "b", Some("Maybe")));

        let result = apply(&diagram);

        assert_eq!(node_type(&result, "q"), NodeType::YesNo);
        assert_eq!(node_type(&result, "a"), NodeType::Note);
        assert_eq!(node_type(&result, "c"), NodeType::Note);
    }

    #[test]
    fn test_rectangles_settle_after_first_round() {
        let mut diagram = Diagram::new("p");
        for id in ["q", "a", "b"] {
            diagram.insert_node(Node::new(Id::new(id), NodeType::Note, id));
        }
        diagram.insert_node(
            Node::new(Id::new("green"), NodeType::Note, "Loose")
                .with_style(Style::parse("fillColor=#33cc33")),
        );
        diagram.insert_node(Node::new(Id::new("i"), NodeType::NumericInteger, "Count"));
        diagram.push_edge(edge("e1", "q", "a", Some("Yes")));
        diagram.push_edge(edge("e2", "q", "b", Some("No")));

        let result = apply_in_round(&diagram, 2);

        assert_eq!(node_type(&result, "q"), NodeType::Note);
        assert_eq!(node_type(&result, "green"), NodeType::Note);
        assert_eq!(node_type(&result, "i"), NodeType::Numeric);
    }

    #[test]
    fn test_help_and_hint_boxes() {
        let mut diagram = Diagram::new("p");
        diagram.insert_node(
            Node::new(Id::new("help"), NodeType::Note, "Explains")
                .with_style(Style::parse("fillColor=#33cc33")),
        );
        diagram.insert_node(
            Node::new(Id::new("hint"), NodeType::Calculate, "Hints")
                .with_style(Style::parse("rounded=1;fillColor=#999999")),
        );
        diagram.insert_node(
            Node::new(Id::new("fed"), NodeType::Note, "Green, but fed")
                .with_style(Style::parse("fillColor=#33cc33")),
        );
        diagram.insert_node(Node::new(Id::new("q"), NodeType::Note, "Question"));
        diagram.push_edge(edge("e1", "help", "q", None));
        diagram.push_edge(edge("e2", "hint", "q", None));
        diagram.push_edge(edge("e3", "q", "fed", None));

        let result = apply(&diagram);
        assert_eq!(node_type(&result, "help"), NodeType::Help);
        assert_eq!(node_type(&result, "hint"), NodeType::Hint);
        assert_eq!(node_type(&result, "fed"), NodeType::Note);
    }

    #[test]
    fn test_yes_no_list() {
        let mut diagram = Diagram::new("p");
        diagram.insert_node(
            Node::new(Id::new("l"), NodeType::SelectOne, "Smoker?")
                .with_options(vec![Id::new("y"), Id::new("n")]),
        );
        diagram.insert_node(Node::new(Id::new("y"), NodeType::SelectOption, "YES"));
        diagram.insert_node(Node::new(Id::new("n"), NodeType::SelectOption, "No"));
        diagram.insert_node(
            Node::new(Id::new("other"), NodeType::SelectOne, "Colour")
                .with_options(vec![Id::new("r")]),
        );
        diagram.insert_node(Node::new(Id::new("r"), NodeType::SelectOption, "Yes"));

        let result = apply(&diagram);

        assert_eq!(node_type(&result, "l"), NodeType::YesNo);
        assert_eq!(node_type(&result, "other"), NodeType::SelectOne);
    }

    #[test]
    fn test_numeric_subtypes() {
        let mut diagram = Diagram::new("p");
        diagram.insert_node(Node::new(Id::new("i"), NodeType::NumericInteger, "Count"));
        diagram.insert_node(Node::new(Id::new("d"), NodeType::NumericDecimal, "Weight"));

        let result = apply(&diagram);

        let integer = result.node(Id::new("i")).unwrap();
        assert_eq!(integer.node_type(), NodeType::Numeric);
        assert_eq!(integer.subtype(), Some(NumericSubtype::Integer));
        let decimal = result.node(Id::new("d")).unwrap();
        assert_eq!(decimal.subtype(), Some(NumericSubtype::Decimal));
    }

    #[test]
    fn test_consolidation_is_stable() {
        let mut diagram = Diagram::new("p");
        diagram.insert_node(Node::new(Id::new("i"), NodeType::NumericInteger, "Count"));
        diagram.insert_node(Node::new(Id::new("c"), NodeType::Calculate, "Score"));

        let once = apply(&diagram);
        assert_eq!(apply(&once), once);
    }
}
