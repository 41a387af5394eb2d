//! Edge logic: the condition under which an edge can be followed.

use log::trace;

use triage_core::{
    identifier::Id,
    logic::{Comparison, LogicExpr, Subject},
    semantic::{Diagram, Edge, Node, NodeType},
};
use triage_parser::{
    decision::{parse_bracketed_option, parse_numeric_condition},
    error::{Diagnostic, ErrorCode, Location, ParseError},
};

use crate::simplify::PassContext;

/// What a decision point compares against.
#[derive(Debug, Clone, Copy)]
enum Reference<'a> {
    Node(&'a Node),
    ExternalFlag,
    ExternalNumeric(Id),
}

/// Computes the logic of `edge` from the type of its source node.
///
/// | source          | logic                                      |
/// |-----------------|--------------------------------------------|
/// | `yes_no`        | `source = true` / `source = false`         |
/// | `decision_point`| comparison against the referenced question |
/// | anything else   | none                                       |
///
/// Option edges of lists get their logic when the options are flattened.
///
/// # Errors
///
/// Returns a [`ParseError`] when a finding about the decision point is one
/// the validation policy aborts on.
pub fn edge_logic(
    diagram: &Diagram,
    edge: &Edge,
    cx: &mut PassContext<'_>,
) -> Result<Option<LogicExpr>, ParseError> {
    let Some(source) = diagram.node(edge.source()) else {
        return Ok(None);
    };

    let logic = match source.node_type() {
        NodeType::YesNo => edge
            .answer()
            .map(|answer| LogicExpr::condition(source.id(), Comparison::Eq, answer)),
        NodeType::DecisionPoint => Some(decision_logic(diagram, source, edge, cx)?),
        _ => None,
    };

    if let Some(logic) = &logic {
        trace!(edge:% = edge.id(), logic:%; "Edge logic");
    }
    Ok(logic)
}

/// Logic of an edge leaving a decision point.
///
/// An unlabelled edge counts as the "yes" branch.
fn decision_logic(
    diagram: &Diagram,
    decision: &Node,
    edge: &Edge,
    cx: &mut PassContext<'_>,
) -> Result<LogicExpr, ParseError> {
    let yes = edge.answer() != Some(false);
    let label = decision.label();
    let name = decision.name().map(str::trim);

    let reference = match name {
        Some(name) => match diagram.node_by_name(name) {
            Some(node) => Some(Reference::Node(node)),
            None if cx.externals().is_flag(name) => Some(Reference::ExternalFlag),
            None if cx.externals().is_numeric(name) => {
                Some(Reference::ExternalNumeric(Id::new(name)))
            }
            None => None,
        },
        None => None,
    };

    let Some(reference) = reference else {
        cx.report(
            Diagnostic::error(match name {
                Some(name) => format!("decision point refers to `{name}`, which nothing defines"),
                None => "decision point does not name what it compares".to_string(),
            })
            .with_code(ErrorCode::E401)
            .with_location(Location::Node(decision.id()))
            .with_help("set `name` to the name of a question, or list it under `externals`"),
        )?;
        let subject = name.map_or(decision.id(), Id::new);
        return Ok(LogicExpr::condition(subject, Comparison::Eq, yes));
    };

    let logic = match reference {
        Reference::ExternalNumeric(subject) => {
            numeric_logic(subject, decision, yes, cx)?
        }
        Reference::ExternalFlag => flag_logic(label, yes),
        Reference::Node(node) => match node.node_type() {
            node_type if node_type.is_numeric() => numeric_logic(node.id(), decision, yes, cx)?,
            node_type if node_type.is_flag_like() => flag_logic(label, yes),
            NodeType::SelectMultiple => match parse_bracketed_option(label) {
                Some(option) => {
                    let contains = LogicExpr::condition(node.id(), Comparison::In, option);
                    if yes { contains } else { LogicExpr::not(contains) }
                }
                None => {
                    report_unparsable(decision, "does not name an option in [brackets]", cx)?;
                    LogicExpr::condition(node.id(), Comparison::Eq, yes)
                }
            },
            NodeType::SelectOne => {
                let option = parse_bracketed_option(label).unwrap_or(label.trim());
                let operation = if yes { Comparison::Eq } else { Comparison::Ne };
                LogicExpr::condition(node.id(), operation, option)
            }
            _ => LogicExpr::condition(node.id(), Comparison::Eq, yes),
        },
    };
    Ok(logic)
}

fn numeric_logic(
    subject: Id,
    decision: &Node,
    yes: bool,
    cx: &mut PassContext<'_>,
) -> Result<LogicExpr, ParseError> {
    let Some((comparison, value)) = parse_numeric_condition(decision.label()) else {
        report_unparsable(decision, "has no comparison such as `>= 38.5`", cx)?;
        return Ok(LogicExpr::condition(subject, Comparison::Eq, yes));
    };

    let logic = match (yes, comparison.negate()) {
        (true, _) => LogicExpr::condition(subject, comparison, value),
        (false, Some(negated)) => LogicExpr::condition(subject, negated, value),
        (false, None) => LogicExpr::not(LogicExpr::condition(subject, comparison, value)),
    };
    Ok(logic)
}

fn flag_logic(label: &str, yes: bool) -> LogicExpr {
    let raised = LogicExpr::condition(Subject::Flags, Comparison::In, label.trim());
    if yes { raised } else { LogicExpr::not(raised) }
}

fn report_unparsable(
    decision: &Node,
    problem: &str,
    cx: &mut PassContext<'_>,
) -> Result<(), ParseError> {
    cx.report(
        Diagnostic::warning(format!(
            "decision label `{}` {problem}",
            decision.label()
        ))
        .with_code(ErrorCode::E402)
        .with_location(Location::Node(decision.id())),
    )
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use triage_parser::validate::{ValidationLevel, Validator};

    use super::*;
    use crate::config::ExternalsConfig;

    fn named(id: &str, node_type: NodeType, label: &str, name: &str) -> Node {
        let mut metadata = IndexMap::new();
        metadata.insert("name".to_string(), name.to_string());
        Node::new(Id::new(id), node_type, label).with_metadata(metadata)
    }

    fn branch(decision: &str, answer: &str) -> Edge {
        Edge::new(Id::new("e"), Id::new(decision), Id::new("next"))
            .with_label(Some(answer.to_string()))
    }

    fn logic_with(
        diagram: &Diagram,
        edge: &Edge,
        externals: &ExternalsConfig,
        validator: &mut Validator,
    ) -> Result<Option<LogicExpr>, ParseError> {
        let mut cx = PassContext::new(validator, externals);
        edge_logic(diagram, edge, &mut cx)
    }

    fn logic(diagram: &Diagram, edge: &Edge) -> Option<LogicExpr> {
        let mut validator = Validator::new(ValidationLevel::Strict);
        logic_with(diagram, edge, &ExternalsConfig::default(), &mut validator).unwrap()
    }

    fn decision_on(target: Node, label: &str) -> Diagram {
        let mut diagram = Diagram::new("p");
        let name = target.name().unwrap_or_default().to_string();
        diagram.insert_node(target);
        diagram.insert_node(named("d", NodeType::DecisionPoint, label, &name));
        diagram
    }

    #[test]
    fn test_yes_no_edges() {
        let mut diagram = Diagram::new("p");
        diagram.insert_node(Node::new(Id::new("q"), NodeType::YesNo, "Fever?"));

        let yes = Edge::new(Id::new("e"), Id::new("q"), Id::new("n")).with_label(Some("Yes".into()));
        assert_eq!(
            logic(&diagram, &yes),
            Some(LogicExpr::condition(Id::new("q"), Comparison::Eq, true))
        );

        let unlabelled = Edge::new(Id::new("e"), Id::new("q"), Id::new("n"));
        assert_eq!(logic(&diagram, &unlabelled), None);
    }

    #[test]
    fn test_unconditioned_sources() {
        for node_type in [NodeType::Note, NodeType::Flag, NodeType::Numeric, NodeType::Text] {
            let mut diagram = Diagram::new("p");
            diagram.insert_node(Node::new(Id::new("s"), node_type, "S"));
            let edge = Edge::new(Id::new("e"), Id::new("s"), Id::new("n"))
                .with_label(Some("yes".into()));
            assert_eq!(logic(&diagram, &edge), None, "{node_type}");
        }
    }

    #[test]
    fn test_numeric_reference() {
        let diagram = decision_on(
            named("t", NodeType::Numeric, "Temperature", "temp"),
            "Temperature >= 38.5",
        );
        let t = Id::new("t");

        assert_eq!(
            logic(&diagram, &branch("d", "Yes")),
            Some(LogicExpr::condition(t, Comparison::Ge, 38.5))
        );
        assert_eq!(
            logic(&diagram, &branch("d", "No")),
            Some(LogicExpr::condition(t, Comparison::Lt, 38.5))
        );
    }

    #[test]
    fn test_numeric_double_equals_negates_to_not_equal() {
        let diagram = decision_on(named("n", NodeType::NumericInteger, "Count", "count"), "count == 3");
        assert_eq!(
            logic(&diagram, &branch("d", "no")),
            Some(LogicExpr::condition(Id::new("n"), Comparison::Ne, 3.0))
        );
    }

    #[test]
    fn test_unparsable_numeric_label_warns_and_falls_back() {
        let diagram = decision_on(named("a", NodeType::Numeric, "Age", "age"), "Is an adult?");
        let mut validator = Validator::new(ValidationLevel::Strict);

        let logic = logic_with(
            &diagram,
            &branch("d", "No"),
            &ExternalsConfig::default(),
            &mut validator,
        )
        .unwrap();

        assert_eq!(logic, Some(LogicExpr::condition(Id::new("a"), Comparison::Eq, false)));
        assert_eq!(validator.findings()[0].code(), Some(ErrorCode::E402));
    }

    #[test]
    fn test_select_multiple_reference() {
        let diagram = decision_on(
            named("s", NodeType::SelectMultiple, "Symptoms", "symptoms"),
            "Has [Fever]?",
        );
        let contains = LogicExpr::condition(Id::new("s"), Comparison::In, "Fever");

        assert_eq!(logic(&diagram, &branch("d", "Yes")), Some(contains.clone()));
        assert_eq!(logic(&diagram, &branch("d", "No")), Some(LogicExpr::not(contains)));
    }

    #[test]
    fn test_select_one_reference() {
        let diagram = decision_on(named("s", NodeType::SelectOne, "Sex", "sex"), "[Female]");
        let s = Id::new("s");

        assert_eq!(
            logic(&diagram, &branch("d", "Yes")),
            Some(LogicExpr::condition(s, Comparison::Eq, "Female"))
        );
        assert_eq!(
            logic(&diagram, &branch("d", "No")),
            Some(LogicExpr::condition(s, Comparison::Ne, "Female"))
        );
    }

    #[test]
    fn test_yes_no_reference() {
        let diagram = decision_on(named("q", NodeType::YesNo, "Pregnant?", "preg"), "Pregnant");
        assert_eq!(
            logic(&diagram, &branch("d", "No")),
            Some(LogicExpr::condition(Id::new("q"), Comparison::Eq, false))
        );
    }

    #[test]
    fn test_flag_reference() {
        let diagram = decision_on(named("f", NodeType::Flag, "High risk", "risk"), "High risk");
        let raised = LogicExpr::condition(Subject::Flags, Comparison::In, "High risk");

        assert_eq!(logic(&diagram, &branch("d", "Yes")), Some(raised.clone()));
        assert_eq!(logic(&diagram, &branch("d", "No")), Some(LogicExpr::not(raised)));
    }

    #[test]
    fn test_external_references() {
        let mut diagram = Diagram::new("p");
        diagram.insert_node(named("d1", NodeType::DecisionPoint, "age > 65", "age"));
        diagram.insert_node(named("d2", NodeType::DecisionPoint, "Pregnant", "pregnant"));
        let externals = ExternalsConfig::new(["pregnant"], ["age"]);
        let mut validator = Validator::new(ValidationLevel::Strict);

        let age = logic_with(&diagram, &branch("d1", "Yes"), &externals, &mut validator).unwrap();
        assert_eq!(age, Some(LogicExpr::condition(Id::new("age"), Comparison::Gt, 65.0)));

        let pregnant =
            logic_with(&diagram, &branch("d2", "Yes"), &externals, &mut validator).unwrap();
        assert_eq!(
            pregnant,
            Some(LogicExpr::condition(Subject::Flags, Comparison::In, "Pregnant"))
        );
        assert!(validator.findings().is_empty());
    }

    #[test]
    fn test_unresolved_reference() {
        let mut diagram = Diagram::new("p");
        diagram.insert_node(named("d", NodeType::DecisionPoint, "weight > 3", "weight"));

        let mut strict = Validator::new(ValidationLevel::Strict);
        let err = logic_with(&diagram, &branch("d", "Yes"), &ExternalsConfig::default(), &mut strict)
            .unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E401));

        let mut lenient = Validator::new(ValidationLevel::Lenient);
        let logic = logic_with(&diagram, &branch("d", "Yes"), &ExternalsConfig::default(), &mut lenient)
            .unwrap();
        assert_eq!(
            logic,
            Some(LogicExpr::condition(Id::new("weight"), Comparison::Eq, true))
        );
    }
}
