use log::debug;

use triage_core::{
    identifier::Id,
    logic::LogicExpr,
    semantic::{Diagram, Edge, Node, NodeType},
};
use triage_parser::error::{Diagnostic, ErrorCode, Location, ParseError};

use super::{Pass, PassContext};

/// Replaces each decision point by direct edges.
///
/// For incoming edges `I` and outgoing edges `O` of a decision point, every
/// pair `(i, o)` becomes an edge `i.source → o.target` with id
/// `<i.id>::<o.id>`, the label of `o` and the logic `AND(i.logic, o.logic)`.
/// The decision point and its edges are removed, so `|I| × |O|` edges replace
/// `|I| + |O|`.
///
/// Decision points missing incoming or outgoing edges are kept and reported.
pub struct EliminateDecisionPoints;

impl Pass for EliminateDecisionPoints {
    fn name(&self) -> &'static str {
        "eliminate_decision_points"
    }

    fn apply(&self, diagram: &Diagram, cx: &mut PassContext<'_>) -> Result<Diagram, ParseError> {
        let mut next = diagram.clone();

        let decisions: Vec<Id> = diagram
            .nodes()
            .filter(|node| node.node_type() == NodeType::DecisionPoint)
            .map(Node::id)
            .collect();

        for decision in decisions {
            let incoming: Vec<Edge> = next
                .incoming(decision)
                .filter(|edge| edge.source() != decision)
                .cloned()
                .collect();
            let outgoing: Vec<Edge> = next
                .outgoing(decision)
                .filter(|edge| edge.target() != decision)
                .cloned()
                .collect();

            if incoming.is_empty() || outgoing.is_empty() {
                cx.report(
                    Diagnostic::warning("decision point is not between two questions")
                        .with_code(ErrorCode::E404)
                        .with_location(Location::Node(decision))
                        .with_help("connect an arrow into the decision point and one out of it"),
                )?;
                continue;
            }

            next.remove_node(decision);
            for into in &incoming {
                for out in &outgoing {
                    next.push_edge(bypass(into, out));
                }
            }
            debug!(
                decision:%,
                incoming = incoming.len(),
                outgoing = outgoing.len();
                "Decision point eliminated"
            );
        }

        Ok(next)
    }
}

fn bypass(into: &Edge, out: &Edge) -> Edge {
    Edge::new(into.id().create_nested(out.id()), into.source(), out.target())
        .with_label(out.label().map(str::to_string))
        .with_logic(LogicExpr::conjoin(into.logic(), out.logic()))
        .with_style(out.style().clone())
}
