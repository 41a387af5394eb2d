use log::debug;

use triage_core::{
    identifier::Id,
    logic::LogicExpr,
    semantic::{Diagram, Node, NodeType},
};
use triage_parser::error::{Diagnostic, ErrorCode, Location, ParseError};

use super::{Pass, PassContext};

/// Routes edges through goto nodes straight to where the goto leads.
///
/// A goto with exactly one outgoing edge is removed and every edge into it
/// ends at that edge's target instead, with the two logics conjoined. A goto
/// without outgoing edges leads to the node its `name` refers to. Any other
/// goto is kept and reported.
pub struct FoldGotos;

impl Pass for FoldGotos {
    fn name(&self) -> &'static str {
        "fold_gotos"
    }

    fn apply(&self, diagram: &Diagram, cx: &mut PassContext<'_>) -> Result<Diagram, ParseError> {
        let mut next = diagram.clone();

        let gotos: Vec<Id> = diagram
            .nodes()
            .filter(|node| node.node_type() == NodeType::Goto)
            .map(Node::id)
            .collect();

        for goto in gotos {
            let Some(node) = next.node(goto) else {
                continue;
            };
            let Some((target, logic)) = destination(&next, node) else {
                cx.report(
                    Diagnostic::warning("goto does not lead to exactly one node")
                        .with_code(ErrorCode::E403)
                        .with_location(Location::Node(goto))
                        .with_help("draw one arrow out of the goto, or name the node it jumps to"),
                )?;
                continue;
            };

            let edges = next
                .edges()
                .iter()
                .filter(|edge| edge.source() != goto)
                .map(|edge| {
                    if edge.target() == goto {
                        let combined = LogicExpr::conjoin(edge.logic(), logic.as_ref());
                        edge.clone().with_target(target).with_logic(combined)
                    } else {
                        edge.clone()
                    }
                })
                .collect();
            next.set_edges(edges);
            next.remove_node(goto);
            debug!(goto:%, target:%; "Goto folded");
        }

        Ok(next)
    }
}

/// Where a goto leads, with the logic of the edge that leads there.
fn destination(diagram: &Diagram, goto: &Node) -> Option<(Id, Option<LogicExpr>)> {
    let outgoing: Vec<_> = diagram.outgoing(goto.id()).collect();
    match outgoing.as_slice() {
        [edge] if edge.target() != goto.id() => Some((edge.target(), edge.logic().cloned())),
        [] => goto
            .name()
            .and_then(|name| diagram.node_by_name(name))
            .map(|node| (node.id(), None)),
        _ => None,
    }
}
