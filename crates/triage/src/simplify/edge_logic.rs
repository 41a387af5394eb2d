use triage_core::semantic::Diagram;
use triage_parser::error::ParseError;

use super::{Pass, PassContext};
use crate::logic::edge_logic;

/// Gives every edge without logic the logic its source implies.
///
/// Edges that already carry logic, from option flattening or an earlier
/// rewrite, keep it.
pub struct AssignEdgeLogic;

impl Pass for AssignEdgeLogic {
    fn name(&self) -> &'static str {
        "assign_edge_logic"
    }

    fn apply(&self, diagram: &Diagram, cx: &mut PassContext<'_>) -> Result<Diagram, ParseError> {
        let mut edges = Vec::with_capacity(diagram.edges().len());
        for edge in diagram.edges() {
            let edge = match edge.logic() {
                Some(_) => edge.clone(),
                None => {
                    let logic = edge_logic(diagram, edge, cx)?;
                    edge.clone().with_logic(logic)
                }
            };
            edges.push(edge);
        }

        let mut next = diagram.clone();
        next.set_edges(edges);
        Ok(next)
    }
}
