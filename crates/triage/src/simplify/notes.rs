use log::debug;

use triage_core::{
    identifier::Id,
    logic::LogicExpr,
    semantic::{Diagram, Edge, NodeType},
};
use triage_parser::error::ParseError;

use super::{Pass, PassContext};

/// Joins chains of notes.
///
/// A note `a` whose only outgoing edge leads to a note `b`, where that edge
/// is also the only one into `b`, absorbs `b`: the labels are joined with a
/// blank line and the edges out of `b` leave `a`, with the logic of the
/// connecting edge conjoined in front.
pub struct MergeNotes;

impl Pass for MergeNotes {
    fn name(&self) -> &'static str {
        "merge_notes"
    }

    fn apply(&self, diagram: &Diagram, _: &mut PassContext<'_>) -> Result<Diagram, ParseError> {
        let mut next = diagram.clone();
        while let Some((first, link)) = mergeable_pair(&next) {
            merge(&mut next, first, &link);
        }
        Ok(next)
    }
}

/// The first note, in document order, that can absorb its successor.
fn mergeable_pair(diagram: &Diagram) -> Option<(Id, Edge)> {
    diagram
        .nodes()
        .filter(|node| node.node_type() == NodeType::Note)
        .find_map(|node| {
            let mut outgoing = diagram.outgoing(node.id());
            let link = outgoing.next()?;
            if outgoing.next().is_some() || link.target() == node.id() {
                return None;
            }

            let second = diagram.node(link.target())?;
            let single_incoming = diagram.incoming(second.id()).count() == 1;
            (second.node_type() == NodeType::Note && single_incoming)
                .then(|| (node.id(), link.clone()))
        })
}

fn merge(diagram: &mut Diagram, first: Id, link: &Edge) {
    let second = link.target();
    let Some(second_label) = diagram.node(second).map(|node| node.label().to_string()) else {
        return;
    };

    let edges = diagram
        .edges()
        .iter()
        .map(|edge| {
            if edge.source() == second {
                let logic = LogicExpr::conjoin(link.logic(), edge.logic());
                edge.clone().with_source(first).with_logic(logic)
            } else {
                edge.clone()
            }
        })
        .collect();
    diagram.set_edges(edges);

    if let Some(node) = diagram.node_mut(first) {
        let label = match (node.label().is_empty(), second_label.is_empty()) {
            (_, true) => node.label().to_string(),
            (true, false) => second_label,
            (false, false) => format!("{}\n\n{second_label}", node.label()),
        };
        *node = node.clone().with_label(label);
    }
    diagram.remove_node(second);
    debug!(first:%, second:%; "Notes merged");
}
