use log::debug;

use triage_core::{
    identifier::Id,
    semantic::{Diagram, Node, NodeType},
};
use triage_parser::error::ParseError;

use super::{Pass, PassContext};

/// Moves help and hint text onto the nodes it explains.
///
/// The label of a help (hint) node becomes the help (hint) text of every node
/// it points at; the annotation and its edges are removed. Text from several
/// annotations on one node is joined with a blank line. Annotations that
/// point at nothing are kept.
pub struct FoldAnnotations;

impl Pass for FoldAnnotations {
    fn name(&self) -> &'static str {
        "fold_annotations"
    }

    fn apply(&self, diagram: &Diagram, _: &mut PassContext<'_>) -> Result<Diagram, ParseError> {
        let mut next = diagram.clone();

        for annotation in diagram.nodes() {
            let is_help = match annotation.node_type() {
                NodeType::Help => true,
                NodeType::Hint => false,
                _ => continue,
            };
            let targets: Vec<Id> = diagram
                .outgoing(annotation.id())
                .map(|edge| edge.target())
                .filter(|target| *target != annotation.id())
                .collect();
            if targets.is_empty() {
                continue;
            }

            for target in &targets {
                if let Some(node) = next.node_mut(*target) {
                    *node = annotated(node.clone(), annotation.label(), is_help);
                }
            }
            next.remove_node(annotation.id());
            debug!(annotation:% = annotation.id(), targets = targets.len(); "Annotation folded");
        }

        Ok(next)
    }
}

fn annotated(node: Node, text: &str, is_help: bool) -> Node {
    let existing = if is_help { node.help_text() } else { node.hint_text() };
    let text = match existing {
        Some(existing) if !existing.is_empty() => format!("{existing}\n\n{text}"),
        _ => text.to_string(),
    };
    if is_help {
        node.with_help_text(Some(text))
    } else {
        node.with_hint_text(Some(text))
    }
}
