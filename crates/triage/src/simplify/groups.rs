use triage_core::semantic::Diagram;
use triage_parser::error::ParseError;

use super::{Pass, PassContext};

/// Copies the label of each group onto its members as their heading.
pub struct AnnotateGroups;

impl Pass for AnnotateGroups {
    fn name(&self) -> &'static str {
        "annotate_groups"
    }

    fn apply(&self, diagram: &Diagram, _: &mut PassContext<'_>) -> Result<Diagram, ParseError> {
        let mut next = diagram.clone();
        for group in diagram.groups() {
            let heading = Some(group.label().trim())
                .filter(|label| !label.is_empty())
                .map(str::to_string);
            for member in group.members() {
                if let Some(node) = next.node_mut(*member) {
                    *node = node.clone().with_group_heading(heading.clone());
                }
            }
        }
        Ok(next)
    }
}
