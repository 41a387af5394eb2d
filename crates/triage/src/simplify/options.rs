use log::debug;

use triage_core::{
    identifier::Id,
    logic::{Comparison, LogicExpr},
    semantic::{Diagram, Node, NodeType, parse_answer},
};
use triage_parser::error::ParseError;

use super::{Pass, PassContext};

/// Replaces option nodes by conditions on their list.
///
/// Every edge leaving an option leaves the list instead, with the option's
/// condition conjoined in front of its logic:
///
/// - `select_multiple`: `list in "<option>"`
/// - `select_one`: `list = "<option>"`
/// - `yes_no`: `list = true` or `list = false`
///
/// Edges into an option end at the list. The list keeps the option label in
/// its choices. Options whose list is gone are left for validation.
pub struct FlattenOptions;

impl Pass for FlattenOptions {
    fn name(&self) -> &'static str {
        "flatten_options"
    }

    fn apply(&self, diagram: &Diagram, _: &mut PassContext<'_>) -> Result<Diagram, ParseError> {
        let mut next = diagram.clone();

        for option in diagram.nodes() {
            if option.node_type() != NodeType::SelectOption {
                continue;
            }
            let Some(list) = option.parent().and_then(|parent| diagram.node(parent)) else {
                continue;
            };
            let Some(condition) = option_condition(list, option.label()) else {
                continue;
            };

            flatten(&mut next, option.id(), list.id(), &condition);
            if let Some(list) = next.node_mut(list.id()) {
                list.flatten_option(option.id(), option.label());
            }
            next.remove_node(option.id());
            debug!(option:% = option.id(), list:% = list.id(); "Option flattened");
        }

        Ok(next)
    }
}

fn option_condition(list: &Node, label: &str) -> Option<LogicExpr> {
    let list_id = list.id();
    let condition = match list.node_type() {
        NodeType::SelectMultiple => LogicExpr::condition(list_id, Comparison::In, label),
        NodeType::SelectOne => LogicExpr::condition(list_id, Comparison::Eq, label),
        NodeType::YesNo => match parse_answer(label) {
            Some(answer) => LogicExpr::condition(list_id, Comparison::Eq, answer),
            None => LogicExpr::condition(list_id, Comparison::Eq, label),
        },
        _ => return None,
    };
    Some(condition)
}

fn flatten(diagram: &mut Diagram, option: Id, list: Id, condition: &LogicExpr) {
    let edges = diagram
        .edges()
        .iter()
        .map(|edge| {
            let mut edge = edge.clone();
            if edge.source() == option {
                let logic = LogicExpr::conjoin(Some(condition), edge.logic());
                edge = edge.with_source(list).with_logic(logic);
            }
            if edge.target() == option {
                edge = edge.with_target(list);
            }
            edge
        })
        .filter(|edge| edge.source() != edge.target())
        .collect();
    diagram.set_edges(edges);
}
