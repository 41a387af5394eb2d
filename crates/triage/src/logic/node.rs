//! Node logic: the condition under which a question is shown.

use indexmap::IndexMap;
use log::debug;

use triage_core::{
    graph::{Cycle, DiagramGraph},
    identifier::Id,
    logic::LogicExpr,
    semantic::Diagram,
};

/// Logic of every node, in topological order.
pub type NodeLogic = IndexMap<Id, LogicExpr>;

/// Derives the logic of every node from the logic of the edges into it.
///
/// A node without incoming edges is always shown. Any other node is shown
/// when one of its incoming edges is active and the source of that edge is
/// shown: `OR_i AND(edge_i.logic, logic(source_i))`. An edge without logic is
/// active whenever its source is shown.
///
/// # Errors
///
/// Returns the [`Cycle`] that prevents a topological order.
///
/// # Examples
///
/// ```
/// use triage::logic::derive_node_logic;
/// use triage_core::{
///     identifier::Id,
///     logic::LogicExpr,
///     semantic::{Diagram, Edge, Node, NodeType},
/// };
///
/// let mut diagram = Diagram::new("page");
/// for id in ["a", "b"] {
///     diagram.insert_node(Node::new(Id::new(id), NodeType::Note, id));
/// }
/// diagram.push_edge(Edge::new(Id::new("e"), Id::new("a"), Id::new("b")));
///
/// let logic = derive_node_logic(&diagram).unwrap();
/// assert!(logic[&Id::new("b")].is_always());
/// ```
pub fn derive_node_logic(diagram: &Diagram) -> Result<NodeLogic, Cycle> {
    let graph = DiagramGraph::new(diagram);
    let order = graph.topological_order()?;

    let mut logic = NodeLogic::with_capacity(order.len());
    for id in order {
        let mut alternatives = Vec::new();
        for edge in graph.incoming(id) {
            let source = logic
                .get(&edge.source())
                .cloned()
                .unwrap_or_else(LogicExpr::always);
            let path = match edge.logic() {
                Some(condition) => LogicExpr::and(vec![condition.clone(), source]),
                None => source,
            };
            alternatives.push(path);
        }

        let expr = if alternatives.is_empty() {
            LogicExpr::always()
        } else {
            LogicExpr::or(alternatives).simplify()
        };
        logic.insert(id, expr);
    }

    debug!(nodes = logic.len(); "Node logic derived");
    Ok(logic)
}

#[cfg(test)]
mod tests {
    use triage_core::{
        logic::Comparison,
        semantic::{Edge, Node, NodeType},
    };

    use super::*;

    fn diagram(nodes: &[&str], edges: &[(&str, &str, Option<LogicExpr>)]) -> Diagram {
        let mut diagram = Diagram::new("page");
        for id in nodes {
            diagram.insert_node(Node::new(Id::new(id), NodeType::YesNo, *id));
        }
        for (position, (source, target, logic)) in edges.iter().enumerate() {
            diagram.push_edge(
                Edge::new(
                    Id::new(&format!("e{position}")),
                    Id::new(source),
                    Id::new(target),
                )
                .with_logic(logic.clone()),
            );
        }
        diagram
    }

    fn answered(id: &str, value: bool) -> LogicExpr {
        LogicExpr::condition(Id::new(id), Comparison::Eq, value)
    }

    #[test]
    fn test_entry_is_always_shown() {
        let logic = derive_node_logic(&diagram(&["a"], &[])).unwrap();
        assert!(logic[&Id::new("a")].is_always());
    }

    #[test]
    fn test_chain_conjoins_edges() {
        let logic = derive_node_logic(&diagram(
            &["a", "b", "c"],
            &[
                ("a", "b", Some(answered("a", true))),
                ("b", "c", Some(answered("b", false))),
            ],
        ))
        .unwrap();

        assert_eq!(logic[&Id::new("b")], answered("a", true));
        assert_eq!(
            logic[&Id::new("c")],
            LogicExpr::and(vec![answered("b", false), answered("a", true)])
        );
    }

    #[test]
    fn test_two_incoming_edges_disjoin() {
        let logic = derive_node_logic(&diagram(
            &["a", "b", "c"],
            &[
                ("a", "c", Some(answered("a", true))),
                ("b", "c", Some(answered("b", true))),
            ],
        ))
        .unwrap();

        assert_eq!(
            logic[&Id::new("c")],
            LogicExpr::or(vec![answered("a", true), answered("b", true)])
        );
    }

    #[test]
    fn test_unconditioned_branch_absorbs() {
        let logic = derive_node_logic(&diagram(
            &["a", "b", "c"],
            &[
                ("a", "b", Some(answered("a", true))),
                ("a", "c", None),
                ("b", "c", None),
            ],
        ))
        .unwrap();

        assert!(logic[&Id::new("c")].is_always());
    }

    #[test]
    fn test_cycle_is_an_error() {
        let result = derive_node_logic(&diagram(
            &["a", "b"],
            &[("a", "b", None), ("b", "a", None)],
        ));
        assert!(result.is_err());
    }
}
