//! Read-only graph view over a [`Diagram`].
//!
//! [`DiagramGraph`] indexes the incoming and outgoing edges of every node once,
//! and mirrors the diagram into a `petgraph` graph for the whole-graph
//! questions: topological order, cycles and reachability.
//!
//! Edges whose endpoints do not resolve are left out of the index; validation
//! reports them separately.

use std::collections::{HashMap, HashSet};

use petgraph::{
    algo::{tarjan_scc, toposort},
    graph::{DiGraph, NodeIndex},
    visit::Dfs,
};
use thiserror::Error;

use crate::{
    identifier::Id,
    semantic::{Diagram, Edge},
};

/// A cycle found while ordering the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cycle through node `{node}`")]
pub struct Cycle {
    /// A node that lies on the cycle.
    pub node: Id,
}

/// Indexed adjacency of a diagram.
#[derive(Debug)]
pub struct DiagramGraph<'a> {
    diagram: &'a Diagram,
    graph: DiGraph<Id, usize>,
    indices: HashMap<Id, NodeIndex>,
    incoming: HashMap<Id, Vec<usize>>,
    outgoing: HashMap<Id, Vec<usize>>,
}

impl<'a> DiagramGraph<'a> {
    pub fn new(diagram: &'a Diagram) -> Self {
        let mut graph = DiGraph::with_capacity(diagram.nodes_count(), diagram.edges().len());
        let mut indices = HashMap::with_capacity(diagram.nodes_count());
        for id in diagram.node_ids() {
            indices.insert(id, graph.add_node(id));
        }

        let mut incoming: HashMap<Id, Vec<usize>> = HashMap::new();
        let mut outgoing: HashMap<Id, Vec<usize>> = HashMap::new();
        for (position, edge) in diagram.edges().iter().enumerate() {
            let (Some(&source), Some(&target)) =
                (indices.get(&edge.source()), indices.get(&edge.target()))
            else {
                continue;
            };
            graph.add_edge(source, target, position);
            outgoing.entry(edge.source()).or_default().push(position);
            incoming.entry(edge.target()).or_default().push(position);
        }

        Self {
            diagram,
            graph,
            indices,
            incoming,
            outgoing,
        }
    }

    pub fn diagram(&self) -> &'a Diagram {
        self.diagram
    }

    /// Edges ending at `id`, in diagram order.
    pub fn incoming(&self, id: Id) -> impl Iterator<Item = &'a Edge> + '_ {
        self.edge_list(&self.incoming, id)
    }

    /// Edges starting at `id`, in diagram order.
    pub fn outgoing(&self, id: Id) -> impl Iterator<Item = &'a Edge> + '_ {
        self.edge_list(&self.outgoing, id)
    }

    fn edge_list<'s>(
        &'s self,
        index: &'s HashMap<Id, Vec<usize>>,
        id: Id,
    ) -> impl Iterator<Item = &'a Edge> + 's {
        let edges = self.diagram.edges();
        index
            .get(&id)
            .into_iter()
            .flatten()
            .map(move |position| &edges[*position])
    }

    pub fn in_degree(&self, id: Id) -> usize {
        self.incoming.get(&id).map_or(0, Vec::len)
    }

    pub fn out_degree(&self, id: Id) -> usize {
        self.outgoing.get(&id).map_or(0, Vec::len)
    }

    /// Nodes without incoming edges, in document order.
    pub fn roots(&self) -> Vec<Id> {
        self.diagram
            .node_ids()
            .filter(|id| self.in_degree(*id) == 0)
            .collect()
    }

    /// Nodes ordered so that every edge points forward.
    ///
    /// # Errors
    ///
    /// Returns the [`Cycle`] that prevents an order from existing.
    pub fn topological_order(&self) -> Result<Vec<Id>, Cycle> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|index| self.graph[index]).collect())
            .map_err(|cycle| Cycle {
                node: self.graph[cycle.node_id()],
            })
    }

    /// Every cycle in the diagram, as the node sets of its strongly connected
    /// components. Self-loops count as cycles.
    pub fn cycles(&self) -> Vec<Vec<Id>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => self.graph.contains_edge(*single, *single),
                _ => true,
            })
            .map(|component| {
                let mut ids: Vec<Id> = component.into_iter().map(|index| self.graph[index]).collect();
                ids.sort_by_key(|id| self.diagram.node_ids().position(|other| other == *id));
                ids
            })
            .collect()
    }

    /// Nodes reachable from any of `starts`, the starts included.
    pub fn reachable_from(&self, starts: &[Id]) -> HashSet<Id> {
        let mut reached = HashSet::new();
        for start in starts {
            let Some(&index) = self.indices.get(start) else {
                continue;
            };
            let mut dfs = Dfs::new(&self.graph, index);
            while let Some(next) = dfs.next(&self.graph) {
                reached.insert(self.graph[next]);
            }
        }
        reached
    }
}
