//! The [`Diagram`] arena.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    identifier::Id,
    semantic::{Edge, Group, Node, NodeType},
};

/// A resolved questionnaire page.
///
/// Nodes and groups are addressed by id and kept in document order; edges are
/// an ordered list referring to nodes by id. A `Diagram` is a plain value:
/// every rewrite step clones it and returns a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    page_id: String,
    #[serde(serialize_with = "serialize_values")]
    nodes: IndexMap<Id, Node>,
    edges: Vec<Edge>,
    #[serde(serialize_with = "serialize_values")]
    groups: IndexMap<Id, Group>,
}

fn serialize_values<S, T>(map: &IndexMap<Id, T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: Serialize,
{
    serializer.collect_seq(map.values())
}

impl Diagram {
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            nodes: IndexMap::new(),
            edges: Vec::new(),
            groups: IndexMap::new(),
        }
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: Id) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains_node(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.nodes.keys().copied()
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts a node, replacing any node with the same id in place.
    pub fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id(), node);
    }

    /// Removes a node together with every edge touching it and its group
    /// membership.
    pub fn remove_node(&mut self, id: Id) -> Option<Node> {
        let node = self.nodes.shift_remove(&id)?;
        self.edges
            .retain(|edge| edge.source() != id && edge.target() != id);
        if let Some(group) = node.group().and_then(|group| self.groups.get_mut(&group)) {
            group.remove_member(id);
        }
        Some(node)
    }

    /// Reorders nodes and group members by `key`, keeping the relative order
    /// of equal keys.
    pub fn sort_nodes_by_key<K: Ord>(&mut self, mut key: impl FnMut(&Id) -> K) {
        self.nodes.sort_by(|a, _, b, _| key(a).cmp(&key(b)));
        for group in self.groups.values_mut() {
            group.sort_members_by_key(&mut key);
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: Id) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id() == id)
    }

    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Replaces the whole edge list.
    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
    }

    pub fn retain_edges(&mut self, keep: impl FnMut(&Edge) -> bool) {
        self.edges.retain(keep);
    }

    /// Edges ending at `id`, in list order.
    pub fn incoming(&self, id: Id) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.target() == id)
    }

    /// Edges starting at `id`, in list order.
    pub fn outgoing(&self, id: Id) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.source() == id)
    }

    pub fn group(&self, id: Id) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn group_mut(&mut self, id: Id) -> Option<&mut Group> {
        self.groups.get_mut(&id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn contains_group(&self, id: Id) -> bool {
        self.groups.contains_key(&id)
    }

    pub fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.id(), group);
    }

    /// Finds the node an author-assigned `name` refers to.
    ///
    /// Decision points and gotos carry the name of what they refer to, so
    /// they are never themselves a match.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        let name = name.trim();
        self.nodes().find(|node| {
            !matches!(node.node_type(), NodeType::DecisionPoint | NodeType::Goto)
                && node.name().map(str::trim) == Some(name)
        })
    }

    /// Nodes with no incoming edges, in document order.
    pub fn entry_nodes(&self) -> Vec<Id> {
        self.nodes
            .keys()
            .copied()
            .filter(|id| self.incoming(*id).next().is_none())
            .collect()
    }
}
