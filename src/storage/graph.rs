//! The data behind the graph lock.
//!
//! `GraphData` is only reachable through `GraphStore::lock()`, so every
//! method here runs with the lock held.

use hashbrown::HashMap;

use crate::model::*;
use crate::{Error, Result};

/// Node table, name index and generation counter.
pub struct GraphData {
    nodes: HashMap<NodeId, Node>,
    /// name → handle; one entry per live node
    by_name: HashMap<String, NodeId>,
    next_id: u64,
    generation: u64,
}

impl GraphData {
    pub(crate) fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            by_name: HashMap::new(),
            next_id: 1,
            generation: 0,
        }
    }

    // ========================================================================
    // Node CRUD
    // ========================================================================

    /// Insert a node under a fresh handle. Fails if the name is live.
    pub fn add_node(&mut self, name: impl Into<String>, position: Vec2) -> Result<NodeId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }
        Ok(self.insert_unchecked(&name, position))
    }

    /// Caller has already checked `find_by_name(name).is_none()` under the
    /// same guard.
    pub(crate) fn insert_unchecked(&mut self, name: &str, position: Vec2) -> NodeId {
        debug_assert!(!self.by_name.contains_key(name));
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.by_name.insert(name.to_string(), id);
        self.nodes.insert(id, Node::new(id, name, position));
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node. The only way nodes are ever destroyed.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.by_name.clear();
        self.generation += 1;
    }

    /// Number of resets so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Add the undirected edge `a - b` to both adjacency sets. Returns
    /// whether the edge was new.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        if !self.nodes.contains_key(&a) {
            return Err(Error::NodeNotFound(a));
        }
        if !self.nodes.contains_key(&b) {
            return Err(Error::NodeNotFound(b));
        }

        let mut added = false;
        if let Some(node) = self.nodes.get_mut(&a) {
            added |= node.adjacency.insert(b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            added |= node.adjacency.insert(a);
        }
        Ok(added)
    }

    pub fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes.get(&a).is_some_and(|n| n.is_adjacent(b))
    }

    /// Undirected edge count. A self-loop counts once.
    pub fn edge_count(&self) -> usize {
        let mut loops = 0;
        let mut ends = 0;
        for node in self.nodes.values() {
            for other in node.neighbors() {
                if other == node.id { loops += 1 } else { ends += 1 }
            }
        }
        ends / 2 + loops
    }

    /// Check the mirrored-edge invariant over the whole graph.
    pub fn edges_are_mirrored(&self) -> bool {
        self.nodes.values().all(|node| {
            node.neighbors().all(|other| {
                self.nodes.get(&other).is_some_and(|n| n.is_adjacent(node.id))
            })
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_find_node() {
        let mut g = GraphData::new();
        let id = g.add_node("Ada", Vec2::new(1.0, 1.0)).unwrap();

        assert_eq!(g.find_by_name("Ada"), Some(id));
        assert_eq!(g.node(id).unwrap().name, "Ada");
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut g = GraphData::new();
        g.add_node("Ada", Vec2::ZERO).unwrap();

        let err = g.add_node("Ada", Vec2::ZERO).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(n) if n == "Ada"));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_connect_is_mirrored_and_idempotent() {
        let mut g = GraphData::new();
        let a = g.add_node("a", Vec2::ZERO).unwrap();
        let b = g.add_node("b", Vec2::ZERO).unwrap();

        assert!(g.connect(a, b).unwrap());
        assert!(!g.connect(b, a).unwrap());

        assert!(g.are_connected(a, b));
        assert!(g.are_connected(b, a));
        assert_eq!(g.edge_count(), 1);
        assert!(g.edges_are_mirrored());
    }

    #[test]
    fn test_connect_missing_node() {
        let mut g = GraphData::new();
        let a = g.add_node("a", Vec2::ZERO).unwrap();

        assert!(matches!(g.connect(a, NodeId(99)), Err(Error::NodeNotFound(NodeId(99)))));
        assert_eq!(g.node(a).unwrap().degree(), 0);
    }

    #[test]
    fn test_self_loop_counts_once() {
        let mut g = GraphData::new();
        let a = g.add_node("a", Vec2::ZERO).unwrap();
        g.connect(a, a).unwrap();
        assert_eq!(g.edge_count(), 1);
        assert!(g.edges_are_mirrored());
    }
}
