//! # Graph Store
//!
//! The one shared, contended resource of the process. Every node, every
//! adjacency set and every lifecycle field lives inside a single
//! `parking_lot::Mutex<GraphData>`.
//!
//! ## Locking discipline
//!
//! - Any operation that reads more than one field, or performs more than one
//!   related read/write, holds the guard for the whole operation.
//! - Find-by-name followed by insert happens under one guard. Splitting it
//!   reintroduces the duplicate-node race.
//! - The guard is never held across an `.await` or any network I/O.
//!
//! Convenience methods on `GraphStore` each take the lock exactly once.
//! Multi-step callers use `lock()` and work on `GraphData` directly.

pub mod graph;

use parking_lot::{Mutex, MutexGuard};

use crate::model::*;
use crate::Result;

pub use graph::GraphData;

// ============================================================================
// GraphStore
// ============================================================================

/// The shared graph plus its lock.
pub struct GraphStore {
    inner: Mutex<GraphData>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self { inner: Mutex::new(GraphData::new()) }
    }

    /// Acquire the graph lock. Released when the guard drops, on every exit
    /// path.
    pub fn lock(&self) -> MutexGuard<'_, GraphData> {
        self.inner.lock()
    }

    /// Insert a fresh node. Fails if the name is already live.
    pub fn add_node(&self, name: impl Into<String>, position: Vec2) -> Result<NodeId> {
        self.lock().add_node(name, position)
    }

    /// Return the live node with this name, creating it if absent.
    pub fn find_or_add(&self, name: &str, position: Vec2) -> NodeId {
        let mut graph = self.lock();
        match graph.find_by_name(name) {
            Some(id) => id,
            None => graph.insert_unchecked(name, position),
        }
    }

    /// Mirror an edge between two live nodes. Returns whether it was new.
    pub fn connect(&self, a: NodeId, b: NodeId) -> Result<bool> {
        self.lock().connect(a, b)
    }

    /// Destroy every node and start a new generation.
    pub fn remove_all(&self) {
        let mut graph = self.lock();
        let dropped = graph.len();
        graph.clear();
        tracing::debug!(dropped, generation = graph.generation(), "graph cleared");
    }

    /// Snapshot of every live node, sorted by handle.
    pub fn iterate_nodes(&self) -> Vec<NodeView> {
        let graph = self.lock();
        let mut views: Vec<NodeView> = graph.iter().map(NodeView::from).collect();
        views.sort_by_key(|v| v.id);
        views
    }

    pub fn node(&self, id: NodeId) -> Option<NodeView> {
        self.lock().node(id).map(NodeView::from)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.lock().find_by_name(name)
    }

    /// Layout write-back. Pinned nodes keep their position.
    pub fn set_position(&self, id: NodeId, position: Vec2) -> Result<bool> {
        let mut graph = self.lock();
        let node = graph.node_mut(id).ok_or(crate::Error::NodeNotFound(id))?;
        if node.pinned {
            return Ok(false);
        }
        node.position = position;
        Ok(true)
    }

    pub fn node_count(&self) -> usize {
        self.lock().len()
    }

    pub fn edge_count(&self) -> usize {
        self.lock().edge_count()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_remove_all_starts_new_generation() {
        let store = GraphStore::new();
        let a = store.add_node("a", Vec2::ZERO).unwrap();
        let b = store.add_node("b", Vec2::ZERO).unwrap();
        store.connect(a, b).unwrap();

        store.remove_all();

        assert_eq!(store.node_count(), 0);
        assert_eq!(store.edge_count(), 0);
        assert_eq!(store.generation(), 1);
        assert!(store.node(a).is_none());

        // Names are free again, handles are not reused
        let a2 = store.add_node("a", Vec2::ZERO).unwrap();
        assert_ne!(a, a2);
    }

    #[test]
    fn test_pinned_node_ignores_layout() {
        let store = GraphStore::new();
        let a = store.add_node("a", Vec2::ZERO).unwrap();
        store.lock().node_mut(a).unwrap().pinned = true;

        assert!(!store.set_position(a, Vec2::new(5.0, 5.0)).unwrap());
        assert_eq!(store.node(a).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_concurrent_find_or_add_creates_one_node() {
        let store = Arc::new(GraphStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.find_or_add("shared", Vec2::ZERO))
            })
            .collect();

        let ids: Vec<NodeId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.node_count(), 1);
    }
}
