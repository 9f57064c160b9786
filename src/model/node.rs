//! Node in the live graph.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use super::{NodeStyle, Vec2};

/// Opaque node handle. Allocated monotonically and never reused, so a handle
/// from a previous graph generation never resolves after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Crawl lifecycle of a node.
///
/// Forward order is `Unfetched -> Fetching -> Fetched`. `Failed` is reached
/// from `Fetching` when discovery errors, and may go back to `Fetching` on an
/// explicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeState {
    #[default]
    Unfetched,
    Fetching,
    Fetched,
    Failed,
}

impl NodeState {
    /// Whether `self -> next` is a legal lifecycle edge.
    pub fn can_transition_to(self, next: NodeState) -> bool {
        matches!(
            (self, next),
            (NodeState::Unfetched, NodeState::Fetching)
                | (NodeState::Fetching, NodeState::Fetched)
                | (NodeState::Fetching, NodeState::Failed)
                | (NodeState::Failed, NodeState::Fetching)
        )
    }
}

/// A node in the live graph.
///
/// Adjacency and lifecycle fields are crate-private: adjacency is only
/// written through `GraphData::connect` (which mirrors both ends) and the
/// lifecycle only through the `lifecycle` module.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Display name; unique among the live nodes of one generation.
    pub name: String,
    pub position: Vec2,
    /// Exempt from automatic layout movement.
    pub pinned: bool,
    pub style: NodeStyle,
    pub(crate) adjacency: HashSet<NodeId>,
    pub(crate) state: NodeState,
    /// Discovered but not yet revealed neighbor names. Popped from the back.
    pub(crate) pending: Vec<String>,
    pub(crate) degree_hint: usize,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, position: Vec2) -> Self {
        let name = name.into();
        Self {
            id,
            style: NodeStyle::labelled(&name),
            name,
            position,
            pinned: false,
            adjacency: HashSet::new(),
            state: NodeState::Unfetched,
            pending: Vec::new(),
            degree_hint: 0,
        }
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.iter().copied()
    }

    pub fn is_adjacent(&self, other: NodeId) -> bool {
        self.adjacency.contains(&other)
    }

    pub fn degree(&self) -> usize {
        self.adjacency.len()
    }

    /// Total neighbors discovered, revealed or not.
    pub fn degree_hint(&self) -> usize {
        self.degree_hint
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }
}
