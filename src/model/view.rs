//! Draw-time snapshot of a node.

use serde::{Deserialize, Serialize};
use super::{Node, NodeId, NodeState, NodeStyle, Vec2};

/// Owned copy of everything the renderer needs from one node, taken under
/// the store lock so a frame never observes a half-applied edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: NodeId,
    pub name: String,
    pub position: Vec2,
    pub pinned: bool,
    pub style: NodeStyle,
    pub state: NodeState,
    pub degree_hint: usize,
    /// Sorted for stable output.
    pub neighbors: Vec<NodeId>,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        let mut neighbors: Vec<NodeId> = node.neighbors().collect();
        neighbors.sort();
        Self {
            id: node.id,
            name: node.name.clone(),
            position: node.position,
            pinned: node.pinned,
            style: node.style.clone(),
            state: node.state,
            degree_hint: node.degree_hint,
            neighbors,
        }
    }
}
