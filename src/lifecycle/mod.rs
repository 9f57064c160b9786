//! # Node Lifecycle
//!
//! Per-node crawl state and the reveal-one step.
//!
//! ```text
//!   Unfetched ──activate──▶ Fetching ──discovery ok──▶ Fetched ──activate──▶ reveal_one
//!                              │  ▲
//!                  discovery err│  │activate (retry)
//!                              ▼  │
//!                             Failed
//! ```
//!
//! Every function here takes `&mut Node` or `&mut GraphData`, i.e. it can
//! only be called with the graph lock held.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::storage::GraphData;
use crate::{Error, Result};

/// Default distance between a revealed child and its source.
pub const SPAWN_DISTANCE: f64 = 7.0;

// ============================================================================
// Reveal policy
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealPolicy {
    /// When a pending name is already a live node: `true` draws an edge to
    /// it, `false` skips it and reveals the next pending name instead.
    pub reconnect_existing: bool,
    pub spawn_distance: f64,
}

impl Default for RevealPolicy {
    fn default() -> Self {
        Self { reconnect_existing: false, spawn_distance: SPAWN_DISTANCE }
    }
}

/// Outcome of a successful reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reveal {
    pub target: NodeId,
    /// `false` when an existing node was reconnected.
    pub created: bool,
}

// ============================================================================
// Transitions
// ============================================================================

fn transition(node: &mut Node, next: NodeState) -> Result<()> {
    if !node.state.can_transition_to(next) {
        return Err(Error::InvalidTransition { node: node.id, from: node.state, to: next });
    }
    tracing::trace!(node = %node.id, from = ?node.state, to = ?next, "lifecycle transition");
    node.state = next;
    Ok(())
}

/// `Unfetched | Failed -> Fetching`, with the loading marker.
pub fn begin_fetch(node: &mut Node) -> Result<()> {
    transition(node, NodeState::Fetching)?;
    node.style.font_color = Rgb::LOADING;
    Ok(())
}

/// `Fetching -> Fetched`. Installs the discovered names as pending and
/// returns the node's degree hint.
pub fn complete_fetch(node: &mut Node, neighbors: Vec<String>) -> Result<usize> {
    transition(node, NodeState::Fetched)?;
    node.degree_hint = neighbors.len();
    node.pending = neighbors;
    node.style.font_color = Rgb::WHITE;
    Ok(node.degree_hint)
}

/// `Fetching -> Failed`.
pub fn fail_fetch(node: &mut Node) -> Result<()> {
    transition(node, NodeState::Failed)?;
    node.style.font_color = Rgb::FAILED;
    Ok(())
}

// ============================================================================
// Reveal
// ============================================================================

/// Materialise one pending neighbor of `source`.
///
/// Pops names from the back of the pending queue until one produces an edge
/// or the queue runs dry. Lookup, create and connect all happen under the
/// caller's guard, so two sources revealing the same name concurrently end
/// up sharing a single node.
///
/// Returns `Ok(None)` when nothing was revealed.
pub fn reveal_one(graph: &mut GraphData, source: NodeId, policy: &RevealPolicy) -> Result<Option<Reveal>> {
    reveal_one_with(graph, source, policy, &mut rand::thread_rng())
}

pub fn reveal_one_with<R: Rng + ?Sized>(
    graph: &mut GraphData,
    source: NodeId,
    policy: &RevealPolicy,
    rng: &mut R,
) -> Result<Option<Reveal>> {
    loop {
        let node = graph.node_mut(source).ok_or(Error::NodeNotFound(source))?;
        let origin = node.position;
        let Some(name) = node.pending.pop() else {
            return Ok(None);
        };

        let (target, created) = match graph.find_by_name(&name) {
            Some(existing) if existing == source => continue,
            Some(_) if !policy.reconnect_existing => {
                tracing::trace!(%source, %name, "skipping already-live neighbor");
                continue;
            }
            Some(existing) => (existing, false),
            None => {
                let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                let position = origin + Vec2::from_polar(policy.spawn_distance, angle);
                (graph.insert_unchecked(&name, position), true)
            }
        };

        graph.connect(source, target)?;
        tracing::debug!(%source, %target, %name, created, "revealed neighbor");
        return Ok(Some(Reveal { target, created }));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fetched(graph: &mut GraphData, name: &str, neighbors: &[&str]) -> NodeId {
        let id = graph.add_node(name, Vec2::ZERO).unwrap();
        let node = graph.node_mut(id).unwrap();
        begin_fetch(node).unwrap();
        complete_fetch(node, neighbors.iter().map(|s| s.to_string()).collect()).unwrap();
        id
    }

    #[test]
    fn test_fetch_lifecycle_styles_font() {
        let mut graph = GraphData::new();
        let id = graph.add_node("a", Vec2::ZERO).unwrap();
        let node = graph.node_mut(id).unwrap();

        begin_fetch(node).unwrap();
        assert_eq!(node.state(), NodeState::Fetching);
        assert_eq!(node.style.font_color, Rgb::LOADING);

        let degree = complete_fetch(node, vec!["x".into(), "y".into()]).unwrap();
        assert_eq!(degree, 2);
        assert_eq!(node.state(), NodeState::Fetched);
        assert_eq!(node.style.font_color, Rgb::WHITE);
    }

    #[test]
    fn test_fetched_never_regresses() {
        let mut graph = GraphData::new();
        let id = fetched(&mut graph, "a", &[]);
        let node = graph.node_mut(id).unwrap();

        assert!(matches!(begin_fetch(node), Err(Error::InvalidTransition { .. })));
        assert!(matches!(fail_fetch(node), Err(Error::InvalidTransition { .. })));
        assert_eq!(node.state(), NodeState::Fetched);
    }

    #[test]
    fn test_failed_fetch_can_retry() {
        let mut graph = GraphData::new();
        let id = graph.add_node("a", Vec2::ZERO).unwrap();
        let node = graph.node_mut(id).unwrap();

        begin_fetch(node).unwrap();
        fail_fetch(node).unwrap();
        assert_eq!(node.state(), NodeState::Failed);
        assert_eq!(node.style.font_color, Rgb::FAILED);

        begin_fetch(node).unwrap();
        assert_eq!(node.state(), NodeState::Fetching);
    }

    #[test]
    fn test_reveal_creates_child_at_spawn_distance() {
        let mut graph = GraphData::new();
        let src = fetched(&mut graph, "a", &["b"]);
        let mut rng = StdRng::seed_from_u64(7);

        let reveal = reveal_one_with(&mut graph, src, &RevealPolicy::default(), &mut rng)
            .unwrap()
            .unwrap();

        assert!(reveal.created);
        let child = graph.node(reveal.target).unwrap();
        assert_eq!(child.name, "b");
        assert!((child.position.length() - SPAWN_DISTANCE).abs() < 1e-9);
        assert!(graph.are_connected(src, reveal.target));
        assert!(graph.edges_are_mirrored());
    }

    #[test]
    fn test_reveal_on_empty_queue_is_noop() {
        let mut graph = GraphData::new();
        let src = fetched(&mut graph, "a", &[]);

        assert_eq!(reveal_one(&mut graph, src, &RevealPolicy::default()).unwrap(), None);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node(src).unwrap().state(), NodeState::Fetched);
    }

    #[test]
    fn test_reveal_skips_existing_without_reconnect() {
        let mut graph = GraphData::new();
        let existing = graph.add_node("old", Vec2::ZERO).unwrap();
        // Popped from the back: "old" first, then "new"
        let src = fetched(&mut graph, "a", &["new", "old"]);

        let reveal = reveal_one(&mut graph, src, &RevealPolicy::default()).unwrap().unwrap();

        assert!(reveal.created);
        assert_eq!(graph.node(reveal.target).unwrap().name, "new");
        assert!(!graph.are_connected(src, existing));
        assert!(graph.node(src).unwrap().pending().is_empty());
    }

    #[test]
    fn test_reveal_reconnects_existing_when_enabled() {
        let mut graph = GraphData::new();
        let existing = graph.add_node("old", Vec2::ZERO).unwrap();
        let src = fetched(&mut graph, "a", &["old"]);
        let policy = RevealPolicy { reconnect_existing: true, ..RevealPolicy::default() };

        let reveal = reveal_one(&mut graph, src, &policy).unwrap().unwrap();

        assert_eq!(reveal, Reveal { target: existing, created: false });
        assert_eq!(graph.len(), 2);
        assert!(graph.are_connected(existing, src));
    }

    #[test]
    fn test_reveal_never_links_node_to_itself() {
        let mut graph = GraphData::new();
        let src = fetched(&mut graph, "a", &["a"]);
        let policy = RevealPolicy { reconnect_existing: true, ..RevealPolicy::default() };

        assert_eq!(reveal_one(&mut graph, src, &policy).unwrap(), None);
        assert_eq!(graph.edge_count(), 0);
    }
}
