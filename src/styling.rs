//! Degree-relative node styling.
//!
//! A fetched node's size and fill colour encode its discovered degree
//! relative to the highest degree seen so far: small and blue for
//! low-degree nodes, large and red for hubs. Pinned nodes are drawn green.

use crate::model::*;
use crate::storage::GraphData;

/// Radius of a node at `score == 0`.
const MIN_RADIUS: f64 = 8.0;
/// Extra radius at `score == 1`.
const RADIUS_RANGE: f64 = 20.0;

/// Apply the degree style to one node.
pub fn apply(node: &mut Node, highest_degree: usize) {
    let score = score(node.degree_hint, highest_degree);
    node.style.radius = (RADIUS_RANGE * score + MIN_RADIUS) as u32;
    node.style.color = if node.pinned { Rgb::PINNED } else { heat(score) };
}

/// Restyle every fetched node. Returns how many were touched.
pub fn restyle_all(graph: &mut GraphData, highest_degree: usize) -> usize {
    let mut touched = 0;
    for node in graph.iter_mut().filter(|n| n.state() == NodeState::Fetched) {
        apply(node, highest_degree);
        touched += 1;
    }
    touched
}

fn score(degree: usize, highest: usize) -> f64 {
    (degree as f64 / highest.max(1) as f64).clamp(0.0, 1.0)
}

fn heat(score: f64) -> Rgb {
    let channel = |v: f64| (v * 255.0).round() as u8;
    Rgb(channel(score), 0, channel(1.0 - score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node_with_degree(degree: usize) -> Node {
        let mut node = Node::new(NodeId(1), "n", Vec2::ZERO);
        node.degree_hint = degree;
        node
    }

    #[test]
    fn test_hub_is_large_and_red() {
        let mut node = node_with_degree(40);
        apply(&mut node, 40);
        assert_eq!(node.style.radius, 28);
        assert_eq!(node.style.color, Rgb(255, 0, 0));
    }

    #[test]
    fn test_leaf_is_small_and_blue() {
        let mut node = node_with_degree(0);
        apply(&mut node, 40);
        assert_eq!(node.style.radius, 8);
        assert_eq!(node.style.color, Rgb(0, 0, 255));
    }

    #[test]
    fn test_half_degree() {
        let mut node = node_with_degree(5);
        apply(&mut node, 10);
        assert_eq!(node.style.radius, 18);
        assert_eq!(node.style.color, Rgb(128, 0, 128));
    }

    #[test]
    fn test_pinned_overrides_colour_not_size() {
        let mut node = node_with_degree(10);
        node.pinned = true;
        apply(&mut node, 10);
        assert_eq!(node.style.color, Rgb::PINNED);
        assert_eq!(node.style.radius, 28);
    }

    #[test]
    fn test_restyle_skips_unfetched() {
        let mut graph = GraphData::new();
        let a = graph.add_node("a", Vec2::ZERO).unwrap();
        let b = graph.add_node("b", Vec2::ZERO).unwrap();
        {
            let node = graph.node_mut(a).unwrap();
            crate::lifecycle::begin_fetch(node).unwrap();
            crate::lifecycle::complete_fetch(node, vec!["x".into()]).unwrap();
        }

        assert_eq!(restyle_all(&mut graph, 1), 1);
        assert_eq!(graph.node(a).unwrap().style.color, Rgb(255, 0, 0));
        assert_eq!(graph.node(b).unwrap().style.color, Rgb::GREY);
    }
}
