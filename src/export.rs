//! JSON dump of the current graph generation.
//!
//! ```text
//! GraphStore → export_json() → { generation, nodes: [...], edges: [[a, b], ...] }
//! ```
//!
//! Taken in one lock acquisition, so the dump is a consistent cut even while
//! the crawler and the ingestion server keep writing.

use std::io::Write;

use serde::Serialize;

use crate::model::*;
use crate::storage::GraphStore;
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct GraphDump {
    pub generation: u64,
    pub nodes: Vec<NodeView>,
    /// Undirected edges by display name, each listed once with the smaller
    /// handle first.
    pub edges: Vec<(String, String)>,
}

impl GraphDump {
    pub fn capture(store: &GraphStore) -> Self {
        let graph = store.lock();

        let mut nodes: Vec<NodeView> = graph.iter().map(NodeView::from).collect();
        nodes.sort_by_key(|n| n.id);

        let mut edges = Vec::new();
        for node in &nodes {
            for &other in node.neighbors.iter().filter(|&&o| o >= node.id) {
                if let Some(target) = graph.node(other) {
                    edges.push((node.name.clone(), target.name.clone()));
                }
            }
        }

        Self { generation: graph.generation(), nodes, edges }
    }
}

/// Write the graph as pretty-printed JSON.
pub fn export_json(store: &GraphStore, writer: &mut dyn Write) -> Result<()> {
    let dump = GraphDump::capture(store);
    serde_json::to_writer_pretty(&mut *writer, &dump)?;
    writeln!(writer)?;
    Ok(())
}
