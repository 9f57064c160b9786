//! # livegraph: a live graph shared by a UI, a crawler and a socket
//!
//! One mutable graph, three independent writers:
//!
//! 1. **The UI loop** reacts to input events (activate / toggle-pinned) and
//!    reads node state every frame to draw.
//! 2. **The crawl orchestrator** runs neighbor discovery in background tasks
//!    and reveals discovered neighbors a few at a time.
//! 3. **The ingestion server** accepts one local-socket client at a time and
//!    applies its `V|E|P|D` command stream to the graph.
//!
//! ## Design Principles
//!
//! 1. **One lock**: `GraphStore` guards every node, edge and lifecycle field
//!    with a single mutex. Lookup-then-insert sequences hold it throughout.
//! 2. **Mirrored edges**: `GraphData::connect` is the only way to add
//!    adjacency, and always writes both endpoints.
//! 3. **Closed enums**: lifecycle states and input events are matched
//!    exhaustively.
//! 4. **No I/O under the lock**: discovery runs with the lock released; its
//!    completion re-acquires it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use livegraph::{Crawler, GraphContext, GraphStore, StaticDiscovery, Vec2};
//!
//! # async fn example() -> livegraph::Result<()> {
//! let store = Arc::new(GraphStore::new());
//! let context = Arc::new(GraphContext::default());
//! let provider = Arc::new(StaticDiscovery::from_pairs([
//!     ("Rust", vec!["Mozilla", "LLVM"]),
//! ]));
//!
//! let root = store.add_node("Rust", Vec2::ZERO)?;
//! let crawler = Crawler::new(store.clone(), context, provider, tokio::runtime::Handle::current());
//! crawler.activate(root)?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod lifecycle;
pub mod styling;
pub mod context;
pub mod crawl;
pub mod ingest;
pub mod presentation;
pub mod config;
pub mod export;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{Node, NodeId, NodeState, NodeStyle, NodeView, Rgb, Vec2};

// ============================================================================
// Re-exports: Store, lifecycle, crawl
// ============================================================================

pub use storage::{GraphData, GraphStore};
pub use lifecycle::{Reveal, RevealPolicy};
pub use context::GraphContext;
pub use crawl::{Activation, Crawler, DiscoveryProvider, StaticDiscovery};
#[cfg(feature = "wiki")]
pub use crawl::WikiDiscovery;

// ============================================================================
// Re-exports: Ingestion, presentation, config
// ============================================================================

pub use ingest::{AckSink, Command, IngestOptions, IngestServer, ProtocolError, Record, Side};
pub use presentation::{Flow, InputEvent, Interaction, MouseButton};
pub use config::Config;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Duplicate node name: {0}")]
    DuplicateName(String),

    #[error("Invalid lifecycle transition for node {node}: {from:?} -> {to:?}")]
    InvalidTransition { node: NodeId, from: NodeState, to: NodeState },

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
