//! # Live Graph Model
//!
//! Plain data shared by the store, the crawler, the ingestion server and the
//! presentation layer.
//!
//! Design rule: no locks, no I/O, no async in here. Everything that mutates a
//! `Node` structurally lives in `storage` or `lifecycle`.

pub mod node;
pub mod geometry;
pub mod style;
pub mod view;

pub use node::{Node, NodeId, NodeState};
pub use geometry::Vec2;
pub use style::{NodeStyle, Rgb};
pub use view::NodeView;
