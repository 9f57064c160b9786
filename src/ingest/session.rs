//! Applying commands of one client connection to the graph.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ingest::protocol::{Command, ProtocolError, Record, Side};
use crate::model::*;
use crate::storage::{GraphData, GraphStore};
use crate::{Error, Result};

/// Fixed anchor position of a side's root vertex.
pub fn root_position(side: Side) -> Vec2 {
    match side {
        Side::Left => Vec2::new(-20.0, 0.0),
        Side::Right => Vec2::new(20.0, 0.0),
    }
}

pub fn root_color(side: Side) -> Rgb {
    match side {
        Side::Left => Rgb(140, 101, 211),
        Side::Right => Rgb(0, 197, 144),
    }
}

pub fn vertex_color(side: Side) -> Rgb {
    match side {
        Side::Left => Rgb(202, 185, 241),
        Side::Right => Rgb(181, 249, 211),
    }
}

fn is_root(id: &str) -> bool {
    id == "0" || id == "1"
}

/// What the serve loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Emit this acknowledgement and keep reading.
    Ack(Record),
    /// Stop processing this connection.
    Finish,
}

/// Per-connection state: the protocol id → node table.
pub struct Session {
    store: Arc<GraphStore>,
    vertices: HashMap<String, NodeId>,
}

impl Session {
    /// Start a session: wipe the graph, then hand back an empty id table.
    /// Nothing from the new client is applied before the wipe completes.
    pub fn begin(store: Arc<GraphStore>) -> Self {
        store.remove_all();
        Self { store, vertices: HashMap::new() }
    }

    pub fn vertex(&self, id: &str) -> Option<NodeId> {
        self.vertices.get(id).copied()
    }

    pub fn apply(&mut self, command: Command) -> Result<Step> {
        match command {
            Command::Vertex { id, side, name } => {
                self.add_vertex(&id, side, &name)?;
                Ok(Step::Ack(Record::Vertex { id, side, name }))
            }
            Command::Edge { left, right } => {
                let mut graph = self.store.lock();
                let (l, r) = self.endpoints(&left, &right)?;
                graph.connect(l, r)?;
                Ok(Step::Ack(Record::Edge { left, right }))
            }
            Command::Probe { left, right } => {
                // Addressed like an edge, deliberately no graph effect.
                self.endpoints(&left, &right)?;
                Ok(Step::Ack(Record::Probe { left, right }))
            }
            Command::Done => Ok(Step::Finish),
        }
    }

    fn endpoints(&self, left: &str, right: &str) -> Result<(NodeId, NodeId)> {
        let lookup = |id: &str| {
            self.vertex(id).ok_or_else(|| ProtocolError::UnknownVertex(id.to_string()))
        };
        Ok((lookup(left)?, lookup(right)?))
    }

    fn add_vertex(&mut self, id: &str, side: Side, name: &str) -> Result<NodeId> {
        let mut graph = self.store.lock();
        if self.vertices.contains_key(id) {
            return Err(ProtocolError::DuplicateVertex(id.to_string()).into());
        }

        let node = if is_root(id) {
            let node = Self::insert(&mut graph, name, root_position(side))?;
            let n = graph.node_mut(node).ok_or(Error::NodeNotFound(node))?;
            n.pinned = true;
            n.style.color = root_color(side);
            node
        } else {
            let root = side.root_id();
            let anchor = self
                .vertex(root)
                .and_then(|r| graph.node(r))
                .map(|r| r.position)
                .ok_or_else(|| ProtocolError::MissingRoot { id: id.to_string(), root })?;
            let node = Self::insert(&mut graph, name, anchor)?;
            let n = graph.node_mut(node).ok_or(Error::NodeNotFound(node))?;
            n.style.color = vertex_color(side);
            node
        };
        drop(graph);

        self.vertices.insert(id.to_string(), node);
        tracing::trace!(%id, %side, %name, %node, "vertex added");
        Ok(node)
    }

    fn insert(graph: &mut GraphData, name: &str, position: Vec2) -> Result<NodeId> {
        graph.add_node(name, position).map_err(|e| match e {
            Error::DuplicateName(name) => ProtocolError::DuplicateName(name).into(),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vertex(id: &str, side: Side, name: &str) -> Command {
        Command::Vertex { id: id.into(), side, name: name.into() }
    }

    #[test]
    fn test_begin_resets_graph() {
        let store = Arc::new(GraphStore::new());
        store.add_node("leftover", Vec2::ZERO).unwrap();

        let _session = Session::begin(store.clone());
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn test_roots_are_pinned_anchors() {
        let store = Arc::new(GraphStore::new());
        let mut s = Session::begin(store.clone());

        s.apply(vertex("0", Side::Left, "lhs")).unwrap();
        s.apply(vertex("1", Side::Right, "rhs")).unwrap();

        let lhs = store.node(s.vertex("0").unwrap()).unwrap();
        assert!(lhs.pinned);
        assert_eq!(lhs.position, Vec2::new(-20.0, 0.0));
        assert_eq!(lhs.style.color, Rgb(140, 101, 211));

        let rhs = store.node(s.vertex("1").unwrap()).unwrap();
        assert_eq!(rhs.position, Vec2::new(20.0, 0.0));
        assert_eq!(rhs.style.color, Rgb(0, 197, 144));
    }

    #[test]
    fn test_child_vertex_spawns_at_its_root() {
        let store = Arc::new(GraphStore::new());
        let mut s = Session::begin(store.clone());
        s.apply(vertex("0", Side::Left, "lhs")).unwrap();
        s.apply(vertex("1", Side::Right, "rhs")).unwrap();

        let step = s.apply(vertex("7", Side::Right, "rhs'")).unwrap();
        assert_eq!(
            step,
            Step::Ack(Record::Vertex { id: "7".into(), side: Side::Right, name: "rhs'".into() })
        );

        let child = store.node(s.vertex("7").unwrap()).unwrap();
        assert!(!child.pinned);
        assert_eq!(child.position, Vec2::new(20.0, 0.0));
        assert_eq!(child.style.color, Rgb(181, 249, 211));
    }

    #[test]
    fn test_child_without_root_is_rejected() {
        let store = Arc::new(GraphStore::new());
        let mut s = Session::begin(store.clone());

        let err = s.apply(vertex("5", Side::Left, "x")).unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::MissingRoot { root: "0", .. })));
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn test_duplicate_vertex_id_keeps_original() {
        let store = Arc::new(GraphStore::new());
        let mut s = Session::begin(store.clone());
        s.apply(vertex("0", Side::Left, "first")).unwrap();
        let first = s.vertex("0").unwrap();

        let err = s.apply(vertex("0", Side::Left, "second")).unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::DuplicateVertex(_))));
        assert_eq!(s.vertex("0"), Some(first));
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let store = Arc::new(GraphStore::new());
        let mut s = Session::begin(store.clone());
        s.apply(vertex("0", Side::Left, "same")).unwrap();

        let err = s.apply(vertex("1", Side::Right, "same")).unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::DuplicateName(_))));
        assert_eq!(s.vertex("1"), None);
    }

    #[test]
    fn test_edge_and_probe() {
        let store = Arc::new(GraphStore::new());
        let mut s = Session::begin(store.clone());
        s.apply(vertex("0", Side::Left, "a")).unwrap();
        s.apply(vertex("1", Side::Right, "b")).unwrap();

        s.apply(Command::Probe { left: "0".into(), right: "1".into() }).unwrap();
        assert_eq!(store.edge_count(), 0);

        s.apply(Command::Edge { left: "0".into(), right: "1".into() }).unwrap();
        assert_eq!(store.edge_count(), 1);
        assert!(store.lock().edges_are_mirrored());
    }

    #[test]
    fn test_edge_to_unknown_vertex() {
        let store = Arc::new(GraphStore::new());
        let mut s = Session::begin(store.clone());
        s.apply(vertex("0", Side::Left, "a")).unwrap();

        let err = s.apply(Command::Edge { left: "0".into(), right: "9".into() }).unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::UnknownVertex(id)) if id == "9"));
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_done_finishes() {
        let store = Arc::new(GraphStore::new());
        let mut s = Session::begin(store);
        assert_eq!(s.apply(Command::Done).unwrap(), Step::Finish);
    }
}
