//! # Presentation Adapter
//!
//! The boundary with the UI toolkit. The toolkit turns raw input into
//! `InputEvent`s and feeds them to `Interaction::handle`; at draw time it
//! reads `GraphStore::iterate_nodes` and writes layout positions back with
//! `GraphStore::set_position`.
//!
//! Event handling holds the graph lock only for single short edits. No
//! discovery I/O ever runs on the UI thread.

use std::sync::Arc;

use crate::crawl::{Activation, Crawler};
use crate::model::*;
use crate::storage::GraphStore;
use crate::lifecycle::{self, Reveal};
use crate::{styling, Error, Result};

// ============================================================================
// Input events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Down,
    Up,
}

/// Everything the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    /// Pointer motion; ignored by the core.
    PointerMove,
    /// The pointer now hovers this node, or none.
    Hover(Option<NodeId>),
    /// Fetch, retry, or reveal one more neighbor.
    Activate { hovered: Option<NodeId> },
    TogglePinned { hovered: Option<NodeId> },
}

impl InputEvent {
    /// Map a raw button event: right release activates, middle release
    /// toggles pinning, anything else is dropped.
    pub fn from_button(button: MouseButton, state: ButtonState, hovered: Option<NodeId>) -> Option<Self> {
        match (button, state) {
            (MouseButton::Right, ButtonState::Up) => Some(InputEvent::Activate { hovered }),
            (MouseButton::Middle, ButtonState::Up) => Some(InputEvent::TogglePinned { hovered }),
            _ => None,
        }
    }
}

/// Whether the UI loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// ============================================================================
// Interaction
// ============================================================================

/// Routes input events to the crawler and the store.
pub struct Interaction {
    crawler: Crawler,
    hovered: Option<NodeId>,
}

impl Interaction {
    pub fn new(crawler: Crawler) -> Self {
        Self { crawler, hovered: None }
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        self.crawler.store()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn handle(&mut self, event: InputEvent) -> Result<Flow> {
        match event {
            InputEvent::Quit => return Ok(Flow::Quit),
            InputEvent::PointerMove => {}
            InputEvent::Hover(node) => self.hovered = node,
            InputEvent::Activate { hovered } => {
                if let Some(id) = hovered {
                    self.activate(id)?;
                }
            }
            InputEvent::TogglePinned { hovered } => {
                if let Some(id) = hovered {
                    self.toggle_pinned(id)?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Activate the node. Discovery tasks are detached.
    pub fn activate(&self, id: NodeId) -> Result<Activation> {
        self.crawler.activate(id)
    }

    /// Reveal one pending neighbor of the node without fetching. `None` when
    /// nothing is pending.
    pub fn reveal(&self, id: NodeId) -> Result<Option<Reveal>> {
        let policy = &self.crawler.context().policy;
        let mut graph = self.store().lock();
        lifecycle::reveal_one(&mut graph, id, policy)
    }

    /// Flip `pinned` and restyle the node. Returns the new value.
    pub fn toggle_pinned(&self, id: NodeId) -> Result<bool> {
        let highest = self.crawler.context().highest_degree();
        let mut graph = self.store().lock();
        let node = graph.node_mut(id).ok_or(Error::NodeNotFound(id))?;
        node.pinned = !node.pinned;
        styling::apply(node, highest);
        tracing::debug!(node = %id, pinned = node.pinned, "pin toggled");
        Ok(node.pinned)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GraphContext;
    use crate::crawl::StaticDiscovery;

    fn interaction() -> Interaction {
        let crawler = Crawler::new(
            Arc::new(GraphStore::new()),
            Arc::new(GraphContext::default()),
            Arc::new(StaticDiscovery::from_pairs([("a", vec!["b"])])),
            tokio::runtime::Handle::current(),
        );
        Interaction::new(crawler)
    }

    #[test]
    fn test_button_mapping() {
        let n = Some(NodeId(1));
        assert_eq!(
            InputEvent::from_button(MouseButton::Right, ButtonState::Up, n),
            Some(InputEvent::Activate { hovered: n })
        );
        assert_eq!(
            InputEvent::from_button(MouseButton::Middle, ButtonState::Up, n),
            Some(InputEvent::TogglePinned { hovered: n })
        );
        assert_eq!(InputEvent::from_button(MouseButton::Right, ButtonState::Down, n), None);
        assert_eq!(InputEvent::from_button(MouseButton::Left, ButtonState::Up, n), None);
    }

    #[tokio::test]
    async fn test_quit_and_hover() {
        let mut ui = interaction();
        assert_eq!(ui.handle(InputEvent::PointerMove).unwrap(), Flow::Continue);
        assert_eq!(ui.handle(InputEvent::Hover(Some(NodeId(3)))).unwrap(), Flow::Continue);
        assert_eq!(ui.hovered(), Some(NodeId(3)));
        assert_eq!(ui.handle(InputEvent::Quit).unwrap(), Flow::Quit);
    }

    #[tokio::test]
    async fn test_button_without_hover_is_noop() {
        let mut ui = interaction();
        let a = ui.store().add_node("a", Vec2::ZERO).unwrap();

        ui.handle(InputEvent::Activate { hovered: None }).unwrap();
        ui.handle(InputEvent::TogglePinned { hovered: None }).unwrap();

        let view = ui.store().node(a).unwrap();
        assert_eq!(view.state, NodeState::Unfetched);
        assert!(!view.pinned);
    }

    #[tokio::test]
    async fn test_toggle_pinned_keeps_state() {
        let mut ui = interaction();
        let a = ui.store().add_node("a", Vec2::ZERO).unwrap();

        ui.handle(InputEvent::TogglePinned { hovered: Some(a) }).unwrap();
        let view = ui.store().node(a).unwrap();
        assert!(view.pinned);
        assert_eq!(view.style.color, Rgb::PINNED);
        assert_eq!(view.state, NodeState::Unfetched);

        ui.handle(InputEvent::TogglePinned { hovered: Some(a) }).unwrap();
        let view = ui.store().node(a).unwrap();
        assert!(!view.pinned);
        assert_eq!(view.style.color, Rgb(0, 0, 255));
    }

    #[tokio::test]
    async fn test_activate_marks_loading() {
        let mut ui = interaction();
        let a = ui.store().add_node("a", Vec2::ZERO).unwrap();

        // Single-threaded test runtime: the crawl task cannot run until we yield
        ui.handle(InputEvent::Activate { hovered: Some(a) }).unwrap();
        let view = ui.store().node(a).unwrap();
        assert_eq!(view.state, NodeState::Fetching);
        assert_eq!(view.style.font_color, Rgb::LOADING);
    }

    #[tokio::test]
    async fn test_reveal_pops_pending_neighbor() {
        let ui = interaction();
        let a = ui.store().add_node("a", Vec2::ZERO).unwrap();
        {
            let mut graph = ui.store().lock();
            let node = graph.node_mut(a).unwrap();
            lifecycle::begin_fetch(node).unwrap();
            lifecycle::complete_fetch(node, vec!["b".into()]).unwrap();
        }

        let reveal = ui.reveal(a).unwrap().expect("one pending neighbor");
        assert!(reveal.created);
        assert_eq!(ui.store().node(reveal.target).unwrap().name, "b");
        assert_eq!(ui.store().node(a).unwrap().neighbors, vec![reveal.target]);

        assert_eq!(ui.reveal(a).unwrap(), None);
        assert_eq!(ui.store().node_count(), 2);
        assert!(matches!(ui.reveal(NodeId(99)), Err(Error::NodeNotFound(_))));
    }
}
