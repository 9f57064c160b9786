//! # Crawl Orchestrator
//!
//! `activate` flips a node to `Fetching` under the graph lock, drops the
//! lock, and spawns a background task that asks the `DiscoveryProvider` for
//! the node's neighbors. The task's completion re-acquires the lock to
//! install the results, reveals a handful of neighbors and restyles the
//! graph.
//!
//! Tasks are fire-and-forget: nothing joins them and shutdown does not wait
//! for them. A completion that arrives after a graph reset finds its node
//! gone and is dropped.

pub mod discovery;
pub mod wiki;

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::context::GraphContext;
use crate::lifecycle::{self, Reveal};
use crate::model::*;
use crate::storage::GraphStore;
use crate::{styling, Error, Result};

pub use discovery::{DiscoveryProvider, StaticDiscovery};
#[cfg(feature = "wiki")]
pub use wiki::WikiDiscovery;

/// What an `activate` call did.
#[derive(Debug)]
pub enum Activation {
    /// Discovery was started. Dropping the handle detaches the task.
    Dispatched(JoinHandle<()>),
    /// The node was already fetched; one pending neighbor was revealed
    /// (`None` if the queue was empty).
    Revealed(Option<Reveal>),
    /// A fetch for this node is already running.
    InFlight,
}

/// Summary of a finished crawl, mostly for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    Fetched { degree: usize, revealed: usize },
    Failed,
    /// The node no longer exists (graph reset while discovery ran).
    Stale,
}

// ============================================================================
// Crawler
// ============================================================================

#[derive(Clone)]
pub struct Crawler {
    store: Arc<GraphStore>,
    context: Arc<GraphContext>,
    provider: Arc<dyn DiscoveryProvider>,
    runtime: Handle,
}

impl Crawler {
    pub fn new(
        store: Arc<GraphStore>,
        context: Arc<GraphContext>,
        provider: Arc<dyn DiscoveryProvider>,
        runtime: Handle,
    ) -> Self {
        Self { store, context, provider, runtime }
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    pub fn context(&self) -> &Arc<GraphContext> {
        &self.context
    }

    /// The "activate" input: start a fetch, retry a failed one, or reveal
    /// one more neighbor of a fetched node.
    pub fn activate(&self, id: NodeId) -> Result<Activation> {
        let name = {
            let mut graph = self.store.lock();
            let state = graph.node(id).ok_or(Error::NodeNotFound(id))?.state();
            match state {
                NodeState::Unfetched | NodeState::Failed => {
                    let node = graph.node_mut(id).ok_or(Error::NodeNotFound(id))?;
                    lifecycle::begin_fetch(node)?;
                    node.name.clone()
                }
                NodeState::Fetching => return Ok(Activation::InFlight),
                NodeState::Fetched => {
                    let reveal = lifecycle::reveal_one(&mut graph, id, &self.context.policy)?;
                    return Ok(Activation::Revealed(reveal));
                }
            }
        };

        tracing::info!(node = %id, %name, "crawl dispatched");
        let crawler = self.clone();
        let handle = self.runtime.spawn(async move {
            let discovered = crawler.provider.discover(&name).await;
            crawler.finish(id, discovered);
        });
        Ok(Activation::Dispatched(handle))
    }

    /// Install a discovery result for `id`. Each step takes the lock on its
    /// own: install, every auto-reveal, then the restyle pass.
    pub fn finish(&self, id: NodeId, discovered: Result<Vec<String>>) -> CrawlOutcome {
        let names = match discovered {
            Ok(names) => names,
            Err(e) => return self.fail(id, e),
        };

        let degree = {
            let mut graph = self.store.lock();
            let Some(node) = graph.node_mut(id) else {
                tracing::debug!(node = %id, "crawl finished for a node that no longer exists");
                return CrawlOutcome::Stale;
            };
            match lifecycle::complete_fetch(node, names) {
                Ok(degree) => degree,
                Err(e) => {
                    tracing::warn!(node = %id, error = %e, "discarding crawl result");
                    return CrawlOutcome::Stale;
                }
            }
        };
        self.context.observe_degree(degree);

        let mut revealed = 0;
        for _ in 0..self.context.auto_reveal {
            let mut graph = self.store.lock();
            match lifecycle::reveal_one(&mut graph, id, &self.context.policy) {
                Ok(Some(_)) => revealed += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(node = %id, error = %e, "auto-reveal stopped");
                    break;
                }
            }
        }

        let highest = self.context.highest_degree();
        let restyled = styling::restyle_all(&mut self.store.lock(), highest);
        tracing::info!(node = %id, degree, revealed, restyled, highest, "crawl complete");
        CrawlOutcome::Fetched { degree, revealed }
    }

    fn fail(&self, id: NodeId, error: Error) -> CrawlOutcome {
        tracing::warn!(node = %id, %error, "discovery failed");
        let mut graph = self.store.lock();
        let Some(node) = graph.node_mut(id) else {
            return CrawlOutcome::Stale;
        };
        match lifecycle::fail_fetch(node) {
            Ok(()) => CrawlOutcome::Failed,
            Err(e) => {
                tracing::warn!(node = %id, error = %e, "could not mark node failed");
                CrawlOutcome::Stale
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
