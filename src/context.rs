//! Process-wide crawl context.
//!
//! Created once at startup and shared by `Arc` with the crawl orchestrator,
//! the styling pass and the presentation layer.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::lifecycle::RevealPolicy;

/// Number of neighbors revealed automatically when a fetch completes.
pub const AUTO_REVEAL: usize = 5;

#[derive(Debug)]
pub struct GraphContext {
    /// Highest degree hint seen by any fetch. Starts at 1, only grows, and
    /// survives graph resets.
    highest_degree: AtomicUsize,
    pub policy: RevealPolicy,
    pub auto_reveal: usize,
}

impl GraphContext {
    pub fn new(policy: RevealPolicy, auto_reveal: usize) -> Self {
        Self { highest_degree: AtomicUsize::new(1), policy, auto_reveal }
    }

    pub fn highest_degree(&self) -> usize {
        self.highest_degree.load(Ordering::Acquire)
    }

    /// Fold a newly discovered degree into the maximum and return the new
    /// maximum.
    pub fn observe_degree(&self, degree: usize) -> usize {
        let previous = self.highest_degree.fetch_max(degree, Ordering::AcqRel);
        previous.max(degree)
    }
}

impl Default for GraphContext {
    fn default() -> Self {
        Self::new(RevealPolicy::default(), AUTO_REVEAL)
    }
}
