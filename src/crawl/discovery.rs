//! Discovery providers: name → neighbor names.

use std::collections::HashMap;
use async_trait::async_trait;

use crate::{Error, Result};

/// The crawler's fetch step.
///
/// Called from a background task with the graph lock released, so
/// implementations are free to do network I/O.
#[async_trait]
pub trait DiscoveryProvider: Send + Sync + 'static {
    /// Ordered neighbor names of `name`.
    async fn discover(&self, name: &str) -> Result<Vec<String>>;
}

/// Fixed adjacency table. Unknown names fail discovery.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    table: HashMap<String, Vec<String>>,
}

impl StaticDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, I, V>(pairs: impl IntoIterator<Item = (K, I)>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let table = pairs
            .into_iter()
            .map(|(k, vs)| (k.into(), vs.into_iter().map(Into::into).collect()))
            .collect();
        Self { table }
    }

    pub fn insert(&mut self, name: impl Into<String>, neighbors: Vec<String>) {
        self.table.insert(name.into(), neighbors);
    }
}

#[async_trait]
impl DiscoveryProvider for StaticDiscovery {
    async fn discover(&self, name: &str) -> Result<Vec<String>> {
        self.table
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Discovery(format!("no neighbors known for '{name}'")))
    }
}
