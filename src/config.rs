//! Runtime configuration.
//!
//! Loaded from a TOML file; every field has a default, so an empty file (or
//! no file at all) is a valid configuration.
//!
//! ```toml
//! [ingest]
//! socket_path = "rewrite_search.socket"
//! read_timeout_ms = 30000
//!
//! [crawl]
//! reconnect_existing = false
//! auto_reveal = 5
//! spawn_distance = 7.0
//!
//! [discovery]
//! base_url = "http://en.wikipedia.org/wiki/"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::{GraphContext, AUTO_REVEAL};
use crate::crawl::wiki::DEFAULT_BASE_URL;
use crate::ingest::server::DEFAULT_READ_TIMEOUT;
use crate::ingest::IngestOptions;
use crate::lifecycle::{RevealPolicy, SPAWN_DISTANCE};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ingest: IngestConfig,
    pub crawl: CrawlConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub socket_path: PathBuf,
    pub read_chunk: usize,
    /// `0` means reads never time out.
    pub read_timeout_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("rewrite_search.socket"),
            read_chunk: 1024,
            read_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub reconnect_existing: bool,
    pub auto_reveal: usize,
    pub spawn_distance: f64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            reconnect_existing: false,
            auto_reveal: AUTO_REVEAL,
            spawn_distance: SPAWN_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub base_url: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string() }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ingest.read_chunk == 0 {
            return Err(Error::Config("ingest.read_chunk must be positive".into()));
        }
        if !(self.crawl.spawn_distance.is_finite() && self.crawl.spawn_distance >= 0.0) {
            return Err(Error::Config("crawl.spawn_distance must be a non-negative number".into()));
        }
        Ok(())
    }

    pub fn reveal_policy(&self) -> RevealPolicy {
        RevealPolicy {
            reconnect_existing: self.crawl.reconnect_existing,
            spawn_distance: self.crawl.spawn_distance,
        }
    }

    pub fn graph_context(&self) -> GraphContext {
        GraphContext::new(self.reveal_policy(), self.crawl.auto_reveal)
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            read_chunk: self.ingest.read_chunk,
            read_timeout: (self.ingest.read_timeout_ms > 0)
                .then(|| Duration::from_millis(self.ingest.read_timeout_ms)),
        }
    }
}
