//! Wikipedia link discovery.
//!
//! A page's neighbors are the article links found in its HTML: every quoted
//! attribute value starting with `/wiki/`, minus namespaced pages (`:`),
//! anchors (`#`) and percent-encoded titles (`%`).

use std::collections::BTreeSet;

const ARTICLE_PREFIX: &str = "/wiki/";
const BANNED_CHARS: [char; 3] = [':', '#', '%'];

pub const DEFAULT_BASE_URL: &str = "http://en.wikipedia.org/wiki/";

/// Extract distinct article titles, sorted.
pub fn extract_links(html: &str) -> Vec<String> {
    html.split('"')
        .filter_map(|s| s.strip_prefix(ARTICLE_PREFIX))
        .filter(|title| !title.is_empty() && !title.contains(&BANNED_CHARS[..]))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(feature = "wiki")]
pub use provider::WikiDiscovery;

#[cfg(feature = "wiki")]
mod provider {
    use async_trait::async_trait;

    use super::{extract_links, DEFAULT_BASE_URL};
    use crate::crawl::DiscoveryProvider;
    use crate::{Error, Result};

    /// Fetches `<base_url><title>` over HTTP and extracts its article links.
    #[derive(Debug, Clone)]
    pub struct WikiDiscovery {
        client: reqwest::Client,
        base_url: String,
    }

    impl WikiDiscovery {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self { client: reqwest::Client::new(), base_url: base_url.into() }
        }
    }

    impl Default for WikiDiscovery {
        fn default() -> Self {
            Self::new(DEFAULT_BASE_URL)
        }
    }

    #[async_trait]
    impl DiscoveryProvider for WikiDiscovery {
        async fn discover(&self, name: &str) -> Result<Vec<String>> {
            let url = format!("{}{}", self.base_url, name);
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| Error::Discovery(format!("GET {url}: {e}")))?;
            let html = response
                .text()
                .await
                .map_err(|e| Error::Discovery(format!("reading {url}: {e}")))?;

            let links = extract_links(&html);
            tracing::debug!(%name, links = links.len(), "wiki page crawled");
            Ok(links)
        }
    }
}
