use std::collections::BTreeMap;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DOCUMENT_TTL_SECS, DEFAULT_HEALTH_INTERVAL_SECS, DEFAULT_KEY_PREFIX,
    DEFAULT_SEARCH_TTL_SECS,
};

use super::error::{L2Error, L2Result};

#[derive(Debug, Clone)]
pub struct L2Config {
    /// Namespace prepended to every key and channel. Default: `lexcache:`.
    pub key_prefix: String,
    /// TTL for document entries without a category override.
    pub default_ttl: Duration,
    /// Per-category TTL overrides.
    pub category_ttls: BTreeMap<String, Duration>,
    /// TTL for cached search result sets; shorter than document TTLs.
    pub search_ttl: Duration,
    /// Period of the background health check.
    pub health_interval: Duration,
}

impl Default for L2Config {
    fn default() -> Self {
        let category_ttls = [
            ("contract", Duration::from_secs(24 * 60 * 60)),
            ("precedent", Duration::from_secs(7 * 24 * 60 * 60)),
            ("statute", Duration::from_secs(7 * 24 * 60 * 60)),
            ("evidence", Duration::from_secs(12 * 60 * 60)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            default_ttl: Duration::from_secs(DEFAULT_DOCUMENT_TTL_SECS),
            category_ttls,
            search_ttl: Duration::from_secs(DEFAULT_SEARCH_TTL_SECS),
            health_interval: Duration::from_secs(DEFAULT_HEALTH_INTERVAL_SECS),
        }
    }
}

impl L2Config {
    pub fn key_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    pub fn category_ttl(mut self, category: &str, ttl: Duration) -> Self {
        self.category_ttls.insert(category.to_string(), ttl);
        self
    }

    pub fn search_ttl(mut self, ttl: Duration) -> Self {
        self.search_ttl = ttl;
        self
    }

    /// TTL applied to a document of `category`.
    pub fn ttl_for(&self, category: &str) -> Duration {
        self.category_ttls
            .get(category)
            .copied()
            .unwrap_or(self.default_ttl)
    }

    pub fn validate(&self) -> L2Result<()> {
        if self.key_prefix.contains(['*', '?', '[', ']']) {
            return Err(L2Error::Backend {
                reason: format!(
                    "key_prefix '{}' must not contain glob characters",
                    self.key_prefix
                ),
            });
        }
        if self.search_ttl.is_zero() || self.default_ttl.is_zero() {
            return Err(L2Error::Backend {
                reason: "TTLs must be > 0".to_string(),
            });
        }
        if let Some(shortest) = self.category_ttls.values().chain([&self.default_ttl]).min()
            && self.search_ttl > *shortest
        {
            return Err(L2Error::Backend {
                reason: format!(
                    "search_ttl ({:?}) must not exceed document TTLs ({:?})",
                    self.search_ttl, shortest
                ),
            });
        }
        Ok(())
    }
}
