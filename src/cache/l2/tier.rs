use std::sync::Arc;

use tracing::{debug, instrument};

use crate::document::CachedDocument;
use crate::scoring::SearchResultEntry;
use crate::sync::{ChangeNotification, SearchInvalidation};

use super::backend::DistributedBackend;
use super::config::L2Config;
use super::error::L2Result;
use super::types::{DocumentEnvelope, Subscription};

/// Namespaced view of a [`DistributedBackend`].
///
/// Owns the key layout (`<prefix>doc:<id>`, `<prefix>search:<hash>`), channel names,
/// TTL policy and the JSON envelope format.
#[derive(Clone)]
pub struct DistributedTier {
    backend: Arc<dyn DistributedBackend>,
    config: L2Config,
}

impl std::fmt::Debug for DistributedTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributedTier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DistributedTier {
    pub fn new(backend: Arc<dyn DistributedBackend>, config: L2Config) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &L2Config {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn DistributedBackend> {
        &self.backend
    }

    pub fn document_key(&self, id: &str) -> String {
        format!("{}doc:{}", self.config.key_prefix, id)
    }

    pub fn search_key(&self, hash: &str) -> String {
        format!("{}search:{}", self.config.key_prefix, hash)
    }

    pub fn change_channel(&self, category: &str) -> String {
        format!("{}changes:{}", self.config.key_prefix, category)
    }

    pub fn invalidation_channel(&self) -> String {
        format!("{}search:invalidate", self.config.key_prefix)
    }

    /// Returns `true` if `channel` is the search invalidation channel.
    pub fn is_invalidation_channel(&self, channel: &str) -> bool {
        channel == self.invalidation_channel()
    }

    #[instrument(skip(self, doc, raw_data), fields(id = %doc.id, category = %doc.category))]
    pub async fn put_document(
        &self,
        doc: &CachedDocument,
        raw_data: Option<&[u8]>,
    ) -> L2Result<()> {
        let envelope = DocumentEnvelope {
            document: doc.clone(),
            raw_data: raw_data.map(<[u8]>::to_vec),
        };
        let value = serde_json::to_string(&envelope)?;
        let ttl = self.config.ttl_for(&doc.category);
        self.backend
            .set_with_ttl(&self.document_key(&doc.id), value, ttl)
            .await?;
        debug!(ttl_secs = ttl.as_secs(), "Document persisted to L2");
        Ok(())
    }

    /// Reads a document envelope. Undecodable values surface as `L2Error::Malformed`.
    pub async fn get_document(&self, id: &str) -> L2Result<Option<DocumentEnvelope>> {
        match self.backend.get(&self.document_key(id)).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    pub async fn delete_document(&self, id: &str) -> L2Result<bool> {
        let deleted = self.backend.delete(&[self.document_key(id)]).await?;
        Ok(deleted > 0)
    }

    pub async fn put_search(&self, hash: &str, results: &[SearchResultEntry]) -> L2Result<()> {
        let value = serde_json::to_string(results)?;
        self.backend
            .set_with_ttl(&self.search_key(hash), value, self.config.search_ttl)
            .await
    }

    pub async fn get_search(&self, hash: &str) -> L2Result<Option<Vec<SearchResultEntry>>> {
        match self.backend.get(&self.search_key(hash)).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Deletes cached result sets whose hash matches `pattern`. Documents are untouched.
    pub async fn invalidate_searches(&self, pattern: &str) -> L2Result<u64> {
        let keys = self.backend.keys(&self.search_key(pattern)).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.backend.delete(&keys).await
    }

    /// Deletes every key under this engine's prefix.
    pub async fn clear_namespace(&self) -> L2Result<u64> {
        let pattern = format!("{}*", self.config.key_prefix);
        let keys = self.backend.keys(&pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.backend.delete(&keys).await
    }

    pub async fn publish_change(&self, notification: &ChangeNotification) -> L2Result<u64> {
        let payload = serde_json::to_string(notification)?;
        self.backend
            .publish(&self.change_channel(&notification.category), payload)
            .await
    }

    pub async fn publish_search_invalidation(
        &self,
        invalidation: &SearchInvalidation,
    ) -> L2Result<u64> {
        let payload = serde_json::to_string(invalidation)?;
        self.backend
            .publish(&self.invalidation_channel(), payload)
            .await
    }

    /// Subscribes to every category change channel plus search invalidation.
    pub async fn subscribe(&self) -> L2Result<Subscription> {
        let patterns = [
            format!("{}changes:*", self.config.key_prefix),
            self.invalidation_channel(),
        ];
        self.backend.subscribe(&patterns).await
    }

    pub async fn ping(&self) -> L2Result<()> {
        self.backend.ping().await
    }

    pub async fn close(&self) -> L2Result<()> {
        self.backend.close().await
    }
}
