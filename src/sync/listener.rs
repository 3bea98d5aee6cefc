//! Applies change notifications from peer instances to the local L1 tier.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::{SyncError, SyncResult};
use super::types::{ChangeNotification, ChangeOperation, SearchInvalidation};
use crate::cache::events::CacheEvent;
use crate::cache::l1::L1Store;
use crate::cache::l2::{ChannelMessage, DistributedTier, Subscription};
use crate::document::{CachedDocument, SyncStatus};
use crate::stats::StatsRecorder;

/// Result of applying one channel message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied {
        id: String,
        operation: ChangeOperation,
    },
    SearchInvalidated,
}

/// Consumes `<prefix>changes:*` and `<prefix>search:invalidate`.
///
/// create inserts if absent, update merges (incoming fields win, access count keeps the
/// maximum), delete removes the id from the notified category. Notifications published
/// by this instance are applied too, restoring copies evicted before delivery. Applying
/// the same notification twice leaves L1 as applying it once.
#[derive(Clone)]
pub struct SyncListener {
    l1: Arc<L1Store>,
    tier: DistributedTier,
    recorder: Arc<StatsRecorder>,
    events: broadcast::Sender<CacheEvent>,
    origin: Uuid,
}

impl SyncListener {
    pub fn new(
        l1: Arc<L1Store>,
        tier: DistributedTier,
        recorder: Arc<StatsRecorder>,
        events: broadcast::Sender<CacheEvent>,
        origin: Uuid,
    ) -> Self {
        Self {
            l1,
            tier,
            recorder,
            events,
            origin,
        }
    }

    /// Applies a raw channel message; failures are logged and counted as conflicts.
    pub async fn handle(&self, message: &ChannelMessage) -> Option<SyncOutcome> {
        match self.apply(message).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(channel = %message.channel, error = %e, "Dropping change notification");
                self.recorder.record_sync_conflict();
                None
            }
        }
    }

    pub async fn apply(&self, message: &ChannelMessage) -> SyncResult<SyncOutcome> {
        if self.tier.is_invalidation_channel(&message.channel) {
            let invalidation: SearchInvalidation = serde_json::from_str(&message.payload)?;
            self.l1.clear_search_memo();
            debug!(
                pattern = %invalidation.pattern,
                own = invalidation.origin == Some(self.origin),
                "Search memo cleared"
            );
            return Ok(SyncOutcome::SearchInvalidated);
        }
        let notification: ChangeNotification = serde_json::from_str(&message.payload)?;
        self.apply_notification(notification).await
    }

    pub async fn apply_notification(
        &self,
        notification: ChangeNotification,
    ) -> SyncResult<SyncOutcome> {
        let own = notification.origin == Some(self.origin);
        if self.l1.check_category(&notification.category).is_err() {
            return Err(SyncError::UnknownCategory {
                category: notification.category,
            });
        }

        let id = notification.document_id.clone();
        let operation = notification.operation;
        match operation {
            ChangeOperation::Create => {
                let doc = self.resolve_document(notification).await?;
                if !self.l1.insert_if_absent(doc)? {
                    debug!(%id, "Create for existing document ignored");
                }
            }
            // Own updates only restore a missing copy; a later local write must not be
            // overwritten by an older echo.
            ChangeOperation::Update if own => {
                let doc = self.resolve_document(notification).await?;
                self.l1.insert_if_absent(doc)?;
            }
            ChangeOperation::Update => {
                let doc = self.resolve_document(notification).await?;
                self.l1.merge(doc)?;
            }
            ChangeOperation::Delete => {
                self.l1.remove_from(&notification.category, &id);
            }
        }

        debug!(%id, %operation, own, "Change notification applied");
        let _ = self.events.send(CacheEvent::DocumentSynced {
            id: id.clone(),
            operation,
        });
        Ok(SyncOutcome::Applied { id, operation })
    }

    async fn resolve_document(
        &self,
        notification: ChangeNotification,
    ) -> SyncResult<CachedDocument> {
        let mut doc = match notification.document {
            Some(doc) => doc,
            None => self
                .tier
                .get_document(&notification.document_id)
                .await?
                .map(|envelope| envelope.document)
                .ok_or_else(|| SyncError::MissingDocument {
                    id: notification.document_id.clone(),
                    operation: notification.operation.to_string(),
                })?,
        };
        if doc.id != notification.document_id || doc.category != notification.category {
            return Err(SyncError::Mismatch {
                expected: format!("{}/{}", notification.category, notification.document_id),
                actual: format!("{}/{}", doc.category, doc.id),
            });
        }
        doc.sync_status = SyncStatus::Synced;
        Ok(doc)
    }

    /// Drains `subscription` until the channel closes.
    pub fn spawn(self, mut subscription: Subscription) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(origin = %self.origin, "Sync listener started");
            while let Some(message) = subscription.recv().await {
                self.handle(&message).await;
            }
            info!("Sync listener stopped");
        })
    }
}

impl std::fmt::Debug for SyncListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncListener")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
