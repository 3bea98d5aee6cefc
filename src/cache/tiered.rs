//! Tier orchestrator: L1 in-process, L2 distributed, L3 archival.
//!
//! Writes land in L1 synchronously, then fan out to L2 (persist + publish) and, when
//! the overflow heuristic holds, to L3. Reads fall through L1 → L2 → L3 and promote on
//! the way back. Only input validation surfaces as an error; slower tiers degrade to
//! logged warnings and counters.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::config::{L1Config, TieringPolicy};
use super::error::{CacheError, CacheResult};
use super::events::{CacheEvent, EVENT_CHANNEL_CAPACITY};
use super::eviction::select_victims;
use super::l1::{L1Insert, L1Store};
use super::l2::{DistributedBackend, DistributedTier, L2Error};
use super::l3::{
    AllocationOptions, ArchivalAllocator, ArchiveConfig, select_storage_class, should_archive,
};
use super::types::TieredLookupResult;
use crate::clock::Clock;
use crate::config::Config;
use crate::constants::SEARCH_RESULTS_CATEGORY;
use crate::document::{CachedDocument, SyncStatus, TierLocation};
use crate::scoring::{DocumentMatcher, SearchFilters, SearchOptions, SearchResultEntry, rank};
use crate::scoring::search_cache_key;
use crate::stats::{StatsConfig, StatsMonitor, StatsOp, StatsRecorder, Tier, TierStats};
use crate::storage::{L1Snapshot, SnapshotError, load_snapshot, save_snapshot};
use crate::sync::{ChangeNotification, ChangeOperation, SearchInvalidation, SyncListener};

/// Shared handle to a running engine.
pub type TieredCacheHandle = Arc<TieredCache>;

/// The caching engine.
pub struct TieredCache {
    l1: Arc<L1Store>,
    l2: DistributedTier,
    l3: Arc<dyn ArchivalAllocator>,
    clock: Arc<dyn Clock>,
    recorder: Arc<StatsRecorder>,
    monitor: Arc<StatsMonitor>,
    events: broadcast::Sender<CacheEvent>,
    l1_config: L1Config,
    policy: TieringPolicy,
    archive_config: ArchiveConfig,
    stats_config: StatsConfig,
    snapshot_path: Option<PathBuf>,
    origin: Uuid,
    /// L3 reads since each document was archived.
    cold_reads: Mutex<HashMap<String, u64>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
    destroyed: AtomicBool,
}

impl std::fmt::Debug for TieredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("origin", &self.origin)
            .field("l1", &self.l1)
            .field("key_prefix", &self.l2.config().key_prefix)
            .field("destroyed", &self.destroyed.load(Ordering::Acquire))
            .finish()
    }
}

impl TieredCache {
    /// Validates `config` and wires the tiers. Background tasks start with [`Self::start`].
    pub fn new(
        config: Config,
        backend: Arc<dyn DistributedBackend>,
        archive: Arc<dyn ArchivalAllocator>,
        clock: Arc<dyn Clock>,
    ) -> CacheResult<TieredCacheHandle> {
        config.validate().map_err(|e| CacheError::Config {
            reason: e.to_string(),
        })?;

        let l1 = Arc::new(L1Store::new(&config.l1, config.l2.search_ttl));
        let l2 = DistributedTier::new(backend, config.l2);
        let recorder = Arc::new(StatsRecorder::new(config.stats.window));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let monitor = Arc::new(StatsMonitor::new(
            Arc::clone(&l1),
            Arc::clone(&archive),
            Arc::clone(&recorder),
            events.clone(),
        ));

        Ok(Arc::new(Self {
            l1,
            l2,
            l3: archive,
            clock,
            recorder,
            monitor,
            events,
            l1_config: config.l1,
            policy: config.tiering,
            archive_config: config.archive,
            stats_config: config.stats,
            snapshot_path: config.snapshot_path,
            origin: Uuid::new_v4(),
            cold_reads: Mutex::new(HashMap::new()),
            tasks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
        }))
    }

    /// Loads the L1 snapshot, starts the sync listener, stats monitor and L2 health
    /// refresher, then emits [`CacheEvent::Initialized`]. Idempotent.
    pub async fn start(&self) -> CacheResult<()> {
        // AcqRel: only the first caller performs startup.
        if self.started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        if let Some(ref path) = self.snapshot_path {
            match load_snapshot(path).await {
                Ok(snapshot) => {
                    let restored = self.restore(snapshot);
                    info!(restored, path = %path.display(), "L1 restored from snapshot");
                }
                Err(SnapshotError::Decode(reason)) => {
                    warn!(path = %path.display(), %reason, "Discarding unreadable L1 snapshot");
                    self.recorder.record_snapshot_failure();
                }
                Err(e) => {
                    // Let a later call retry once the file is readable.
                    self.started.store(false, Ordering::Release);
                    return Err(e.into());
                }
            }
        }

        let connected = self.l2.ping().await.is_ok();
        self.recorder.set_connected(connected);
        if !connected {
            warn!("L2 unreachable at startup, continuing degraded");
        }

        let mut tasks = Vec::with_capacity(3);
        match self.l2.subscribe().await {
            Ok(subscription) => {
                let listener = SyncListener::new(
                    Arc::clone(&self.l1),
                    self.l2.clone(),
                    Arc::clone(&self.recorder),
                    self.events.clone(),
                    self.origin,
                );
                tasks.push(listener.spawn(subscription));
            }
            Err(e) => warn!(error = %e, "Sync listener disabled"),
        }
        tasks.push(Arc::clone(&self.monitor).spawn(self.stats_config.interval));
        tasks.push(self.spawn_health_refresher());
        self.tasks.lock().extend(tasks);

        info!(origin = %self.origin, connected, "Tiered cache started");
        let _ = self.events.send(CacheEvent::Initialized);
        Ok(())
    }

    pub fn origin(&self) -> Uuid {
        self.origin
    }

    pub fn l1(&self) -> &L1Store {
        &self.l1
    }

    pub fn l2(&self) -> &DistributedTier {
        &self.l2
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Stores a document (plus optional raw bytes).
    ///
    /// The L1 write completes before this returns an error or spawns the L2/L3 work.
    /// The spawned work is awaited, so dropping the returned future does not cancel it.
    #[instrument(skip(self, document, raw_data), fields(id = %document.id, category = %document.category))]
    pub async fn store(
        self: &Arc<Self>,
        document: CachedDocument,
        raw_data: Option<Vec<u8>>,
    ) -> CacheResult<()> {
        let started = Instant::now();
        if document.id.is_empty() {
            return Err(CacheError::EmptyId);
        }
        self.l1.check_category(&document.category)?;

        let doc = self.normalize(document, raw_data.as_deref());
        self.maybe_evict();
        let outcome = self.l1.insert(doc.clone())?;
        debug!(?outcome, "Stored in L1");
        let _ = self.events.send(CacheEvent::DocumentStored { id: doc.id.clone() });

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.write_behind(doc, raw_data, outcome).await });
        if let Err(e) = handle.await {
            warn!(error = %e, "Write-behind task failed");
        }

        self.recorder.record(StatsOp::Store, started.elapsed());
        Ok(())
    }

    /// Returns the document, searching every tier. Not-found is `None`.
    pub async fn get(&self, id: &str) -> Option<CachedDocument> {
        self.lookup(id).await.into_document()
    }

    /// Like [`Self::get`], reporting which tier answered.
    #[instrument(skip(self))]
    pub async fn lookup(&self, id: &str) -> TieredLookupResult {
        let started = Instant::now();
        let result = self.lookup_tiers(id).await;
        self.recorder.record(StatsOp::Get, started.elapsed());
        result
    }

    async fn lookup_tiers(&self, id: &str) -> TieredLookupResult {
        let now = self.clock.now_millis();

        if let Some(doc) = self.l1.touch(id, now) {
            self.recorder.record_hit(Tier::L1);
            debug!("L1 hit");
            return TieredLookupResult::HitL1(doc);
        }
        self.recorder.record_miss(Tier::L1);

        debug!("L1 miss, checking L2");
        match self.l2.get_document(id).await {
            Ok(Some(envelope)) => {
                self.recorder.record_hit(Tier::L2);
                let mut doc = envelope.document;
                doc.touch(now);
                if self.promote(&doc) {
                    doc.location = TierLocation::L1;
                } else {
                    doc.location = TierLocation::L2;
                }
                info!(category = %doc.category, "L2 hit");
                return TieredLookupResult::HitL2(doc);
            }
            Ok(None) => self.recorder.record_miss(Tier::L2),
            Err(e) => {
                self.record_l2_error("get", &e);
                self.recorder.record_miss(Tier::L2);
            }
        }

        debug!("L2 miss, checking L3");
        match self.l3.retrieve(id).await {
            Ok(Some(mut doc)) => {
                self.recorder.record_hit(Tier::L3);
                let reads = {
                    let mut cold_reads = self.cold_reads.lock();
                    let reads = cold_reads.entry(id.to_string()).or_insert(0);
                    *reads += 1;
                    *reads
                };
                doc.access_count = doc.access_count.saturating_add(reads);
                doc.cache_timestamp = now;
                if doc.access_count > self.policy.promotion_access_threshold
                    && self.promote(&doc)
                {
                    self.cold_reads.lock().remove(id);
                    doc.location = TierLocation::L1;
                }
                info!(
                    access_count = doc.access_count,
                    location = ?doc.location,
                    "L3 hit"
                );
                TieredLookupResult::HitL3(doc)
            }
            Ok(None) => {
                self.recorder.record_miss(Tier::L3);
                debug!("Miss in every tier");
                TieredLookupResult::Miss
            }
            Err(e) => {
                warn!(error = %e, "L3 retrieve failed");
                self.recorder.record_miss(Tier::L3);
                TieredLookupResult::Miss
            }
        }
    }

    /// Ranked search over every local category collection.
    ///
    /// Results are memoized in L1 and L2 under a BLAKE3 key of the request.
    #[instrument(skip(self, filters, options), fields(query_len = query.len()))]
    pub async fn search(
        &self,
        query: &str,
        filters: SearchFilters,
        options: SearchOptions,
    ) -> Vec<SearchResultEntry> {
        let started = Instant::now();
        let key = search_cache_key(query, &filters, &options);

        if let Some(cached) = self.l1.memo_get(&key) {
            self.recorder.record_query(Tier::L1);
            self.recorder.record(StatsOp::Search, started.elapsed());
            debug!(results = cached.len(), "Search memo hit");
            return cached.as_ref().clone();
        }

        match self.l2.get_search(&key).await {
            Ok(Some(results)) => {
                self.recorder.record_query(Tier::L2);
                self.l1.memo_insert(key, Arc::new(results.clone()));
                self.recorder.record(StatsOp::Search, started.elapsed());
                debug!(results = results.len(), "L2 search hit");
                return results;
            }
            Ok(None) => {}
            Err(e) => self.record_l2_error("search", &e),
        }

        let limit = if options.limit == 0 {
            self.policy.search_result_limit
        } else {
            options.limit
        };
        let matcher = DocumentMatcher::new(query, &filters, self.clock.now_millis());
        let candidates = self.l1.scan(
            |category| category != SEARCH_RESULTS_CATEGORY && filters.includes_category(category),
            |doc| matcher.matches(doc),
        );
        let scored = candidates
            .iter()
            .map(|doc| matcher.score(doc, options.highlight))
            .collect();
        let results = rank(scored, limit);
        self.recorder.record_query(Tier::L1);

        if options.cache_results {
            self.l1.memo_insert(key.clone(), Arc::new(results.clone()));
            if let Err(e) = self.l2.put_search(&key, &results).await {
                self.record_l2_error("cache search", &e);
            }
        }

        self.recorder.record(StatsOp::Search, started.elapsed());
        debug!(
            matched = candidates.len(),
            returned = results.len(),
            "Search scanned L1"
        );
        results
    }

    /// Drops cached search results matching `pattern` (default `*`) locally, in L2, and
    /// on peers. Documents are untouched. Returns the number of L2 keys deleted.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, pattern: Option<&str>) -> u64 {
        let pattern = pattern.unwrap_or("*");
        self.l1.clear_search_memo();

        let deleted = match self.l2.invalidate_searches(pattern).await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.record_l2_error("invalidate", &e);
                0
            }
        };

        let message = SearchInvalidation {
            pattern: pattern.to_string(),
            timestamp: self.clock.now_millis(),
            origin: Some(self.origin),
        };
        if let Err(e) = self.l2.publish_search_invalidation(&message).await {
            self.record_l2_error("publish invalidation", &e);
        }

        info!(deleted, "Search results invalidated");
        deleted
    }

    /// Removes a document from L1 and L2 and notifies peers. L3 keeps its archive copy.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> bool {
        let local = self.l1.remove(id);
        self.cold_reads.lock().remove(id);
        let category = match local {
            Some(ref doc) => Some(doc.category.clone()),
            None => match self.l2.get_document(id).await {
                Ok(envelope) => envelope.map(|e| e.document.category),
                Err(e) => {
                    self.record_l2_error("remove lookup", &e);
                    None
                }
            },
        };

        let removed_l2 = match self.l2.delete_document(id).await {
            Ok(removed) => removed,
            Err(e) => {
                self.record_l2_error("remove", &e);
                false
            }
        };

        if let Some(ref category) = category {
            let notification =
                ChangeNotification::delete(id, category, self.clock.now_millis(), Some(self.origin));
            if let Err(e) = self.l2.publish_change(&notification).await {
                self.record_l2_error("publish delete", &e);
            }
        }
        local.is_some() || removed_l2
    }

    /// Empties L1 and this engine's L2 namespace and resets stats. L3 is untouched.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        self.l1.clear();
        self.cold_reads.lock().clear();
        match self.l2.clear_namespace().await {
            Ok(deleted) => debug!(deleted, "L2 namespace cleared"),
            Err(e) => self.record_l2_error("clear", &e),
        }
        self.recorder.reset();
        info!("Cache cleared");
    }

    /// Immutable statistics snapshot.
    pub fn stats(&self) -> TierStats {
        self.recorder
            .set_l1_usage(self.l1.len() as u64, self.l1.memory_estimate());
        self.recorder.snapshot()
    }

    /// Evicts the lowest-retention share of eligible L1 documents; returns their ids.
    pub fn run_eviction_pass(&self) -> Vec<String> {
        let victims = select_victims(&self.l1.documents(), self.l1_config.eviction_fraction);
        if victims.is_empty() {
            debug!("No eviction candidates");
            return Vec::new();
        }
        let evicted = self.l1.evict(&victims);
        self.recorder.record_evictions(evicted as u64);
        info!(
            evicted,
            remaining = self.l1.len(),
            "L1 eviction pass completed"
        );
        victims.into_iter().map(|(_, id)| id).collect()
    }

    /// Stops background tasks, flushes the snapshot and closes L2. Idempotent.
    pub async fn destroy(&self) -> CacheResult<()> {
        // AcqRel: a second caller must observe the first shutdown and return.
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        for task in self.tasks.lock().drain(..) {
            task.abort();
        }

        let flushed = match self.snapshot_path {
            Some(ref path) => {
                let snapshot = L1Snapshot::new(self.clock.now_millis(), self.l1.documents());
                save_snapshot(path, &snapshot).await.map(|_| ())
            }
            None => Ok(()),
        };

        if let Err(e) = self.l2.close().await {
            warn!(error = %e, "L2 close failed");
        }
        self.recorder.set_connected(false);
        info!("Tiered cache destroyed");
        Ok(flushed?)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn cold_read_count(&self, id: &str) -> u64 {
        self.cold_reads.lock().get(id).copied().unwrap_or(0)
    }

    fn normalize(&self, mut doc: CachedDocument, raw_data: Option<&[u8]>) -> CachedDocument {
        if doc.cache_timestamp == 0 {
            doc.cache_timestamp = self.clock.now_millis();
        }
        if doc.size == 0 {
            doc.size = raw_data.map_or_else(|| doc.payload_len(), |raw| raw.len() as u64);
        }
        doc.confidence_level = if doc.confidence_level.is_nan() {
            0.0
        } else {
            doc.confidence_level.clamp(0.0, 1.0)
        };
        doc.location = TierLocation::L1;
        doc.sync_status = SyncStatus::Pending;
        doc.compressed = false;
        doc.archive_class = None;
        doc
    }

    fn maybe_evict(&self) {
        let estimate = self.l1.memory_estimate() as f64;
        if estimate > self.l1_config.eviction_trigger_bytes() {
            debug!(estimate, "L1 over eviction threshold");
            self.run_eviction_pass();
        }
    }

    /// Inserts a copy fetched from a slower tier into L1.
    fn promote(&self, doc: &CachedDocument) -> bool {
        self.maybe_evict();
        match self.l1.insert(doc.clone()) {
            Ok(_) => {
                self.recorder.record_promotion();
                debug!(id = %doc.id, "Promoted to L1");
                true
            }
            Err(e) => {
                warn!(id = %doc.id, error = %e, "Promotion skipped");
                false
            }
        }
    }

    async fn write_behind(&self, doc: CachedDocument, raw_data: Option<Vec<u8>>, outcome: L1Insert) {
        match self.l2.put_document(&doc, raw_data.as_deref()).await {
            Ok(()) => {
                self.recorder.record_l2_write();
                self.mark_sync_status(&doc, SyncStatus::Synced);
                let operation = match outcome {
                    L1Insert::Created => ChangeOperation::Create,
                    L1Insert::Replaced => ChangeOperation::Update,
                };
                let notification = ChangeNotification::for_document(
                    operation,
                    &doc,
                    self.clock.now_millis(),
                    self.origin,
                );
                if let Err(e) = self.l2.publish_change(&notification).await {
                    self.record_l2_error("publish", &e);
                }
            }
            Err(e) => {
                self.record_l2_error("persist", &e);
                self.mark_sync_status(&doc, SyncStatus::Dirty);
            }
        }

        if should_archive(&doc, &self.policy, self.clock.now_millis()) {
            self.archive(&doc, raw_data.as_deref().unwrap_or_default()).await;
        }
    }

    fn mark_sync_status(&self, doc: &CachedDocument, status: SyncStatus) {
        self.l1.update(&doc.category, &doc.id, |stored| {
            stored.sync_status = status;
        });
    }

    async fn archive(&self, doc: &CachedDocument, raw: &[u8]) -> bool {
        let class = select_storage_class(doc);
        let compress = self
            .archive_config
            .should_compress(doc.payload_len() + raw.len() as u64);
        match self
            .l3
            .allocate(doc, raw, AllocationOptions { class, compress })
            .await
        {
            Ok(allocation) => {
                self.l1.update(&doc.category, &doc.id, |stored| {
                    stored.compressed = allocation.compressed;
                    stored.archive_class = Some(allocation.class);
                });
                self.cold_reads.lock().remove(&doc.id);
                debug!(
                    %class,
                    stored_bytes = allocation.stored_bytes,
                    compressed = allocation.compressed,
                    "Archived to L3"
                );
                true
            }
            Err(e) => {
                warn!(%class, error = %e, "L3 allocation failed");
                self.recorder.record_allocation_failure();
                false
            }
        }
    }

    fn restore(&self, snapshot: L1Snapshot) -> usize {
        snapshot
            .documents
            .into_iter()
            .filter(|doc| match self.l1.insert_if_absent(doc.clone()) {
                Ok(inserted) => inserted,
                Err(e) => {
                    warn!(id = %doc.id, error = %e, "Snapshot document skipped");
                    false
                }
            })
            .count()
    }

    fn record_l2_error(&self, operation: &'static str, error: &L2Error) {
        warn!(operation, error = %error, "L2 operation failed");
        self.recorder.record_l2_failure();
    }

    fn spawn_health_refresher(&self) -> JoinHandle<()> {
        let l2 = self.l2.clone();
        let recorder = Arc::clone(&self.recorder);
        let interval = self.l2.config().health_interval.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick fires immediately; startup already pinged.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let connected = l2.ping().await.is_ok();
                if connected != recorder.is_connected() {
                    if connected {
                        info!("L2 connection restored");
                    } else {
                        warn!("L2 connection lost");
                    }
                }
                recorder.set_connected(connected);
            }
        })
    }
}

impl Drop for TieredCache {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}
