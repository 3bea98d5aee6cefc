//! Periodic stats sampling.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use super::recorder::StatsRecorder;
use super::types::TierStats;
use crate::cache::events::CacheEvent;
use crate::cache::l1::L1Store;
use crate::cache::l3::ArchivalAllocator;

/// Refreshes gauges that are not maintained inline and publishes snapshots.
pub struct StatsMonitor {
    l1: Arc<L1Store>,
    archive: Arc<dyn ArchivalAllocator>,
    recorder: Arc<StatsRecorder>,
    events: broadcast::Sender<CacheEvent>,
    running: Arc<AtomicBool>,
}

impl StatsMonitor {
    pub fn new(
        l1: Arc<L1Store>,
        archive: Arc<dyn ArchivalAllocator>,
        recorder: Arc<StatsRecorder>,
        events: broadcast::Sender<CacheEvent>,
    ) -> Self {
        Self {
            l1,
            archive,
            recorder,
            events,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Recomputes L1 memory and L3 usage, then returns the fresh snapshot.
    pub async fn sample(&self) -> TierStats {
        self.recorder
            .set_l1_usage(self.l1.len() as u64, self.l1.memory_estimate());
        let usage = self.archive.usage_stats().await;
        self.recorder.set_l3_usage(usage);
        self.recorder.snapshot()
    }

    /// Samples every `interval` and emits [`CacheEvent::Stats`] (no-op if already running).
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        // AcqRel: only one sampler may run per monitor.
        if self.running.swap(true, Ordering::AcqRel) {
            return tokio::spawn(async {});
        }

        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let stats = self.sample().await;
                debug!(
                    l1_documents = stats.l1.documents,
                    l3_documents = stats.l3.documents,
                    hit_ratio = stats.hit_ratio,
                    "Stats sampled"
                );
                // No receivers is fine.
                let _ = self.events.send(CacheEvent::Stats(Box::new(stats)));
            }
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
