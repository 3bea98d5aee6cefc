//! Thread-safe counters and the rolling response-time window.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

use super::types::{StatsOp, Tier, TierCounters, TierStats};
use crate::cache::l3::ArchiveUsage;

struct RecorderState {
    stats: TierStats,
    samples: VecDeque<f64>,
}

/// Accumulates [`TierStats`]; snapshots are computed on read.
pub struct StatsRecorder {
    state: Mutex<RecorderState>,
    window: usize,
}

impl StatsRecorder {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            state: Mutex::new(RecorderState {
                stats: TierStats::default(),
                samples: VecDeque::with_capacity(window),
            }),
            window,
        }
    }

    /// Records one completed operation and its latency.
    pub fn record(&self, op: StatsOp, elapsed: Duration) {
        let millis = elapsed.as_secs_f64() * 1_000.0;
        let mut state = self.state.lock();
        state.stats.total_operations += 1;
        if state.samples.len() == self.window {
            state.samples.pop_front();
        }
        state.samples.push_back(millis);
        tracing::trace!(op = op.as_str(), millis, "Operation recorded");
    }

    pub fn record_hit(&self, tier: Tier) {
        self.with_tier(tier, |c| c.hits += 1);
    }

    pub fn record_miss(&self, tier: Tier) {
        self.with_tier(tier, |c| c.misses += 1);
    }

    pub fn record_query(&self, tier: Tier) {
        self.with_tier(tier, |c| c.queries += 1);
    }

    pub fn record_sync_conflict(&self) {
        self.state.lock().stats.sync_conflicts += 1;
    }

    pub fn record_evictions(&self, count: u64) {
        self.state.lock().stats.evictions += count;
    }

    pub fn record_promotion(&self) {
        self.state.lock().stats.promotions += 1;
    }

    pub fn record_l2_failure(&self) {
        self.state.lock().stats.l2_failures += 1;
    }

    pub fn record_allocation_failure(&self) {
        self.state.lock().stats.l3_allocation_failures += 1;
    }

    pub fn record_snapshot_failure(&self) {
        self.state.lock().stats.snapshot_failures += 1;
    }

    /// Counts one document written to L2.
    pub fn record_l2_write(&self) {
        self.with_tier(Tier::L2, |c| c.documents += 1);
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.lock().stats.l2_connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().stats.l2_connected
    }

    pub fn set_l1_usage(&self, documents: u64, memory_bytes: u64) {
        self.with_tier(Tier::L1, |c| {
            c.documents = documents;
            c.memory_bytes = memory_bytes;
        });
    }

    pub fn set_l3_usage(&self, usage: ArchiveUsage) {
        let mut state = self.state.lock();
        state.stats.l3.documents = usage.documents();
        state.stats.l3.memory_bytes = usage.used_bytes();
        state.stats.l3_usage = usage;
    }

    /// Returns the current statistics with derived ratios filled in.
    pub fn snapshot(&self) -> TierStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        let hits = stats.l1.hits + stats.l2.hits;
        stats.hit_ratio = (hits as f64 / stats.total_operations.max(1) as f64).clamp(0.0, 1.0);
        stats.avg_response_time_ms = if state.samples.is_empty() {
            0.0
        } else {
            state.samples.iter().sum::<f64>() / state.samples.len() as f64
        };
        stats
    }

    /// Zeroes every counter except L2 connectivity and L3 usage.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let connected = state.stats.l2_connected;
        let usage = std::mem::take(&mut state.stats.l3_usage);
        state.stats = TierStats {
            l2_connected: connected,
            l3: TierCounters {
                documents: usage.documents(),
                memory_bytes: usage.used_bytes(),
                ..TierCounters::default()
            },
            l3_usage: usage,
            ..TierStats::default()
        };
        state.samples.clear();
    }

    pub fn samples(&self) -> usize {
        self.state.lock().samples.len()
    }

    fn with_tier(&self, tier: Tier, f: impl FnOnce(&mut TierCounters)) {
        let mut state = self.state.lock();
        let counters = match tier {
            Tier::L1 => &mut state.stats.l1,
            Tier::L2 => &mut state.stats.l2,
            Tier::L3 => &mut state.stats.l3,
        };
        f(counters);
    }
}

impl Default for StatsRecorder {
    fn default() -> Self {
        Self::new(crate::constants::RESPONSE_TIME_WINDOW)
    }
}

impl std::fmt::Debug for StatsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsRecorder")
            .field("window", &self.window)
            .field("samples", &self.samples())
            .finish()
    }
}
