use serde::Serialize;

use crate::cache::l3::ArchiveUsage;

/// Operations timed by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsOp {
    Store,
    Get,
    Search,
}

impl StatsOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsOp::Store => "store",
            StatsOp::Get => "get",
            StatsOp::Search => "search",
        }
    }
}

/// Tier a lookup was answered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    L1,
    L2,
    L3,
}

/// Counters for one tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCounters {
    pub documents: u64,
    pub hits: u64,
    pub misses: u64,
    /// Searches answered by this tier.
    pub queries: u64,
    pub memory_bytes: u64,
}

/// Point-in-time engine statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStats {
    pub l1: TierCounters,
    pub l2: TierCounters,
    pub l3: TierCounters,
    /// Last known L2 reachability.
    pub l2_connected: bool,
    /// Per-class usage reported by the archival allocator.
    pub l3_usage: ArchiveUsage,
    /// `(l1.hits + l2.hits) / max(1, total_operations)`, clamped to `[0, 1]`.
    pub hit_ratio: f64,
    /// Mean over the response-time window.
    pub avg_response_time_ms: f64,
    pub total_operations: u64,
    /// Change notifications that could not be applied.
    pub sync_conflicts: u64,
    pub evictions: u64,
    pub promotions: u64,
    pub l2_failures: u64,
    pub l3_allocation_failures: u64,
    /// L1 snapshots discarded at startup because they could not be decoded.
    pub snapshot_failures: u64,
}
