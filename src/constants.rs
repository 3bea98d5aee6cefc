//! Cross-cutting, shared constants.
//!
//! Tunable thresholds live in the per-module config structs; the values here are their
//! defaults plus a few fixed formula weights that must agree across modules.

/// Pseudo-category reserved for memoized search results. Never scanned by search and
/// never accepted by `store`.
pub const SEARCH_RESULTS_CATEGORY: &str = "search_results";

/// Categories created by default in L1.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "contract",
    "evidence",
    "brief",
    "precedent",
    "case",
    "statute",
];

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

pub const DEFAULT_L1_MAX_SIZE_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_PER_DOCUMENT_BYTES: u64 = 1024;
pub const DEFAULT_EVICTION_THRESHOLD: f64 = 0.8;
pub const DEFAULT_EVICTION_FRACTION: f64 = 0.25;

/// Documents at or above this priority are exempt from eviction.
pub const EVICTION_EXEMPT_PRIORITY: u8 = 200;
/// Documents above this priority are archived to the fastest storage class.
pub const FAST_CLASS_PRIORITY: u8 = 200;

pub const DEFAULT_PROMOTION_ACCESS_THRESHOLD: u64 = 3;
pub const DEFAULT_SIZE_FLOOR_BYTES: u64 = 100_000;
pub const DEFAULT_PRIORITY_FLOOR: u8 = 50;
pub const DEFAULT_AGE_FLOOR_DAYS: i64 = 7;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

pub const DEFAULT_KEY_PREFIX: &str = "lexcache:";
pub const DEFAULT_DOCUMENT_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_SEARCH_TTL_SECS: u64 = 5 * 60;
pub const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 30;

pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 5;
/// Number of response-time samples kept by the stats recorder.
pub const RESPONSE_TIME_WINDOW: usize = 1000;

pub const DEFAULT_COMPRESSION_FLOOR_BYTES: u64 = 4 * 1024;
