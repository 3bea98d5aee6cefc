use std::time::Duration;

use crate::constants::{
    DEFAULT_AGE_FLOOR_DAYS, DEFAULT_CATEGORIES, DEFAULT_EVICTION_FRACTION,
    DEFAULT_EVICTION_THRESHOLD, DEFAULT_L1_MAX_SIZE_BYTES, DEFAULT_PER_DOCUMENT_BYTES,
    DEFAULT_PRIORITY_FLOOR, DEFAULT_PROMOTION_ACCESS_THRESHOLD, DEFAULT_SEARCH_LIMIT,
    DEFAULT_SIZE_FLOOR_BYTES, MILLIS_PER_DAY, SEARCH_RESULTS_CATEGORY,
};

use super::error::{CacheError, CacheResult};

pub const DEFAULT_SEARCH_MEMO_CAPACITY: u64 = 1_000;

/// Sizing and eviction settings for the in-process tier.
#[derive(Debug, Clone)]
pub struct L1Config {
    /// Category collections created at startup.
    pub categories: Vec<String>,
    /// Memory cap used by the eviction trigger. Default: 100 MiB.
    pub max_size_bytes: u64,
    /// Fixed per-document estimate used for memory accounting. Default: `1024`.
    pub per_document_bytes: u64,
    /// Eviction runs when `estimate > eviction_threshold * max_size_bytes`. Default: `0.8`.
    pub eviction_threshold: f64,
    /// Share of eligible candidates evicted per pass. Default: `0.25`.
    pub eviction_fraction: f64,
    /// Max memoized search result sets.
    pub search_memo_capacity: u64,
}

impl Default for L1Config {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            max_size_bytes: DEFAULT_L1_MAX_SIZE_BYTES,
            per_document_bytes: DEFAULT_PER_DOCUMENT_BYTES,
            eviction_threshold: DEFAULT_EVICTION_THRESHOLD,
            eviction_fraction: DEFAULT_EVICTION_FRACTION,
            search_memo_capacity: DEFAULT_SEARCH_MEMO_CAPACITY,
        }
    }
}

impl L1Config {
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    pub fn eviction_threshold(mut self, threshold: f64) -> Self {
        self.eviction_threshold = threshold;
        self
    }

    /// Byte estimate above which `store` runs an eviction pass.
    #[inline]
    pub fn eviction_trigger_bytes(&self) -> f64 {
        self.eviction_threshold * self.max_size_bytes as f64
    }

    pub fn validate(&self) -> CacheResult<()> {
        if self.categories.is_empty() {
            return Err(CacheError::Config {
                reason: "at least one category is required".to_string(),
            });
        }
        if let Some(reserved) = self
            .categories
            .iter()
            .find(|c| c.as_str() == SEARCH_RESULTS_CATEGORY)
        {
            return Err(CacheError::ReservedCategory {
                category: reserved.clone(),
            });
        }
        if self.per_document_bytes == 0 {
            return Err(CacheError::Config {
                reason: "per_document_bytes must be > 0".to_string(),
            });
        }
        if !(self.eviction_threshold > 0.0) {
            return Err(CacheError::Config {
                reason: format!(
                    "eviction_threshold ({}) must be > 0",
                    self.eviction_threshold
                ),
            });
        }
        if !(self.eviction_fraction > 0.0 && self.eviction_fraction <= 1.0) {
            return Err(CacheError::Config {
                reason: format!(
                    "eviction_fraction ({}) must be in (0, 1]",
                    self.eviction_fraction
                ),
            });
        }
        Ok(())
    }
}

/// Promotion, archival and search thresholds.
#[derive(Debug, Clone)]
pub struct TieringPolicy {
    /// L3 hits are promoted to L1 once the accumulated access count exceeds this.
    pub promotion_access_threshold: u64,
    /// Overflow heuristic: archive when `size > size_floor_bytes`.
    pub size_floor_bytes: u64,
    /// Overflow heuristic: archive when `priority < priority_floor`.
    pub priority_floor: u8,
    /// Overflow heuristic: archive when older than this.
    pub age_floor: Duration,
    /// Default result limit for `search`.
    pub search_result_limit: usize,
}

impl Default for TieringPolicy {
    fn default() -> Self {
        Self {
            promotion_access_threshold: DEFAULT_PROMOTION_ACCESS_THRESHOLD,
            size_floor_bytes: DEFAULT_SIZE_FLOOR_BYTES,
            priority_floor: DEFAULT_PRIORITY_FLOOR,
            age_floor: Duration::from_millis((DEFAULT_AGE_FLOOR_DAYS * MILLIS_PER_DAY) as u64),
            search_result_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl TieringPolicy {
    #[inline]
    pub fn age_floor_millis(&self) -> i64 {
        i64::try_from(self.age_floor.as_millis()).unwrap_or(i64::MAX)
    }

    pub fn validate(&self) -> CacheResult<()> {
        if self.search_result_limit == 0 {
            return Err(CacheError::Config {
                reason: "search_result_limit must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
