//! lexcache library crate (used by the daemon, demos and integration tests).
//!
//! A tiered document cache for legal documents:
//!
//! - **L1**: in-process category collections plus a search memo ([`L1Store`]).
//! - **L2**: a shared key/value store with per-key TTL and pub/sub, reached through
//!   [`DistributedBackend`]. [`InMemoryBackend`] ships for single-node use and tests.
//! - **L3**: capacity-limited storage classes behind [`ArchivalAllocator`];
//!   [`BankedArchive`] is the bundled implementation.
//!
//! [`TieredCache`] coordinates the tiers: writes land in L1 and fan out to L2 and (for
//! cold or low-priority documents) L3, reads fall through and promote, and a sync
//! listener applies peer change notifications to L1.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`TieredCache`], [`TieredLookupResult`], [`CacheEvent`] - Orchestrator
//! - [`CachedDocument`], [`RiskLevel`], [`StorageClass`] - Document model
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//!
//! ## Search
//! - [`SearchFilters`], [`SearchOptions`], [`SearchResultEntry`] - Query shaping
//! - [`relevance_score`] - Heuristic ranking formula
//!
//! ## Test/Mock Support
//! [`ManualClock`] and failure toggles on [`InMemoryBackend`] are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod clock;
pub mod config;
pub mod constants;
pub mod document;
pub mod hashing;
pub mod scoring;
pub mod stats;
pub mod storage;
pub mod sync;

pub use cache::{
    Allocation, AllocationOptions, ArchivalAllocator, ArchiveConfig, ArchiveError, ArchiveUsage,
    BankedArchive, CacheError, CacheEvent, CacheResult, DistributedBackend, DistributedTier,
    InMemoryBackend, L1Config, L1Store, L2Config, L2Error, TieredCache, TieredCacheHandle,
    TieredLookupResult, TieringPolicy,
};
#[cfg(any(test, feature = "mock"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use config::{Config, ConfigError};
pub use document::{CachedDocument, RiskLevel, StorageClass, SyncStatus, TierLocation};
pub use hashing::{hash_parts, hash_to_hex};
pub use scoring::{
    MatchKind, SearchFilters, SearchOptions, SearchResultEntry, relevance_score,
};
pub use stats::{StatsConfig, TierStats};
pub use storage::{L1Snapshot, SnapshotError};
pub use sync::{ChangeNotification, ChangeOperation, SyncListener};
