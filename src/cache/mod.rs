//! Tiered document cache: L1 in-process, L2 distributed, L3 archival.

pub mod config;
pub mod error;
pub mod events;
pub mod eviction;
pub mod l1;
pub mod l2;
pub mod l3;
pub mod tiered;
pub mod types;

#[cfg(test)]
mod l1_tests;

pub use config::{L1Config, TieringPolicy};
pub use error::{CacheError, CacheResult};
pub use events::CacheEvent;
pub use eviction::{retention_score, select_victims};
pub use l1::{L1Insert, L1Store};
pub use l2::{
    DistributedBackend, DistributedTier, DocumentEnvelope, InMemoryBackend, L2Config, L2Error,
    L2Result,
};
pub use l3::{
    Allocation, AllocationOptions, ArchivalAllocator, ArchiveConfig, ArchiveError, ArchiveResult,
    ArchiveUsage, BankedArchive, ClassUsage, select_storage_class, should_archive,
};
pub use tiered::{TieredCache, TieredCacheHandle};
pub use types::TieredLookupResult;
