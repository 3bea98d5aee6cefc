//! Cached document model shared by every tier.

mod model;

pub use model::{
    ArchivedCachedDocument, CachedDocument, RiskLevel, StorageClass, SyncStatus, TierLocation,
};
