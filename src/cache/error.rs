use thiserror::Error;

use crate::storage::SnapshotError;

#[derive(Debug, Error)]
/// Errors surfaced by the orchestrator.
///
/// Only the synchronous L1 step of `store` and engine startup can fail; slower tiers
/// degrade silently.
pub enum CacheError {
    /// The document names a category with no L1 collection.
    #[error("unknown category '{category}'")]
    InvalidCategory { category: String },

    /// The document names the pseudo-category reserved for search results.
    #[error("category '{category}' is reserved")]
    ReservedCategory { category: String },

    /// Document ids must be non-empty.
    #[error("document id must not be empty")]
    EmptyId,

    /// Invalid configuration.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// L1 snapshot could not be loaded at startup.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Convenience result type for orchestrator operations.
pub type CacheResult<T> = Result<T, CacheError>;
