use thiserror::Error;

use crate::cache::error::CacheError;
use crate::cache::l2::L2Error;

#[derive(Debug, Error)]
/// Reasons a change notification is dropped. Every variant counts as a sync conflict.
pub enum SyncError {
    /// Payload is not a valid notification (includes unknown operations).
    #[error("malformed notification: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown category '{category}'")]
    UnknownCategory { category: String },

    /// Create/update without a snapshot, and L2 no longer holds the document.
    #[error("document '{id}' not available for {operation}")]
    MissingDocument { id: String, operation: String },

    /// The attached document disagrees with the notification header.
    #[error("notification for '{expected}' carries document '{actual}'")]
    Mismatch { expected: String, actual: String },

    #[error("L1 rejected document: {0}")]
    Rejected(#[from] CacheError),

    #[error("L2 read failed: {0}")]
    L2(#[from] L2Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
