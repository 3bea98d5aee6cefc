use thiserror::Error;

use crate::document::StorageClass;

#[derive(Debug, Error)]
/// Errors returned by archival allocators.
pub enum ArchiveError {
    /// The storage class has no room for the record.
    #[error("storage class '{class}' full: requested {requested} bytes, {available} available")]
    CapacityExceeded {
        class: StorageClass,
        requested: u64,
        available: u64,
    },

    /// The class is not configured on this allocator.
    #[error("storage class '{class}' is not configured")]
    UnknownClass { class: StorageClass },

    #[error("failed to encode archive record: {reason}")]
    Encode { reason: String },

    #[error("failed to decode archive record: {reason}")]
    Decode { reason: String },

    #[error("compression I/O error: {0}")]
    Compression(#[from] std::io::Error),

    /// Remote allocator unreachable.
    #[error("archive unavailable: {reason}")]
    Unavailable { reason: String },
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
