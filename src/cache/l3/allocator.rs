use async_trait::async_trait;
use serde::Serialize;

use crate::document::{CachedDocument, StorageClass};

use super::error::ArchiveResult;

/// Per-allocation request options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationOptions {
    pub class: StorageClass,
    pub compress: bool,
}

/// Successful allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub class: StorageClass,
    /// Bytes charged against the class budget.
    pub stored_bytes: u64,
    pub compressed: bool,
}

/// Usage of one storage class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassUsage {
    pub class: StorageClass,
    pub documents: u64,
    pub used_bytes: u64,
    pub capacity_bytes: u64,
}

/// Allocator-wide usage as reported by its own accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveUsage {
    pub classes: Vec<ClassUsage>,
}

impl ArchiveUsage {
    pub fn documents(&self) -> u64 {
        self.classes.iter().map(|c| c.documents).sum()
    }

    pub fn used_bytes(&self) -> u64 {
        self.classes.iter().map(|c| c.used_bytes).sum()
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.classes.iter().map(|c| c.capacity_bytes).sum()
    }

    pub fn class(&self, class: StorageClass) -> Option<&ClassUsage> {
        self.classes.iter().find(|c| c.class == class)
    }
}

#[async_trait]
/// Capacity-limited archival storage partitioned into storage classes.
pub trait ArchivalAllocator: Send + Sync {
    /// Stores `doc` (plus `bytes`, the raw payload if any) in `options.class`.
    ///
    /// Re-allocating an id replaces the previous record and releases its bytes.
    async fn allocate(
        &self,
        doc: &CachedDocument,
        bytes: &[u8],
        options: AllocationOptions,
    ) -> ArchiveResult<Allocation>;

    /// Returns the archived document, if present.
    async fn retrieve(&self, id: &str) -> ArchiveResult<Option<CachedDocument>>;

    async fn usage_stats(&self) -> ArchiveUsage;
}
