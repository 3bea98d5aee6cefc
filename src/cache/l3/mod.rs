//! L3 archival tier: capacity-limited storage classes for overflow documents.

pub mod allocator;
pub mod archive;
pub mod bank;
pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use allocator::{Allocation, AllocationOptions, ArchivalAllocator, ArchiveUsage, ClassUsage};
pub use archive::{ArchiveRecord, BankedArchive};
pub use bank::{select_storage_class, should_archive};
pub use config::ArchiveConfig;
pub use error::{ArchiveError, ArchiveResult};
