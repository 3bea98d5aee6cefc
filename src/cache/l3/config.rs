use std::collections::BTreeMap;

use crate::constants::DEFAULT_COMPRESSION_FLOOR_BYTES;
use crate::document::StorageClass;

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Byte budget per storage class.
    pub capacities: BTreeMap<StorageClass, u64>,
    /// Request compression for records above `compression_floor_bytes`.
    pub compress_archives: bool,
    pub compression_floor_bytes: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        let capacities = [
            (StorageClass::Fast, 16 * MIB),
            (StorageClass::Pattern, 64 * MIB),
            (StorageClass::Logic, 64 * MIB),
            (StorageClass::Durable, 256 * MIB),
        ]
        .into_iter()
        .collect();
        Self {
            capacities,
            compress_archives: true,
            compression_floor_bytes: DEFAULT_COMPRESSION_FLOOR_BYTES,
        }
    }
}

impl ArchiveConfig {
    pub fn capacity(mut self, class: StorageClass, bytes: u64) -> Self {
        self.capacities.insert(class, bytes);
        self
    }

    pub fn compress_archives(mut self, enabled: bool) -> Self {
        self.compress_archives = enabled;
        self
    }

    /// Whether a record of `len` bytes should be compressed.
    #[inline]
    pub fn should_compress(&self, len: u64) -> bool {
        self.compress_archives && len > self.compression_floor_bytes
    }
}
