//! In-process [`ArchivalAllocator`] with per-class byte budgets.
//!
//! Records are `rkyv` bytes, optionally gzip-compressed. Budgets are charged with the
//! stored (post-compression) size.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};

use async_trait::async_trait;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use parking_lot::Mutex;
use rkyv::Archive;
use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use tracing::debug;

use super::allocator::{
    Allocation, AllocationOptions, ArchivalAllocator, ArchiveUsage, ClassUsage,
};
use super::config::ArchiveConfig;
use super::error::{ArchiveError, ArchiveResult};
use crate::document::{CachedDocument, StorageClass, TierLocation};

/// Archived payload: the document plus its raw bytes (possibly empty).
#[derive(Archive, rkyv::Serialize, rkyv::Deserialize, Debug, Clone, PartialEq)]
pub struct ArchiveRecord {
    pub document: CachedDocument,
    pub raw: Vec<u8>,
}

impl ArchiveRecord {
    pub fn encode(&self, compress: bool) -> ArchiveResult<Vec<u8>> {
        let bytes = rkyv::to_bytes::<RkyvError>(self).map_err(|e| ArchiveError::Encode {
            reason: e.to_string(),
        })?;
        if !compress {
            return Ok(bytes.to_vec());
        }
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes)?;
        Ok(encoder.finish()?)
    }

    pub fn decode(bytes: &[u8], compressed: bool) -> ArchiveResult<Self> {
        let mut aligned = AlignedVec::<16>::new();
        if compressed {
            let mut inflated = Vec::new();
            GzDecoder::new(bytes).read_to_end(&mut inflated)?;
            aligned.extend_from_slice(&inflated);
        } else {
            aligned.extend_from_slice(bytes);
        }
        rkyv::from_bytes::<ArchiveRecord, RkyvError>(&aligned).map_err(|e| ArchiveError::Decode {
            reason: e.to_string(),
        })
    }
}

struct StoredRecord {
    class: StorageClass,
    bytes: Vec<u8>,
    compressed: bool,
}

#[derive(Default, Clone, Copy)]
struct ClassLedger {
    documents: u64,
    used_bytes: u64,
}

#[derive(Default)]
struct ArchiveState {
    records: HashMap<String, StoredRecord>,
    ledgers: BTreeMap<StorageClass, ClassLedger>,
}

impl ArchiveState {
    fn release(&mut self, record: &StoredRecord) {
        let ledger = self.ledgers.entry(record.class).or_default();
        ledger.documents = ledger.documents.saturating_sub(1);
        ledger.used_bytes = ledger.used_bytes.saturating_sub(record.bytes.len() as u64);
    }

    fn charge(&mut self, record: &StoredRecord) {
        let ledger = self.ledgers.entry(record.class).or_default();
        ledger.documents += 1;
        ledger.used_bytes += record.bytes.len() as u64;
    }
}

/// Banked in-memory archive.
pub struct BankedArchive {
    capacities: BTreeMap<StorageClass, u64>,
    state: Mutex<ArchiveState>,
}

impl BankedArchive {
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            capacities: config.capacities.clone(),
            state: Mutex::new(ArchiveState::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.lock().records.contains_key(id)
    }

    /// Drops a record and releases its budget.
    pub fn release(&self, id: &str) -> bool {
        let mut state = self.state.lock();
        match state.records.remove(id) {
            Some(record) => {
                state.release(&record);
                true
            }
            None => false,
        }
    }
}

impl Default for BankedArchive {
    fn default() -> Self {
        Self::new(&ArchiveConfig::default())
    }
}

impl std::fmt::Debug for BankedArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankedArchive")
            .field("capacities", &self.capacities)
            .field("records", &self.len())
            .finish()
    }
}

#[async_trait]
impl ArchivalAllocator for BankedArchive {
    async fn allocate(
        &self,
        doc: &CachedDocument,
        bytes: &[u8],
        options: AllocationOptions,
    ) -> ArchiveResult<Allocation> {
        let capacity = *self
            .capacities
            .get(&options.class)
            .ok_or(ArchiveError::UnknownClass {
                class: options.class,
            })?;

        let record = ArchiveRecord {
            document: doc.clone(),
            raw: bytes.to_vec(),
        };
        let encoded = record.encode(options.compress)?;
        let stored_bytes = encoded.len() as u64;

        let mut state = self.state.lock();
        let used = state
            .ledgers
            .get(&options.class)
            .map_or(0, |l| l.used_bytes);
        let reclaimable = state
            .records
            .get(&doc.id)
            .filter(|r| r.class == options.class)
            .map_or(0, |r| r.bytes.len() as u64);
        let available = capacity.saturating_sub(used.saturating_sub(reclaimable));
        if stored_bytes > available {
            return Err(ArchiveError::CapacityExceeded {
                class: options.class,
                requested: stored_bytes,
                available,
            });
        }

        if let Some(previous) = state.records.remove(&doc.id) {
            state.release(&previous);
        }
        let stored = StoredRecord {
            class: options.class,
            bytes: encoded,
            compressed: options.compress,
        };
        state.charge(&stored);
        state.records.insert(doc.id.clone(), stored);

        debug!(
            id = %doc.id,
            class = %options.class,
            stored_bytes,
            compressed = options.compress,
            "Archived document"
        );

        Ok(Allocation {
            class: options.class,
            stored_bytes,
            compressed: options.compress,
        })
    }

    async fn retrieve(&self, id: &str) -> ArchiveResult<Option<CachedDocument>> {
        let (bytes, compressed, class) = {
            let state = self.state.lock();
            match state.records.get(id) {
                Some(r) => (r.bytes.clone(), r.compressed, r.class),
                None => return Ok(None),
            }
        };
        let mut document = ArchiveRecord::decode(&bytes, compressed)?.document;
        document.location = TierLocation::L3;
        document.compressed = compressed;
        document.archive_class = Some(class);
        Ok(Some(document))
    }

    async fn usage_stats(&self) -> ArchiveUsage {
        let state = self.state.lock();
        let classes = self
            .capacities
            .iter()
            .map(|(class, capacity)| {
                let ledger = state.ledgers.get(class).copied().unwrap_or_default();
                ClassUsage {
                    class: *class,
                    documents: ledger.documents,
                    used_bytes: ledger.used_bytes,
                    capacity_bytes: *capacity,
                }
            })
            .collect();
        ArchiveUsage { classes }
    }
}
