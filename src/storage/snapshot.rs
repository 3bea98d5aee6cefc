//! Durable L1 snapshot (rkyv file).

use std::path::Path;

use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{SnapshotError, SnapshotResult};
use crate::document::CachedDocument;

/// Every L1 document at `saved_at` (unix millis).
#[derive(Archive, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct L1Snapshot {
    pub saved_at: i64,
    pub documents: Vec<CachedDocument>,
}

impl L1Snapshot {
    pub fn new(saved_at: i64, documents: Vec<CachedDocument>) -> Self {
        Self {
            saved_at,
            documents,
        }
    }

    pub fn to_bytes(&self) -> SnapshotResult<Vec<u8>> {
        rkyv::to_bytes::<RkyvError>(self)
            .map(|bytes| bytes.to_vec())
            .map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> SnapshotResult<Self> {
        let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        rkyv::from_bytes::<L1Snapshot, RkyvError>(&aligned)
            .map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}

/// Writes the snapshot through a temporary sibling file and renames it into place.
pub async fn save_snapshot(path: &Path, snapshot: &L1Snapshot) -> SnapshotResult<u64> {
    let bytes = snapshot.to_bytes()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    info!(
        path = %path.display(),
        documents = snapshot.documents.len(),
        bytes = bytes.len(),
        "L1 snapshot saved"
    );
    Ok(bytes.len() as u64)
}

/// Reads a snapshot. A missing file yields an empty snapshot.
pub async fn load_snapshot(path: &Path) -> SnapshotResult<L1Snapshot> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No L1 snapshot found");
            return Ok(L1Snapshot::default());
        }
        Err(e) => return Err(e.into()),
    };
    let snapshot = L1Snapshot::from_bytes(&bytes)?;
    info!(
        path = %path.display(),
        documents = snapshot.documents.len(),
        "L1 snapshot loaded"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RiskLevel;
    use tempfile::tempdir;

    fn docs() -> Vec<CachedDocument> {
        vec![
            CachedDocument::new("c-1", "contract")
                .with_title("NDA")
                .with_metadata("jurisdiction", "NY")
                .with_risk_level(RiskLevel::Critical),
            CachedDocument::new("b-1", "brief")
                .with_summary("Motion to dismiss")
                .with_tags(["motion", "civil"]),
        ]
    }

    #[tokio::test]
    async fn test_save_and_load_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("l1.snapshot");
        let snapshot = L1Snapshot::new(42, docs());

        let written = save_snapshot(&path, &snapshot).await.unwrap();
        assert!(written > 0);
        assert!(!path.with_extension("tmp").exists());

        let loaded = load_snapshot(&path).await.unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_load_missing_snapshot_is_empty() {
        let dir = tempdir().unwrap();
        let loaded = load_snapshot(&dir.path().join("absent.snapshot")).await.unwrap();
        assert!(loaded.documents.is_empty());
        assert_eq!(loaded.saved_at, 0);
    }

    #[tokio::test]
    async fn test_load_corrupt_snapshot_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.snapshot");
        tokio::fs::write(&path, b"definitely not rkyv").await.unwrap();
        assert!(matches!(
            load_snapshot(&path).await,
            Err(SnapshotError::Decode(_))
        ));
    }
}
