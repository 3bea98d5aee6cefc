use std::time::Duration;

use super::*;
use crate::cache::config::TieringPolicy;
use crate::constants::MILLIS_PER_DAY;
use crate::document::{CachedDocument, RiskLevel, StorageClass, TierLocation};

const NOW: i64 = 1_700_000_000_000;

fn doc(id: &str, category: &str) -> CachedDocument {
    CachedDocument::new(id, category)
        .with_title("Deposition transcript")
        .with_content("The witness stated the shipment arrived late.")
        .with_priority(100)
        .with_risk_level(RiskLevel::Medium)
        .with_size(1_000)
        .with_timestamp(NOW)
}

fn options(class: StorageClass, compress: bool) -> AllocationOptions {
    AllocationOptions { class, compress }
}

#[test]
fn test_select_storage_class_precedence() {
    let critical = doc("a", "brief").with_risk_level(RiskLevel::Critical);
    assert_eq!(select_storage_class(&critical), StorageClass::Fast);

    let hot = doc("b", "statute").with_priority(201);
    assert_eq!(select_storage_class(&hot), StorageClass::Fast);

    let boundary = doc("c", "statute").with_priority(200);
    assert_eq!(select_storage_class(&boundary), StorageClass::Durable);

    assert_eq!(select_storage_class(&doc("d", "contract")), StorageClass::Pattern);
    assert_eq!(select_storage_class(&doc("e", "evidence")), StorageClass::Pattern);
    assert_eq!(select_storage_class(&doc("f", "brief")), StorageClass::Logic);
    assert_eq!(select_storage_class(&doc("g", "precedent")), StorageClass::Logic);
    assert_eq!(select_storage_class(&doc("h", "case")), StorageClass::Durable);
}

#[test]
fn test_should_archive_heuristic() {
    let policy = TieringPolicy::default();

    assert!(!should_archive(&doc("keep", "contract"), &policy, NOW));

    let large = doc("large", "contract").with_size(policy.size_floor_bytes + 1);
    assert!(should_archive(&large, &policy, NOW));

    let unimportant = doc("low-pri", "contract").with_priority(policy.priority_floor - 1);
    assert!(should_archive(&unimportant, &policy, NOW));

    let low_risk = doc("low-risk", "contract").with_risk_level(RiskLevel::Low);
    assert!(should_archive(&low_risk, &policy, NOW));

    let stale = doc("stale", "contract").with_timestamp(NOW - 8 * MILLIS_PER_DAY);
    assert!(should_archive(&stale, &policy, NOW));
}

#[test]
fn test_should_archive_respects_custom_age_floor() {
    let policy = TieringPolicy {
        age_floor: Duration::from_secs(60),
        ..TieringPolicy::default()
    };
    let minute_old = doc("m", "contract").with_timestamp(NOW - 61_000);
    assert!(should_archive(&minute_old, &policy, NOW));
}

#[test]
fn test_should_archive_tolerates_extreme_timestamps() {
    let policy = TieringPolicy::default();
    let ancient = doc("ancient", "contract").with_timestamp(i64::MIN);
    assert!(should_archive(&ancient, &policy, i64::MAX));

    let future = doc("future", "contract").with_timestamp(i64::MAX);
    assert!(!should_archive(&future, &policy, i64::MIN));
}

#[tokio::test]
async fn test_allocate_and_retrieve() {
    let archive = BankedArchive::default();
    let original = doc("ev-1", "evidence");

    let allocation = archive
        .allocate(&original, b"raw", options(StorageClass::Pattern, false))
        .await
        .unwrap();
    assert_eq!(allocation.class, StorageClass::Pattern);
    assert!(!allocation.compressed);
    assert!(allocation.stored_bytes > 0);

    let restored = archive.retrieve("ev-1").await.unwrap().unwrap();
    assert!(restored.same_content(&original));
    assert_eq!(restored.location, TierLocation::L3);
    assert_eq!(restored.archive_class, Some(StorageClass::Pattern));
    assert!(!restored.compressed);

    assert!(archive.retrieve("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_compressed_record_round_trips() {
    let archive = BankedArchive::default();
    let original = doc("c-1", "contract").with_content("indemnify ".repeat(2_000));

    let plain = ArchiveRecord {
        document: original.clone(),
        raw: Vec::new(),
    }
    .encode(false)
    .unwrap();

    let allocation = archive
        .allocate(&original, &[], options(StorageClass::Pattern, true))
        .await
        .unwrap();
    assert!(allocation.compressed);
    assert!(allocation.stored_bytes < plain.len() as u64);

    let restored = archive.retrieve("c-1").await.unwrap().unwrap();
    assert!(restored.compressed);
    assert_eq!(restored.content, original.content);
}

#[tokio::test]
async fn test_capacity_exceeded_leaves_archive_untouched() {
    let config = ArchiveConfig::default().capacity(StorageClass::Logic, 64);
    let archive = BankedArchive::new(&config);

    let err = archive
        .allocate(&doc("b-1", "brief"), &[0u8; 256], options(StorageClass::Logic, false))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::CapacityExceeded {
            class: StorageClass::Logic,
            available: 64,
            ..
        }
    ));
    assert!(archive.is_empty());

    let usage = archive.usage_stats().await;
    assert_eq!(usage.class(StorageClass::Logic).unwrap().used_bytes, 0);
}

#[tokio::test]
async fn test_unknown_class_rejected() {
    let mut config = ArchiveConfig::default();
    config.capacities.remove(&StorageClass::Fast);
    let archive = BankedArchive::new(&config);

    let err = archive
        .allocate(&doc("x", "case"), &[], options(StorageClass::Fast, false))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::UnknownClass {
            class: StorageClass::Fast
        }
    ));
}

#[tokio::test]
async fn test_reallocation_releases_previous_bytes() {
    let archive = BankedArchive::default();
    let first = doc("p-1", "precedent");

    archive
        .allocate(&first, &[0u8; 512], options(StorageClass::Logic, false))
        .await
        .unwrap();
    let before = archive.usage_stats().await;
    assert_eq!(before.class(StorageClass::Logic).unwrap().documents, 1);

    let moved = first.clone().with_risk_level(RiskLevel::Critical);
    archive
        .allocate(&moved, &[], options(StorageClass::Fast, false))
        .await
        .unwrap();

    let after = archive.usage_stats().await;
    let logic = after.class(StorageClass::Logic).unwrap();
    assert_eq!(logic.documents, 0);
    assert_eq!(logic.used_bytes, 0);
    assert_eq!(after.class(StorageClass::Fast).unwrap().documents, 1);
    assert_eq!(after.documents(), 1);
    assert_eq!(archive.len(), 1);
}

#[tokio::test]
async fn test_usage_stats_covers_every_configured_class() {
    let archive = BankedArchive::default();
    let usage = archive.usage_stats().await;
    assert_eq!(usage.classes.len(), StorageClass::ALL.len());
    assert_eq!(usage.used_bytes(), 0);
    assert_eq!(
        usage.capacity_bytes(),
        ArchiveConfig::default().capacities.values().sum::<u64>()
    );
}

#[tokio::test]
async fn test_release_frees_budget() {
    let archive = BankedArchive::default();
    archive
        .allocate(&doc("r", "case"), &[1, 2, 3], options(StorageClass::Durable, false))
        .await
        .unwrap();
    assert!(archive.contains("r"));
    assert!(archive.release("r"));
    assert!(!archive.release("r"));
    assert_eq!(archive.usage_stats().await.used_bytes(), 0);
}

#[test]
fn test_should_compress_floor() {
    let config = ArchiveConfig::default();
    assert!(!config.should_compress(config.compression_floor_bytes));
    assert!(config.should_compress(config.compression_floor_bytes + 1));
    assert!(!config.clone().compress_archives(false).should_compress(u64::MAX));
}
