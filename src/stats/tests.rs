use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use super::*;
use crate::cache::config::L1Config;
use crate::cache::events::CacheEvent;
use crate::cache::l1::L1Store;
use crate::cache::l3::{AllocationOptions, ArchivalAllocator, BankedArchive};
use crate::document::{CachedDocument, StorageClass};

#[test]
fn test_hit_ratio_starts_at_zero() {
    let recorder = StatsRecorder::default();
    let stats = recorder.snapshot();
    assert_eq!(stats.hit_ratio, 0.0);
    assert_eq!(stats.avg_response_time_ms, 0.0);
}

#[test]
fn test_hit_ratio_counts_l1_and_l2_hits() {
    let recorder = StatsRecorder::default();
    for _ in 0..4 {
        recorder.record(StatsOp::Get, Duration::from_millis(1));
    }
    recorder.record_hit(Tier::L1);
    recorder.record_hit(Tier::L2);
    recorder.record_hit(Tier::L3);
    assert!((recorder.snapshot().hit_ratio - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_hit_ratio_is_clamped() {
    let recorder = StatsRecorder::default();
    recorder.record(StatsOp::Get, Duration::ZERO);
    for _ in 0..10 {
        recorder.record_hit(Tier::L1);
    }
    let ratio = recorder.snapshot().hit_ratio;
    assert!((0.0..=1.0).contains(&ratio));
    assert_eq!(ratio, 1.0);
}

#[test]
fn test_hit_ratio_bounded_under_mixed_traffic() {
    let recorder = StatsRecorder::default();
    for i in 0..500u64 {
        let op = match i % 3 {
            0 => StatsOp::Store,
            1 => StatsOp::Get,
            _ => StatsOp::Search,
        };
        recorder.record(op, Duration::from_micros(i));
        if i % 2 == 0 {
            recorder.record_hit(Tier::L1);
        } else {
            recorder.record_miss(Tier::L1);
        }
        let ratio = recorder.snapshot().hit_ratio;
        assert!((0.0..=1.0).contains(&ratio), "ratio {ratio} out of bounds");
    }
}

#[test]
fn test_response_window_keeps_latest_samples() {
    let recorder = StatsRecorder::new(3);
    for ms in [100, 1, 2, 3] {
        recorder.record(StatsOp::Search, Duration::from_millis(ms));
    }
    let stats = recorder.snapshot();
    assert_eq!(recorder.samples(), 3);
    assert_eq!(stats.total_operations, 4);
    assert!((stats.avg_response_time_ms - 2.0).abs() < 1e-9);
}

#[test]
fn test_reset_preserves_connected_flag() {
    let recorder = StatsRecorder::default();
    recorder.set_connected(true);
    recorder.record(StatsOp::Store, Duration::from_millis(2));
    recorder.record_hit(Tier::L1);
    recorder.record_sync_conflict();
    recorder.record_evictions(3);

    recorder.reset();

    let stats = recorder.snapshot();
    assert!(stats.l2_connected);
    assert_eq!(stats.total_operations, 0);
    assert_eq!(stats.l1.hits, 0);
    assert_eq!(stats.sync_conflicts, 0);
    assert_eq!(stats.evictions, 0);
    assert_eq!(recorder.samples(), 0);
}

#[test]
fn test_stats_serialize_camel_case() {
    let json = serde_json::to_value(StatsRecorder::default().snapshot()).unwrap();
    assert!(json.get("hitRatio").is_some());
    assert!(json.get("avgResponseTimeMs").is_some());
    assert!(json.get("syncConflicts").is_some());
    assert!(json["l1"].get("memoryBytes").is_some());
}

#[tokio::test]
async fn test_monitor_sample_refreshes_gauges() {
    let l1 = Arc::new(L1Store::new(&L1Config::default(), Duration::from_secs(60)));
    l1.insert(CachedDocument::new("c-1", "contract")).unwrap();
    l1.insert(CachedDocument::new("b-1", "brief")).unwrap();

    let archive = Arc::new(BankedArchive::default());
    archive
        .allocate(
            &CachedDocument::new("s-1", "statute"),
            &[],
            AllocationOptions {
                class: StorageClass::Durable,
                compress: false,
            },
        )
        .await
        .unwrap();

    let recorder = Arc::new(StatsRecorder::default());
    let (tx, _rx) = broadcast::channel(8);
    let monitor = StatsMonitor::new(l1, archive, recorder, tx);

    let stats = monitor.sample().await;
    assert_eq!(stats.l1.documents, 2);
    assert_eq!(stats.l1.memory_bytes, 2 * 1024);
    assert_eq!(stats.l3.documents, 1);
    assert_eq!(
        stats.l3_usage.class(StorageClass::Durable).unwrap().documents,
        1
    );
}

#[tokio::test]
async fn test_monitor_emits_stats_events() {
    let l1 = Arc::new(L1Store::new(&L1Config::default(), Duration::from_secs(60)));
    let (tx, mut rx) = broadcast::channel(8);
    let monitor = Arc::new(StatsMonitor::new(
        l1,
        Arc::new(BankedArchive::default()),
        Arc::new(StatsRecorder::default()),
        tx,
    ));

    let handle = monitor.clone().spawn(Duration::from_millis(10));
    assert!(monitor.is_running());

    let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(event, CacheEvent::Stats(_)));
    handle.abort();
}
