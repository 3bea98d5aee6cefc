use std::sync::Arc;
use std::time::Duration;

use super::config::L1Config;
use super::error::CacheError;
use super::l1::{L1Insert, L1Store};
use crate::document::{CachedDocument, RiskLevel, TierLocation};

fn store() -> L1Store {
    L1Store::new(&L1Config::default(), Duration::from_secs(60))
}

fn doc(id: &str, category: &str) -> CachedDocument {
    CachedDocument::new(id, category)
        .with_title(format!("Document {id}"))
        .with_priority(60)
        .with_risk_level(RiskLevel::Medium)
}

#[test]
fn test_insert_and_peek() {
    let l1 = store();
    assert_eq!(l1.insert(doc("c-1", "contract")).unwrap(), L1Insert::Created);
    assert_eq!(l1.insert(doc("c-1", "contract")).unwrap(), L1Insert::Replaced);
    assert_eq!(l1.len(), 1);
    assert_eq!(l1.peek("c-1").unwrap().location, TierLocation::L1);
}

#[test]
fn test_unknown_and_reserved_categories_rejected() {
    let l1 = store();
    assert!(matches!(
        l1.insert(doc("m-1", "memo")),
        Err(CacheError::InvalidCategory { .. })
    ));
    assert!(matches!(
        l1.insert(doc("s-1", "search_results")),
        Err(CacheError::ReservedCategory { .. })
    ));
    assert!(l1.is_empty());
}

#[test]
fn test_touch_increments_access_and_refreshes_timestamp() {
    let l1 = store();
    l1.insert(doc("e-1", "evidence").with_timestamp(10)).unwrap();

    let touched = l1.touch("e-1", 500).unwrap();
    assert_eq!(touched.access_count, 1);
    assert_eq!(touched.cache_timestamp, 500);

    l1.touch("e-1", 900);
    assert_eq!(l1.peek("e-1").unwrap().access_count, 2);
    assert!(l1.touch("missing", 900).is_none());
}

#[test]
fn test_lookup_is_global_across_categories() {
    let l1 = store();
    l1.insert(doc("shared-id", "brief")).unwrap();
    assert_eq!(l1.peek("shared-id").unwrap().category, "brief");
    assert!(l1.contains("shared-id"));
}

#[test]
fn test_insert_if_absent() {
    let l1 = store();
    assert!(l1.insert_if_absent(doc("c-1", "contract")).unwrap());
    assert!(!l1.insert_if_absent(doc("c-1", "contract").with_title("other")).unwrap());
    assert_eq!(l1.peek("c-1").unwrap().title, "Document c-1");
}

#[test]
fn test_merge_keeps_max_access_and_timestamp() {
    let l1 = store();
    l1.insert(doc("c-1", "contract").with_access_count(5).with_timestamp(900))
        .unwrap();

    let incoming = doc("c-1", "contract")
        .with_title("Renamed")
        .with_access_count(1)
        .with_timestamp(100);
    assert_eq!(l1.merge(incoming.clone()).unwrap(), L1Insert::Replaced);
    let once = l1.peek("c-1").unwrap();
    assert_eq!(once.title, "Renamed");
    assert_eq!(once.access_count, 5);
    assert_eq!(once.cache_timestamp, 900);

    l1.merge(incoming).unwrap();
    assert_eq!(l1.peek("c-1").unwrap(), once);
}

#[test]
fn test_remove_and_evict() {
    let l1 = store();
    l1.insert(doc("a", "contract")).unwrap();
    l1.insert(doc("b", "brief")).unwrap();
    l1.insert(doc("c", "case")).unwrap();

    assert_eq!(l1.remove("a").unwrap().category, "contract");
    assert!(l1.remove("a").is_none());
    assert!(l1.remove_from("contract", "b").is_none());

    let evicted = l1.evict(&[
        ("brief".to_string(), "b".to_string()),
        ("case".to_string(), "missing".to_string()),
    ]);
    assert_eq!(evicted, 1);
    assert_eq!(l1.len(), 1);
}

#[test]
fn test_update_in_place() {
    let l1 = store();
    l1.insert(doc("p-1", "precedent")).unwrap();
    assert!(l1.update("precedent", "p-1", |d| d.compressed = true));
    assert!(!l1.update("brief", "p-1", |d| d.compressed = true));
    assert!(l1.peek("p-1").unwrap().compressed);
}

#[test]
fn test_scan_respects_category_filter_and_order() {
    let l1 = store();
    l1.insert(doc("z", "contract")).unwrap();
    l1.insert(doc("a", "contract")).unwrap();
    l1.insert(doc("m", "statute")).unwrap();

    let ids: Vec<String> = l1
        .scan(|c| c == "contract", |_| true)
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec!["a", "z"]);
}

#[test]
fn test_memory_estimate_and_counts() {
    let l1 = store();
    l1.insert(doc("a", "contract")).unwrap();
    l1.insert(doc("b", "contract")).unwrap();
    l1.insert(doc("c", "evidence")).unwrap();

    assert_eq!(l1.memory_estimate(), 3 * 1024);
    let counts = l1.category_counts();
    assert_eq!(counts["contract"], 2);
    assert_eq!(counts["evidence"], 1);
    assert_eq!(counts["brief"], 0);
}

#[test]
fn test_clear_empties_collections_and_memo() {
    let l1 = store();
    l1.insert(doc("a", "contract")).unwrap();
    l1.memo_insert("key".to_string(), Arc::new(Vec::new()));
    assert!(l1.memo_get("key").is_some());

    l1.clear();
    assert!(l1.is_empty());
    assert!(l1.memo_get("key").is_none());
    assert_eq!(l1.categories().len(), 6);
}
