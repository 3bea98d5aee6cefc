//! Archival policy: which documents overflow to L3 and into which storage class.

use crate::cache::config::TieringPolicy;
use crate::constants::FAST_CLASS_PRIORITY;
use crate::document::{CachedDocument, RiskLevel, StorageClass};

/// Overflow heuristic:
/// `size > size_floor OR priority < priority_floor OR risk == low OR age > age_floor`.
pub fn should_archive(doc: &CachedDocument, policy: &TieringPolicy, now_millis: i64) -> bool {
    let age_millis = now_millis.saturating_sub(doc.cache_timestamp);
    doc.size > policy.size_floor_bytes
        || doc.priority < policy.priority_floor
        || doc.risk_level == RiskLevel::Low
        || age_millis > policy.age_floor_millis()
}

/// Bank selection, first match wins:
/// critical or priority > 200 → fast; contract/evidence → pattern;
/// brief/precedent → logic; otherwise durable.
pub fn select_storage_class(doc: &CachedDocument) -> StorageClass {
    if doc.is_critical() || doc.priority > FAST_CLASS_PRIORITY {
        return StorageClass::Fast;
    }
    match doc.category.as_str() {
        "contract" | "evidence" => StorageClass::Pattern,
        "brief" | "precedent" => StorageClass::Logic,
        _ => StorageClass::Durable,
    }
}
