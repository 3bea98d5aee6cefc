//! Priority-weighted LRU eviction for L1.
//!
//! Critical documents and documents with priority >= 200 are never candidates.

use crate::constants::EVICTION_EXEMPT_PRIORITY;
use crate::document::CachedDocument;

/// `access_count + (priority / 255) * 10`; lower is evicted first.
#[inline]
pub fn retention_score(doc: &CachedDocument) -> f64 {
    doc.access_count as f64 + (doc.priority as f64 / 255.0) * 10.0
}

#[inline]
pub fn is_eviction_candidate(doc: &CachedDocument) -> bool {
    !doc.is_critical() && doc.priority < EVICTION_EXEMPT_PRIORITY
}

/// Picks `ceil(fraction * candidates)` documents to evict, lowest retention first.
///
/// Returns `(category, id)` pairs in eviction order. Ties keep input order.
pub fn select_victims(docs: &[CachedDocument], fraction: f64) -> Vec<(String, String)> {
    let mut candidates: Vec<&CachedDocument> =
        docs.iter().filter(|d| is_eviction_candidate(d)).collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    candidates.sort_by(|a, b| retention_score(a).total_cmp(&retention_score(b)));

    let target = ((candidates.len() as f64) * fraction).ceil() as usize;
    candidates
        .into_iter()
        .take(target)
        .map(|d| (d.category.clone(), d.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RiskLevel;

    fn doc(id: &str, priority: u8, access: u64) -> CachedDocument {
        CachedDocument::new(id, "contract")
            .with_priority(priority)
            .with_access_count(access)
    }

    #[test]
    fn test_lowest_priority_evicted_first() {
        let docs: Vec<_> = [10u8, 20, 30, 40, 50]
            .iter()
            .map(|p| doc(&format!("p{}", p), *p, 0))
            .collect();

        let victims = select_victims(&docs, 0.25);
        assert_eq!(victims.len(), 2);
        assert_eq!(victims[0].1, "p10");
        assert_eq!(victims[1].1, "p20");
    }

    #[test]
    fn test_access_count_outweighs_priority() {
        let docs = vec![doc("busy", 10, 5), doc("idle", 190, 0)];
        let victims = select_victims(&docs, 0.5);
        assert_eq!(victims, vec![("contract".to_string(), "idle".to_string())]);
    }

    #[test]
    fn test_critical_and_high_priority_exempt() {
        let docs = vec![
            doc("crit", 0, 0).with_risk_level(RiskLevel::Critical),
            doc("vip", 200, 0),
            doc("vip2", 255, 0),
        ];
        assert!(select_victims(&docs, 1.0).is_empty());
    }

    #[test]
    fn test_critical_never_selected_even_when_cold() {
        let mut docs = vec![doc("crit", 0, 0).with_risk_level(RiskLevel::Critical)];
        docs.extend((0..8).map(|i| doc(&format!("d{}", i), 100, 50)));

        let victims = select_victims(&docs, 1.0);
        assert_eq!(victims.len(), 8);
        assert!(victims.iter().all(|(_, id)| id != "crit"));
    }

    #[test]
    fn test_fewer_candidates_than_target() {
        let docs = vec![doc("only", 1, 0)];
        assert_eq!(select_victims(&docs, 0.25).len(), 1);
        assert!(select_victims(&[], 0.25).is_empty());
    }

    #[test]
    fn test_retention_score() {
        assert!((retention_score(&doc("x", 255, 2)) - 12.0).abs() < 1e-9);
        assert_eq!(retention_score(&doc("x", 0, 0)), 0.0);
    }
}
