use super::scorer::{DocumentMatcher, find_case_insensitive, rank, relevance_score};
use super::types::{MatchKind, SearchFilters, SearchOptions, search_cache_key};
use crate::constants::MILLIS_PER_DAY;
use crate::document::{CachedDocument, RiskLevel};

const NOW: i64 = 1_700_000_000_000;

fn doc(id: &str, category: &str) -> CachedDocument {
    CachedDocument::new(id, category)
        .with_title(format!("{} title", id))
        .with_content("Payment terms are net 30 days.")
        .with_timestamp(NOW)
}

#[test]
fn test_relevance_score_formula() {
    let d = doc("c-1", "contract")
        .with_priority(100)
        .with_confidence(0.5)
        .with_risk_level(RiskLevel::High)
        .with_access_count(3)
        .with_timestamp(NOW - 4 * MILLIS_PER_DAY);

    // 1.0 + 50.0 + 30.0 + 6.0 + 6.0
    let score = relevance_score(&d, NOW);
    assert!((score - 93.0).abs() < 1e-4, "score was {}", score);
}

#[test]
fn test_relevance_score_caps_access_and_floors_age() {
    let d = doc("c-2", "contract")
        .with_risk_level(RiskLevel::Low)
        .with_access_count(1_000)
        .with_timestamp(NOW - 30 * MILLIS_PER_DAY);

    assert!((relevance_score(&d, NOW) - 25.0).abs() < 1e-9);
}

#[test]
fn test_relevance_score_risk_bonus_ordering() {
    let base = doc("x", "contract");
    let scores: Vec<f64> = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ]
    .into_iter()
    .map(|r| relevance_score(&base.clone().with_risk_level(r), NOW))
    .collect();

    assert!(scores.windows(2).all(|w| w[0] < w[1]));
    assert!((scores[3] - scores[0] - 45.0).abs() < 1e-9);
}

#[test]
fn test_matcher_substring_case_insensitive() {
    let filters = SearchFilters::default();
    let matcher = DocumentMatcher::new("NET 30", &filters, NOW);
    assert!(matcher.matches(&doc("a", "contract")));

    let matcher = DocumentMatcher::new("arbitration", &filters, NOW);
    assert!(!matcher.matches(&doc("a", "contract")));
}

#[test]
fn test_matcher_searches_tags_and_summary() {
    let filters = SearchFilters::default();
    let d = doc("a", "brief")
        .with_tags(["Force Majeure"])
        .with_summary("appellate brief");

    assert!(DocumentMatcher::new("majeure", &filters, NOW).matches(&d));
    assert!(DocumentMatcher::new("appellate", &filters, NOW).matches(&d));
}

#[test]
fn test_matcher_empty_query_matches_all() {
    let filters = SearchFilters::default();
    assert!(DocumentMatcher::new("   ", &filters, NOW).matches(&doc("a", "case")));
}

#[test]
fn test_filters_risk_confidence_priority() {
    let filters = SearchFilters::default()
        .risk_levels([RiskLevel::High, RiskLevel::Critical])
        .min_confidence(0.5)
        .min_priority(10);

    let pass = doc("p", "case")
        .with_risk_level(RiskLevel::High)
        .with_confidence(0.6)
        .with_priority(10);
    assert!(filters.accepts(&pass));

    assert!(!filters.accepts(&pass.clone().with_risk_level(RiskLevel::Low)));
    assert!(!filters.accepts(&pass.clone().with_confidence(0.4)));
    assert!(!filters.accepts(&pass.clone().with_priority(9)));
}

#[test]
fn test_filters_category_allow_list() {
    let filters = SearchFilters::default().categories(["brief"]);
    assert!(filters.includes_category("brief"));
    assert!(!filters.includes_category("contract"));
    assert!(!filters.accepts(&doc("a", "contract")));
}

#[test]
fn test_score_tags_fuzzy_and_highlights() {
    let filters = SearchFilters::default();
    let matcher = DocumentMatcher::new("net 30", &filters, NOW);
    let entry = matcher.score(&doc("a", "contract"), true);

    assert_eq!(entry.match_kind, MatchKind::Fuzzy);
    let highlights = entry.highlights.expect("highlights requested");
    assert_eq!(highlights.len(), 1);
    assert!(highlights[0].contains("net 30"));

    let plain = matcher.score(&doc("a", "contract"), false);
    assert!(plain.highlights.is_none());
}

#[test]
fn test_highlight_snippet_truncates_long_fields() {
    let filters = SearchFilters::default();
    let long = format!("{}needle{}", "a".repeat(100), "b".repeat(100));
    let d = doc("a", "contract").with_content(long);
    let entry = DocumentMatcher::new("needle", &filters, NOW).score(&d, true);
    let snippet = &entry.highlights.expect("highlights")[0];

    assert!(snippet.starts_with("..."));
    assert!(snippet.ends_with("..."));
    assert!(snippet.contains("needle"));
    assert!(snippet.len() < 100);
}

#[test]
fn test_rank_sorts_descending_and_truncates() {
    let filters = SearchFilters::default();
    let matcher = DocumentMatcher::new("", &filters, NOW);
    let entries = (0..10u8)
        .map(|p| matcher.score(&doc(&format!("d{}", p), "case").with_priority(p * 20), false))
        .collect();

    let ranked = rank(entries, 3);
    assert_eq!(ranked.len(), 3);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(ranked[0].id, "d9");
}

#[test]
fn test_find_case_insensitive_unicode() {
    assert_eq!(find_case_insensitive("Übereinkunft", "über"), Some(0));
    assert_eq!(find_case_insensitive("abc", "x"), None);
}

#[test]
fn test_search_cache_key_deterministic() {
    let filters = SearchFilters::default().min_priority(5);
    let options = SearchOptions::default();
    let a = search_cache_key("lease", &filters, &options);
    let b = search_cache_key("lease", &filters, &options);
    assert_eq!(a, b);

    assert_ne!(a, search_cache_key("lease ", &filters, &options));
    assert_ne!(a, search_cache_key("lease", &filters, &options.clone().limit(5)));
    assert_ne!(
        a,
        search_cache_key("lease", &SearchFilters::default(), &options)
    );
}
