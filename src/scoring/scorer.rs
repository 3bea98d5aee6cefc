use crate::document::CachedDocument;

use super::types::{MatchKind, SearchFilters, SearchResultEntry};

const ACCESS_WEIGHT: f64 = 2.0;
const ACCESS_CAP: f64 = 20.0;
const FRESHNESS_DAYS: f64 = 10.0;
const HIGHLIGHT_CONTEXT_BYTES: usize = 40;

/// Heuristic relevance of `doc` at `now_millis`.
///
/// `priority*0.01 + confidence*100 + risk_bonus + min(access*2, 20) + max(0, 10 - age_days)`
#[inline]
pub fn relevance_score(doc: &CachedDocument, now_millis: i64) -> f64 {
    let priority = doc.priority as f64 * 0.01;
    let confidence = doc.confidence_level as f64 * 100.0;
    let access = (doc.access_count as f64 * ACCESS_WEIGHT).min(ACCESS_CAP);
    let freshness = (FRESHNESS_DAYS - doc.age_days(now_millis)).max(0.0);
    priority + confidence + doc.risk_level.relevance_bonus() + access + freshness
}

/// Matches and scores documents for a single query.
#[derive(Debug, Clone)]
pub struct DocumentMatcher<'a> {
    needle: String,
    filters: &'a SearchFilters,
    now_millis: i64,
}

impl<'a> DocumentMatcher<'a> {
    pub fn new(query: &str, filters: &'a SearchFilters, now_millis: i64) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
            filters,
            now_millis,
        }
    }

    /// Filters plus substring test. An empty query matches every filtered document.
    pub fn matches(&self, doc: &CachedDocument) -> bool {
        if !self.filters.accepts(doc) {
            return false;
        }
        self.needle.is_empty()
            || doc
                .text_fields()
                .any(|field| find_case_insensitive(field, &self.needle).is_some())
    }

    /// Scores a matching document into a result entry.
    pub fn score(&self, doc: &CachedDocument, highlight: bool) -> SearchResultEntry {
        let highlights = highlight.then(|| self.highlights(doc));
        SearchResultEntry {
            id: doc.id.clone(),
            document: doc.clone(),
            score: relevance_score(doc, self.now_millis),
            match_kind: MatchKind::Fuzzy,
            highlights,
        }
    }

    fn highlights(&self, doc: &CachedDocument) -> Vec<String> {
        if self.needle.is_empty() {
            return Vec::new();
        }
        doc.text_fields()
            .filter_map(|field| {
                find_case_insensitive(field, &self.needle)
                    .map(|start| snippet(field, start, self.needle.len()))
            })
            .collect()
    }
}

/// Sorts descending by score (stable) and truncates to `limit`.
pub fn rank(mut entries: Vec<SearchResultEntry>, limit: usize) -> Vec<SearchResultEntry> {
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries.truncate(limit);
    entries
}

/// Byte offset of the first case-insensitive occurrence of `needle_lower` in `haystack`.
pub(crate) fn find_case_insensitive(haystack: &str, needle_lower: &str) -> Option<usize> {
    if needle_lower.is_empty() {
        return Some(0);
    }
    haystack
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| starts_with_lowercase(&haystack[i..], needle_lower))
}

fn starts_with_lowercase(haystack: &str, needle_lower: &str) -> bool {
    let mut lowered = haystack.chars().flat_map(char::to_lowercase);
    needle_lower.chars().all(|n| lowered.next() == Some(n))
}

fn snippet(field: &str, start: usize, needle_len: usize) -> String {
    let mut from = start.saturating_sub(HIGHLIGHT_CONTEXT_BYTES);
    while !field.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (start + needle_len + HIGHLIGHT_CONTEXT_BYTES).min(field.len());
    while !field.is_char_boundary(to) {
        to += 1;
    }
    let mut out = String::with_capacity(to - from + 6);
    if from > 0 {
        out.push_str("...");
    }
    out.push_str(&field[from..to]);
    if to < field.len() {
        out.push_str("...");
    }
    out
}
