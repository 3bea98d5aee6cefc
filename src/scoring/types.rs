use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SEARCH_LIMIT;
use crate::document::{CachedDocument, RiskLevel};
use crate::hashing::hash_parts;

/// How a search result matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Case-insensitive substring match produced by the L1 scan.
    Fuzzy,
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultEntry {
    pub id: String,
    pub document: CachedDocument,
    pub score: f64,
    pub match_kind: MatchKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
}

/// Structured filters applied before scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    /// Keep only documents whose risk level is in this set.
    #[serde(default)]
    pub risk_levels: Option<Vec<RiskLevel>>,
    #[serde(default)]
    pub min_confidence: Option<f32>,
    #[serde(default)]
    pub min_priority: Option<u8>,
    /// Restrict the scan to these categories.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl SearchFilters {
    pub fn risk_levels(mut self, levels: impl IntoIterator<Item = RiskLevel>) -> Self {
        self.risk_levels = Some(levels.into_iter().collect());
        self
    }

    pub fn min_confidence(mut self, floor: f32) -> Self {
        self.min_confidence = Some(floor);
        self
    }

    pub fn min_priority(mut self, floor: u8) -> Self {
        self.min_priority = Some(floor);
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Returns `true` if `doc` passes every configured filter.
    pub fn accepts(&self, doc: &CachedDocument) -> bool {
        if let Some(levels) = &self.risk_levels
            && !levels.contains(&doc.risk_level)
        {
            return false;
        }
        if let Some(floor) = self.min_confidence
            && doc.confidence_level < floor
        {
            return false;
        }
        if let Some(floor) = self.min_priority
            && doc.priority < floor
        {
            return false;
        }
        if let Some(categories) = &self.categories
            && !categories.iter().any(|c| c == &doc.category)
        {
            return false;
        }
        true
    }

    /// Returns `true` if the scan should visit `category` at all.
    pub fn includes_category(&self, category: &str) -> bool {
        self.categories
            .as_ref()
            .is_none_or(|cats| cats.iter().any(|c| c == category))
    }
}

/// Result shaping options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Max results. Default: `50`.
    pub limit: usize,
    /// Persist the ranked list to the search memo and L2. Default: `true`.
    pub cache_results: bool,
    /// Attach context snippets around each match. Default: `false`.
    pub highlight: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            cache_results: true,
            highlight: false,
        }
    }
}

impl SearchOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn cache_results(mut self, enabled: bool) -> Self {
        self.cache_results = enabled;
        self
    }

    pub fn highlight(mut self, enabled: bool) -> Self {
        self.highlight = enabled;
        self
    }
}

/// Deterministic cache key for a search request.
pub fn search_cache_key(query: &str, filters: &SearchFilters, options: &SearchOptions) -> String {
    let filters_json = serde_json::to_vec(filters).unwrap_or_default();
    let options_json = serde_json::to_vec(options).unwrap_or_default();
    hash_parts(&[query.as_bytes(), &filters_json, &options_json])
}
