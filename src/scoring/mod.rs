//! Heuristic relevance scoring for L1 search.
//!
//! Scores are a fixed formula over priority, confidence, risk, access count and age.
//! Nothing is learned; identical inputs always produce identical scores, and ties
//! keep scan order.

pub mod scorer;
pub mod types;

#[cfg(test)]
mod tests;

pub use scorer::{DocumentMatcher, rank, relevance_score};
pub use types::{MatchKind, SearchFilters, SearchOptions, SearchResultEntry, search_cache_key};
