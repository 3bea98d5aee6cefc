//! L1 fast tier (in-process).
//!
//! Documents live in per-category collections keyed by id. A separate moka memo holds
//! ranked search result sets under the reserved `search_results` pseudo-category; it is
//! never scanned by search.
//!
//! Every mutation takes the write lock, completes, and releases it without awaiting.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use parking_lot::RwLock;

use super::config::L1Config;
use super::error::{CacheError, CacheResult};
use crate::constants::SEARCH_RESULTS_CATEGORY;
use crate::document::{CachedDocument, TierLocation};
use crate::scoring::SearchResultEntry;

type Collection = BTreeMap<String, CachedDocument>;

/// Outcome of inserting into L1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L1Insert {
    /// The id was not present in the category.
    Created,
    /// An existing entry was replaced.
    Replaced,
}

/// In-process category collections plus the search memo.
pub struct L1Store {
    collections: RwLock<BTreeMap<String, Collection>>,
    search_memo: Cache<String, Arc<Vec<SearchResultEntry>>>,
    per_document_bytes: u64,
}

impl L1Store {
    /// Creates empty collections for every configured category.
    pub fn new(config: &L1Config, search_ttl: Duration) -> Self {
        let collections = config
            .categories
            .iter()
            .map(|c| (c.clone(), Collection::new()))
            .collect();
        Self {
            collections: RwLock::new(collections),
            search_memo: Cache::builder()
                .max_capacity(config.search_memo_capacity)
                .time_to_live(search_ttl)
                .build(),
            per_document_bytes: config.per_document_bytes,
        }
    }

    /// Returns an error unless `category` names a document collection.
    pub fn check_category(&self, category: &str) -> CacheResult<()> {
        if category == SEARCH_RESULTS_CATEGORY {
            return Err(CacheError::ReservedCategory {
                category: category.to_string(),
            });
        }
        if !self.collections.read().contains_key(category) {
            return Err(CacheError::InvalidCategory {
                category: category.to_string(),
            });
        }
        Ok(())
    }

    pub fn categories(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }

    /// Inserts or replaces a document in its category collection.
    ///
    /// The stored copy is marked as L1-resident.
    pub fn insert(&self, mut doc: CachedDocument) -> CacheResult<L1Insert> {
        self.check_category(&doc.category)?;
        doc.location = TierLocation::L1;
        let mut collections = self.collections.write();
        let collection = collections
            .get_mut(&doc.category)
            .ok_or_else(|| CacheError::InvalidCategory {
                category: doc.category.clone(),
            })?;
        match collection.insert(doc.id.clone(), doc) {
            Some(_) => Ok(L1Insert::Replaced),
            None => Ok(L1Insert::Created),
        }
    }

    /// Inserts only when no entry with this id exists in the category.
    pub fn insert_if_absent(&self, mut doc: CachedDocument) -> CacheResult<bool> {
        self.check_category(&doc.category)?;
        doc.location = TierLocation::L1;
        let mut collections = self.collections.write();
        let Some(collection) = collections.get_mut(&doc.category) else {
            return Ok(false);
        };
        if collection.contains_key(&doc.id) {
            return Ok(false);
        }
        collection.insert(doc.id.clone(), doc);
        Ok(true)
    }

    /// Merges `incoming` into the existing entry (incoming fields win, access count
    /// keeps the maximum) or inserts it.
    ///
    /// Applying the same document twice leaves the same state as applying it once.
    pub fn merge(&self, mut incoming: CachedDocument) -> CacheResult<L1Insert> {
        self.check_category(&incoming.category)?;
        incoming.location = TierLocation::L1;
        let mut collections = self.collections.write();
        let Some(collection) = collections.get_mut(&incoming.category) else {
            return Err(CacheError::InvalidCategory {
                category: incoming.category.clone(),
            });
        };
        match collection.get_mut(&incoming.id) {
            Some(existing) => {
                incoming.access_count = incoming.access_count.max(existing.access_count);
                incoming.cache_timestamp = incoming.cache_timestamp.max(existing.cache_timestamp);
                *existing = incoming;
                Ok(L1Insert::Replaced)
            }
            None => {
                collection.insert(incoming.id.clone(), incoming);
                Ok(L1Insert::Created)
            }
        }
    }

    /// Global id lookup that records an access and returns a copy.
    pub fn touch(&self, id: &str, now_millis: i64) -> Option<CachedDocument> {
        let mut collections = self.collections.write();
        collections.values_mut().find_map(|c| {
            c.get_mut(id).map(|doc| {
                doc.touch(now_millis);
                doc.clone()
            })
        })
    }

    /// Global id lookup without side effects.
    pub fn peek(&self, id: &str) -> Option<CachedDocument> {
        self.collections
            .read()
            .values()
            .find_map(|c| c.get(id).cloned())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.collections.read().values().any(|c| c.contains_key(id))
    }

    /// Applies `f` to the entry with this id and category. Returns `false` if absent.
    pub fn update<F>(&self, category: &str, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut CachedDocument),
    {
        let mut collections = self.collections.write();
        match collections.get_mut(category).and_then(|c| c.get_mut(id)) {
            Some(doc) => {
                f(doc);
                true
            }
            None => false,
        }
    }

    /// Removes the id from whichever collection holds it.
    pub fn remove(&self, id: &str) -> Option<CachedDocument> {
        let mut collections = self.collections.write();
        collections.values_mut().find_map(|c| c.remove(id))
    }

    /// Removes the id from one category.
    pub fn remove_from(&self, category: &str, id: &str) -> Option<CachedDocument> {
        self.collections
            .write()
            .get_mut(category)
            .and_then(|c| c.remove(id))
    }

    /// Removes each `(category, id)` pair; returns how many were present.
    pub fn evict(&self, targets: &[(String, String)]) -> usize {
        let mut collections = self.collections.write();
        targets
            .iter()
            .filter(|(category, id)| {
                collections
                    .get_mut(category)
                    .and_then(|c| c.remove(id))
                    .is_some()
            })
            .count()
    }

    /// Clones every document matching `predicate`, in category then id order.
    ///
    /// `include_category` prunes whole collections before the per-document test.
    pub fn scan<C, P>(&self, include_category: C, predicate: P) -> Vec<CachedDocument>
    where
        C: Fn(&str) -> bool,
        P: Fn(&CachedDocument) -> bool,
    {
        self.collections
            .read()
            .iter()
            .filter(|(category, _)| include_category(category))
            .flat_map(|(_, c)| c.values())
            .filter(|doc| predicate(doc))
            .cloned()
            .collect()
    }

    /// Copies of every document (used by eviction and snapshots).
    pub fn documents(&self) -> Vec<CachedDocument> {
        self.scan(|_| true, |_| true)
    }

    pub fn len(&self) -> usize {
        self.collections.read().values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.read().values().all(BTreeMap::is_empty)
    }

    /// Per-category document counts.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        self.collections
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.len()))
            .collect()
    }

    /// `document count * per-document estimate`.
    #[inline]
    pub fn memory_estimate(&self) -> u64 {
        self.len() as u64 * self.per_document_bytes
    }

    /// Empties every collection and the search memo.
    pub fn clear(&self) {
        for collection in self.collections.write().values_mut() {
            collection.clear();
        }
        self.clear_search_memo();
    }

    pub fn memo_get(&self, key: &str) -> Option<Arc<Vec<SearchResultEntry>>> {
        self.search_memo.get(key)
    }

    pub fn memo_insert(&self, key: String, results: Arc<Vec<SearchResultEntry>>) {
        self.search_memo.insert(key, results);
    }

    pub fn clear_search_memo(&self) {
        self.search_memo.invalidate_all();
    }

    /// Runs pending moka maintenance (makes memo counts exact).
    pub fn run_pending_tasks(&self) {
        self.search_memo.run_pending_tasks();
    }

    pub fn memo_len(&self) -> u64 {
        self.search_memo.entry_count()
    }
}

impl std::fmt::Debug for L1Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L1Store")
            .field("documents", &self.len())
            .field("search_memo", &self.search_memo.entry_count())
            .finish()
    }
}
