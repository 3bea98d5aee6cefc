use crate::document::CachedDocument;
use crate::stats::Tier;

/// Outcome of a tiered `get`, tagged with the tier that answered.
#[derive(Debug, Clone, PartialEq)]
pub enum TieredLookupResult {
    HitL1(CachedDocument),
    /// Served from L2 and promoted into L1.
    HitL2(CachedDocument),
    /// Served from L3; promoted only once past the access threshold.
    HitL3(CachedDocument),
    Miss,
}

impl TieredLookupResult {
    pub fn is_hit(&self) -> bool {
        !matches!(self, TieredLookupResult::Miss)
    }

    pub fn is_l1_hit(&self) -> bool {
        matches!(self, TieredLookupResult::HitL1(_))
    }

    pub fn is_l2_hit(&self) -> bool {
        matches!(self, TieredLookupResult::HitL2(_))
    }

    pub fn is_l3_hit(&self) -> bool {
        matches!(self, TieredLookupResult::HitL3(_))
    }

    pub fn tier(&self) -> Option<Tier> {
        match self {
            TieredLookupResult::HitL1(_) => Some(Tier::L1),
            TieredLookupResult::HitL2(_) => Some(Tier::L2),
            TieredLookupResult::HitL3(_) => Some(Tier::L3),
            TieredLookupResult::Miss => None,
        }
    }

    pub fn document(&self) -> Option<&CachedDocument> {
        match self {
            TieredLookupResult::HitL1(doc)
            | TieredLookupResult::HitL2(doc)
            | TieredLookupResult::HitL3(doc) => Some(doc),
            TieredLookupResult::Miss => None,
        }
    }

    pub fn into_document(self) -> Option<CachedDocument> {
        match self {
            TieredLookupResult::HitL1(doc)
            | TieredLookupResult::HitL2(doc)
            | TieredLookupResult::HitL3(doc) => Some(doc),
            TieredLookupResult::Miss => None,
        }
    }
}
