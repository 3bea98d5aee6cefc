//! Document model types.

use std::collections::BTreeMap;

use rkyv::Archive;
use serde::{Deserialize, Serialize};

use crate::constants::MILLIS_PER_DAY;

/// Risk classification attached to a document.
#[derive(
    Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Additive bonus used by relevance scoring.
    #[inline]
    pub fn relevance_bonus(&self) -> f64 {
        match self {
            RiskLevel::Critical => 50.0,
            RiskLevel::High => 30.0,
            RiskLevel::Medium => 15.0,
            RiskLevel::Low => 5.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown risk level: {}", s)),
        }
    }
}

/// Fastest tier currently serving a document.
#[derive(
    Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TierLocation {
    #[default]
    L1,
    L2,
    L3,
}

/// Replication state of the local copy.
#[derive(
    Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Dirty,
    #[default]
    Pending,
}

/// Named partition of archival capacity.
#[derive(
    Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum StorageClass {
    /// Lowest-latency class for critical or very high priority documents.
    Fast,
    /// Contracts and evidence.
    Pattern,
    /// Briefs and precedents.
    Logic,
    /// Everything else.
    Durable,
}

impl StorageClass {
    pub const ALL: [StorageClass; 4] = [
        StorageClass::Fast,
        StorageClass::Pattern,
        StorageClass::Logic,
        StorageClass::Durable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::Fast => "fast",
            StorageClass::Pattern => "pattern",
            StorageClass::Logic => "logic",
            StorageClass::Durable => "durable",
        }
    }
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document held by the cache.
///
/// Serialized as camelCase JSON inside L2 envelopes and as `rkyv` bytes in L3 records
/// and L1 snapshots.
///
/// # Example
/// ```rust
/// use lexcache::{CachedDocument, RiskLevel};
///
/// let doc = CachedDocument::new("c-1", "contract")
///     .with_title("Master Services Agreement")
///     .with_priority(120)
///     .with_risk_level(RiskLevel::High);
/// assert_eq!(doc.category, "contract");
/// ```
#[derive(
    Archive, rkyv::Serialize, rkyv::Deserialize, Serialize, Deserialize, Debug, Clone, PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct CachedDocument {
    /// Unique within its category.
    pub id: String,
    /// Name of the L1 collection holding this document.
    pub category: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// 0-255, higher is more important.
    pub priority: u8,
    /// 0.0-1.0.
    pub confidence_level: f32,
    pub risk_level: RiskLevel,
    /// Payload size in bytes. Computed from the text fields when zero.
    #[serde(default)]
    pub size: u64,
    /// Unix millis of the last store or access.
    #[serde(default)]
    pub cache_timestamp: i64,
    #[serde(default)]
    pub access_count: u64,
    #[serde(default)]
    pub location: TierLocation,
    #[serde(default)]
    pub compressed: bool,
    #[serde(default)]
    pub sync_status: SyncStatus,
    /// Set once the document has been allocated in an archival class.
    #[serde(default)]
    pub archive_class: Option<StorageClass>,
}

impl CachedDocument {
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            title: String::new(),
            content: String::new(),
            summary: None,
            tags: Vec::new(),
            metadata: BTreeMap::new(),
            priority: 0,
            confidence_level: 0.0,
            risk_level: RiskLevel::Low,
            size: 0,
            cache_timestamp: 0,
            access_count: 0,
            location: TierLocation::L1,
            compressed: false,
            sync_status: SyncStatus::Pending,
            archive_class: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence_level = confidence;
        self
    }

    pub fn with_risk_level(mut self, risk: RiskLevel) -> Self {
        self.risk_level = risk;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.cache_timestamp = millis;
        self
    }

    pub fn with_access_count(mut self, count: u64) -> Self {
        self.access_count = count;
        self
    }

    /// Text fields searched by substring matching, in match priority order.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        [self.id.as_str(), self.title.as_str(), self.content.as_str()]
            .into_iter()
            .chain(self.summary.as_deref())
            .chain(self.tags.iter().map(String::as_str))
    }

    /// Byte length of the payload (text fields and metadata).
    pub fn payload_len(&self) -> u64 {
        let text: usize = self.title.len()
            + self.content.len()
            + self.summary.as_ref().map_or(0, String::len)
            + self.tags.iter().map(String::len).sum::<usize>();
        let meta: usize = self.metadata.iter().map(|(k, v)| k.len() + v.len()).sum();
        (text + meta) as u64
    }

    /// Age in fractional days relative to `now_millis`. Never negative.
    #[inline]
    pub fn age_days(&self, now_millis: i64) -> f64 {
        now_millis.saturating_sub(self.cache_timestamp).max(0) as f64 / MILLIS_PER_DAY as f64
    }

    #[inline]
    pub fn is_critical(&self) -> bool {
        self.risk_level == RiskLevel::Critical
    }

    /// Records one access at `now_millis`.
    #[inline]
    pub fn touch(&mut self, now_millis: i64) {
        self.access_count = self.access_count.saturating_add(1);
        self.cache_timestamp = now_millis;
    }

    /// Compares payload and classification, ignoring access and tier bookkeeping.
    pub fn same_content(&self, other: &CachedDocument) -> bool {
        self.id == other.id
            && self.category == other.category
            && self.title == other.title
            && self.content == other.content
            && self.summary == other.summary
            && self.tags == other.tags
            && self.metadata == other.metadata
            && self.priority == other.priority
            && self.confidence_level == other.confidence_level
            && self.risk_level == other.risk_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rkyv::rancor::Error;
    use rkyv::{from_bytes, to_bytes};

    fn sample() -> CachedDocument {
        CachedDocument::new("ev-7", "evidence")
            .with_title("Deposition transcript")
            .with_content("Witness confirms the delivery date.")
            .with_summary("delivery date confirmed")
            .with_tags(["deposition", "witness"])
            .with_metadata("court", "SDNY")
            .with_priority(90)
            .with_confidence(0.8)
            .with_risk_level(RiskLevel::Medium)
            .with_timestamp(1_702_500_000_000)
    }

    #[test]
    fn test_rkyv_roundtrip() {
        let original = sample();
        let bytes = to_bytes::<Error>(&original).expect("serialization should succeed");
        let restored: CachedDocument =
            from_bytes::<CachedDocument, Error>(&bytes).expect("deserialization should succeed");
        assert_eq!(original, restored);
    }

    #[test]
    fn test_json_uses_camel_case_and_lowercase_enums() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["riskLevel"], "medium");
        assert_eq!(json["confidenceLevel"].as_f64().map(|v| v > 0.79), Some(true));
        assert_eq!(json["syncStatus"], "pending");
        assert!(json.get("risk_level").is_none());
    }

    #[test]
    fn test_json_defaults_for_missing_bookkeeping() {
        let doc: CachedDocument = serde_json::from_str(
            r#"{"id":"b-1","category":"brief","title":"t","content":"c","priority":3,"confidenceLevel":0.5,"riskLevel":"high"}"#,
        )
        .expect("deserialize");
        assert_eq!(doc.access_count, 0);
        assert_eq!(doc.location, TierLocation::L1);
        assert_eq!(doc.sync_status, SyncStatus::Pending);
        assert!(doc.archive_class.is_none());
    }

    #[test]
    fn test_text_fields_order() {
        let doc = sample();
        let fields: Vec<&str> = doc.text_fields().collect();
        assert_eq!(fields[0], "ev-7");
        assert_eq!(fields[1], "Deposition transcript");
        assert_eq!(fields.last().copied(), Some("witness"));
    }

    #[test]
    fn test_age_days_never_negative() {
        let doc = sample();
        assert_eq!(doc.age_days(doc.cache_timestamp - 10), 0.0);
        let two_days = doc.cache_timestamp + 2 * MILLIS_PER_DAY;
        assert!((doc.age_days(two_days) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_age_days_saturates_on_extreme_timestamps() {
        let doc = sample().with_timestamp(i64::MIN);
        assert!(doc.age_days(i64::MAX) > 0.0);
        let future = sample().with_timestamp(i64::MAX);
        assert_eq!(future.age_days(i64::MIN), 0.0);
    }

    #[test]
    fn test_touch_increments_and_refreshes() {
        let mut doc = sample();
        doc.touch(5);
        assert_eq!(doc.access_count, 1);
        assert_eq!(doc.cache_timestamp, 5);
    }

    #[test]
    fn test_risk_level_parse() {
        assert_eq!("CRITICAL".parse::<RiskLevel>(), Ok(RiskLevel::Critical));
        assert!("severe".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_payload_len_counts_metadata() {
        let doc = CachedDocument::new("x", "case")
            .with_title("ab")
            .with_metadata("k", "vv");
        assert_eq!(doc.payload_len(), 5);
    }
}
