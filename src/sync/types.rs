use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::CachedDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Create,
    Update,
    Delete,
}

impl ChangeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOperation::Create => "create",
            ChangeOperation::Update => "update",
            ChangeOperation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Published on `<prefix>changes:<category>` after every L2 document write or delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotification {
    pub document_id: String,
    pub operation: ChangeOperation,
    pub category: String,
    /// Unix millis at publish time.
    pub timestamp: i64,
    /// Publishing instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Uuid>,
    /// Snapshot for create/update. When absent the listener reads it from L2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<CachedDocument>,
}

impl ChangeNotification {
    pub fn for_document(
        operation: ChangeOperation,
        doc: &CachedDocument,
        timestamp: i64,
        origin: Uuid,
    ) -> Self {
        let document = (operation != ChangeOperation::Delete).then(|| doc.clone());
        Self {
            document_id: doc.id.clone(),
            operation,
            category: doc.category.clone(),
            timestamp,
            origin: Some(origin),
            document,
        }
    }

    pub fn delete(id: &str, category: &str, timestamp: i64, origin: Option<Uuid>) -> Self {
        Self {
            document_id: id.to_string(),
            operation: ChangeOperation::Delete,
            category: category.to_string(),
            timestamp,
            origin,
            document: None,
        }
    }
}

/// Published on `<prefix>search:invalidate` by `invalidate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInvalidation {
    pub pattern: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Uuid>,
}
