use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::document::CachedDocument;

/// Value stored under `<prefix>doc:<id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEnvelope {
    pub document: CachedDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<Vec<u8>>,
}

/// One message delivered on a subscribed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub channel: String,
    pub payload: String,
}

/// Receiving side of a pattern subscription.
pub type Subscription = mpsc::UnboundedReceiver<ChannelMessage>;
