//! Engine event stream.

use crate::stats::TierStats;
use crate::sync::ChangeOperation;

/// Capacity of the broadcast channel behind [`crate::cache::TieredCache::subscribe_events`].
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events published by the engine. Slow receivers observe `Lagged` and skip ahead.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    /// Background tasks are running and the snapshot (if any) is loaded.
    Initialized,
    /// A document completed its synchronous L1 write.
    DocumentStored { id: String },
    /// A remote change notification was applied to L1.
    DocumentSynced {
        id: String,
        operation: ChangeOperation,
    },
    Stats(Box<TierStats>),
}
