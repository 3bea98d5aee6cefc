//! L2 distributed tier: shared cache with per-key TTL and pub/sub.

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod tier;
pub mod types;


pub use backend::DistributedBackend;
pub use config::L2Config;
pub use error::{L2Error, L2Result};
pub use memory::InMemoryBackend;
pub use tier::DistributedTier;
pub use types::{ChannelMessage, DocumentEnvelope, Subscription};
