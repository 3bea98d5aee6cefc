use std::time::Duration;

use async_trait::async_trait;

use super::error::L2Result;
use super::types::Subscription;

#[async_trait]
/// Shared cache reachable by every engine instance.
///
/// Keys and channels are opaque strings; patterns use Redis glob syntax. Timeouts and
/// reconnection belong to the implementation.
pub trait DistributedBackend: Send + Sync {
    /// Returns the value stored under `key`, if any and not expired.
    async fn get(&self, key: &str) -> L2Result<Option<String>>;
    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> L2Result<()>;
    /// Deletes `keys`; returns how many existed.
    async fn delete(&self, keys: &[String]) -> L2Result<u64>;
    /// Lists keys matching a glob `pattern`.
    async fn keys(&self, pattern: &str) -> L2Result<Vec<String>>;
    /// Publishes `message` on `channel`; returns the number of receivers.
    async fn publish(&self, channel: &str, message: String) -> L2Result<u64>;
    /// Subscribes to every channel matching any of `patterns`.
    async fn subscribe(&self, patterns: &[String]) -> L2Result<Subscription>;
    /// Cheap connectivity check.
    async fn ping(&self) -> L2Result<()>;
    /// Releases connections. Later calls fail with `L2Error::Closed`.
    async fn close(&self) -> L2Result<()>;
}
