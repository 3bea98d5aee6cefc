//! In-process [`DistributedBackend`] for single-node deployments and tests.
//!
//! Values live in a moka cache with per-entry TTL. Pub/sub fans each published message
//! out to every subscriber whose patterns match the channel. Engines holding connections
//! from [`InMemoryBackend::connect`] behave like instances sharing one Redis.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use glob::Pattern;
use moka::Expiry;
use moka::sync::Cache;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::backend::DistributedBackend;
use super::error::{L2Error, L2Result};
use super::types::{ChannelMessage, Subscription};

pub const DEFAULT_IN_MEMORY_CAPACITY: u64 = 100_000;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

struct Subscriber {
    connection: u64,
    patterns: Vec<Pattern>,
    sender: mpsc::UnboundedSender<ChannelMessage>,
}

struct Hub {
    entries: Cache<String, StoredValue>,
    subscribers: Mutex<Vec<Subscriber>>,
    available: AtomicBool,
    next_connection: AtomicU64,
}

/// Connection to an in-process hub. Use [`InMemoryBackend::connect`] to open another
/// connection onto the same data.
pub struct InMemoryBackend {
    hub: Arc<Hub>,
    connection: u64,
    closed: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_IN_MEMORY_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        let hub = Hub {
            entries: Cache::builder()
                .max_capacity(capacity)
                .expire_after(PerEntryTtl)
                .build(),
            subscribers: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            next_connection: AtomicU64::new(1),
        };
        Self {
            hub: Arc::new(hub),
            connection: 0,
            closed: AtomicBool::new(false),
        }
    }

    /// Opens another connection sharing this backend's keys and channels.
    pub fn connect(&self) -> Self {
        Self {
            hub: Arc::clone(&self.hub),
            connection: self.hub.next_connection.fetch_add(1, Ordering::Relaxed),
            closed: AtomicBool::new(false),
        }
    }

    /// Simulates an outage on every connection until restored.
    #[cfg(any(test, feature = "mock"))]
    pub fn set_available(&self, available: bool) {
        self.hub.available.store(available, Ordering::Release);
    }

    /// Number of live entries (runs pending maintenance first).
    pub fn entry_count(&self) -> u64 {
        self.hub.entries.run_pending_tasks();
        self.hub.entries.entry_count()
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.hub.subscribers.lock();
        subscribers.retain(|s| !s.sender.is_closed());
        subscribers.len()
    }

    fn check(&self) -> L2Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(L2Error::Closed);
        }
        if !self.hub.available.load(Ordering::Acquire) {
            return Err(L2Error::Unavailable {
                reason: "in-memory backend marked unavailable".to_string(),
            });
        }
        Ok(())
    }
}

fn compile(pattern: &str) -> L2Result<Pattern> {
    Pattern::new(pattern).map_err(|e| L2Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("connection", &self.connection)
            .field("entries", &self.hub.entries.entry_count())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

#[async_trait]
impl DistributedBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> L2Result<Option<String>> {
        self.check()?;
        Ok(self.hub.entries.get(key).map(|v| v.value))
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> L2Result<()> {
        self.check()?;
        self.hub
            .entries
            .insert(key.to_string(), StoredValue { value, ttl });
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> L2Result<u64> {
        self.check()?;
        Ok(keys
            .iter()
            .filter(|k| self.hub.entries.remove(k.as_str()).is_some())
            .count() as u64)
    }

    async fn keys(&self, pattern: &str) -> L2Result<Vec<String>> {
        self.check()?;
        let pattern = compile(pattern)?;
        let mut keys: Vec<String> = self
            .hub
            .entries
            .iter()
            .filter(|(k, _)| pattern.matches(k))
            .map(|(k, _)| k.to_string())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn publish(&self, channel: &str, message: String) -> L2Result<u64> {
        self.check()?;
        let mut subscribers = self.hub.subscribers.lock();
        subscribers.retain(|s| !s.sender.is_closed());
        let mut delivered = 0;
        for subscriber in subscribers.iter() {
            if subscriber.patterns.iter().any(|p| p.matches(channel)) {
                let msg = ChannelMessage {
                    channel: channel.to_string(),
                    payload: message.clone(),
                };
                if subscriber.sender.send(msg).is_ok() {
                    delivered += 1;
                }
            }
        }
        Ok(delivered)
    }

    async fn subscribe(&self, patterns: &[String]) -> L2Result<Subscription> {
        self.check()?;
        let patterns = patterns
            .iter()
            .map(|p| compile(p))
            .collect::<L2Result<Vec<_>>>()?;
        let (sender, receiver) = mpsc::unbounded_channel();
        self.hub.subscribers.lock().push(Subscriber {
            connection: self.connection,
            patterns,
            sender,
        });
        Ok(receiver)
    }

    async fn ping(&self) -> L2Result<()> {
        self.check()
    }

    async fn close(&self) -> L2Result<()> {
        // Dropping the senders ends this connection's subscription streams.
        self.closed.store(true, Ordering::Release);
        self.hub
            .subscribers
            .lock()
            .retain(|s| s.connection != self.connection);
        Ok(())
    }
}
