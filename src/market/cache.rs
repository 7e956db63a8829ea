//! Response cache for Pendle API listings
//!
//! Keyed by the full request URL. The cache is handed to the client
//! explicitly, so tests can swap in a manual clock or disable caching.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Trait for response cache implementations
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Cached body for `key`, if still fresh
    async fn get(&self, key: &str) -> Option<Value>;
    /// Store a body under `key`
    async fn put(&self, key: &str, body: Value);
}

/// Cache that never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    async fn put(&self, _key: &str, _body: Value) {}
}

/// In-memory cache with a fixed time-to-live per entry
pub struct TtlCache<C: Clock = SystemClock> {
    ttl: Duration,
    clock: C,
    entries: RwLock<HashMap<String, (DateTime<Utc>, Value)>>,
}

impl TtlCache<SystemClock> {
    /// Create a cache backed by the wall clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<C: Clock> TtlCache<C> {
    /// Create a cache with a custom clock
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<C: Clock> ResponseCache for TtlCache<C> {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let (stored_at, body) = entries.get(key)?;
        if now - *stored_at < self.ttl {
            return Some(body.clone());
        }
        entries.remove(key);
        tracing::debug!(key, "Evicted stale cache entry");
        None
    }

    async fn put(&self, key: &str, body: Value) {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, (stored_at, _)| now - *stored_at < self.ttl);
        if entries.len() < before {
            tracing::debug!(evicted = before - entries.len(), "Swept stale cache entries");
        }
        entries.insert(key.to_string(), (now, body));
    }
}
