//! Process-local key-value store

use crate::errors::{PredictError, Result};
use crate::persistence::KeyValueStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredValue {
    value: Value,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-memory store with TTL support and call counters
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    values: RwLock<HashMap<String, StoredValue>>,
    get_calls: AtomicUsize,
    set_calls: AtomicUsize,
    /// Number of upcoming writes that fail with a transient error
    failing_writes: AtomicUsize,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls served so far
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Number of `set` calls received so far, failed ones included
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Make the next `count` writes fail as if the backend were unavailable
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Number of live keys
    pub async fn len(&self) -> usize {
        self.values
            .read()
            .await
            .values()
            .filter(|v| !v.is_expired())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn take_failure(&self) -> bool {
        self.failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let values = self.values.read().await;
        Ok(values
            .get(key)
            .filter(|v| !v.is_expired())
            .map(|v| v.value.clone()))
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            return Err(PredictError::transient(
                "persistence",
                format!("write to '{}' rejected", key),
            ));
        }

        let expires_at = ttl.map(|t| Instant::now() + t);
        self.values
            .write()
            .await
            .insert(key.to_string(), StoredValue { value, expires_at });
        Ok(())
    }
}
