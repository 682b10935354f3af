//! Key-value persistence collaborators
//!
//! The engine only ever reads and writes whole values. Two backends ship
//! with the crate:
//! - `InMemoryKeyValueStore`: process-local, counts calls
//! - `JsonFileStore`: one JSON document per key on disk

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryKeyValueStore;

use crate::errors::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Async key-value store with full-value semantics
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value; expired or missing keys yield `None`
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()>;
}
