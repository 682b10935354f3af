//! Memory system
//!
//! Bounded, persisted state of the engine.
//!
//! Components:
//! - Bounded History: append-only, capacity-capped log of pattern records
//! - Bounded Map: insertion-ordered table with FIFO eviction
//! - Memory Store: pattern history, historical data and forecast cache

pub mod bounded_map;
pub mod history;
pub mod store;
pub mod types;

pub use bounded_map::{BoundedMap, Inserted};
pub use history::BoundedHistory;
pub use store::{MemoryStore, Snapshot, FORECAST_CACHE_KEY, HISTORICAL_DATA_KEY, PATTERNS_KEY};
pub use types::{CacheEntry, HistoricalDataEntry, PatternRecord, StoreSizes};
