//! Memory Store: bounded, persisted engine state
//!
//! Owns the pattern history, the historical-data table and the forecast
//! cache. Every mutation writes a full snapshot of the collection it touched
//! through the key-value collaborator; when that write fails the mutation is
//! undone, evictions included, so memory never runs ahead of persistence.
//! The store itself is not synchronized; the engine keeps it behind a single
//! async mutex.

use crate::config::StoreConfig;
use crate::errors::Result;
use crate::forecast::ForecastResult;
use crate::memory::bounded_map::BoundedMap;
use crate::memory::history::BoundedHistory;
use crate::memory::types::{CacheEntry, HistoricalDataEntry, PatternRecord, StoreSizes};
use crate::persistence::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Persistence key of the pattern history snapshot
pub const PATTERNS_KEY: &str = "predictive_patterns";

/// Persistence key of the historical-data snapshot
pub const HISTORICAL_DATA_KEY: &str = "predictive_historical_data";

/// Persistence key of the forecast cache snapshot
pub const FORECAST_CACHE_KEY: &str = "predictive_forecast_cache";

/// Persisted collections of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    Patterns,
    HistoricalData,
    ForecastCache,
}

/// Bounded collections backed by async persistence
pub struct MemoryStore {
    patterns: BoundedHistory<PatternRecord>,
    historical: BoundedMap<String, HistoricalDataEntry>,
    cache: BoundedMap<String, CacheEntry>,
    persistence: Arc<dyn KeyValueStore>,
    config: StoreConfig,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new(persistence: Arc<dyn KeyValueStore>, config: StoreConfig) -> Self {
        Self {
            patterns: BoundedHistory::new(config.max_history_size),
            historical: BoundedMap::new(config.max_history_size),
            cache: BoundedMap::new(config.max_cache_entries),
            persistence,
            config,
        }
    }

    /// Replace in-memory state with the persisted snapshots.
    ///
    /// Missing keys leave the matching collection empty. Expired cache
    /// entries are dropped on load.
    pub async fn load(&mut self) -> Result<()> {
        let records: Vec<PatternRecord> = self.read_snapshot(PATTERNS_KEY).await?;
        self.patterns = BoundedHistory::from_items(records, self.config.max_history_size);

        let entries: Vec<HistoricalDataEntry> = self.read_snapshot(HISTORICAL_DATA_KEY).await?;
        self.historical = BoundedMap::new(self.config.max_history_size);
        for entry in entries {
            self.historical.insert(entry.id.clone(), entry);
        }

        let cached: Vec<CacheEntry> = self.read_snapshot(FORECAST_CACHE_KEY).await?;
        self.cache = BoundedMap::new(self.config.max_cache_entries);
        let now = Utc::now();
        for entry in cached.into_iter().filter(|e| !e.is_expired(now)) {
            self.cache.insert(entry.key.clone(), entry);
        }

        info!(
            patterns = self.patterns.len(),
            historical = self.historical.len(),
            cached = self.cache.len(),
            "memory store loaded"
        );
        Ok(())
    }

    async fn read_snapshot<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.persistence.get(key).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Append a pattern set, dropping the oldest records past capacity.
    ///
    /// All or nothing: a failed snapshot write leaves the history as it was.
    pub async fn append_pattern(&mut self, record: PatternRecord) -> Result<()> {
        let dropped = self.patterns.push(record);
        if let Err(err) = self.persist(Snapshot::Patterns).await {
            self.patterns.undo_push(dropped);
            warn!(error = %err, "pattern snapshot write failed, append undone");
            return Err(err);
        }
        if !dropped.is_empty() {
            debug!(dropped = dropped.len(), "pattern history truncated");
        }
        Ok(())
    }

    /// Insert a historical entry, evicting the oldest-inserted one past capacity.
    ///
    /// All or nothing, like `append_pattern`.
    pub async fn put_historical_data(&mut self, entry: HistoricalDataEntry) -> Result<()> {
        let id = entry.id.clone();
        let inserted = self.historical.insert(id.clone(), entry);
        if let Err(err) = self.persist(Snapshot::HistoricalData).await {
            self.historical.undo_insert(&id, inserted);
            warn!(id = %id, error = %err, "historical snapshot write failed, insert undone");
            return Err(err);
        }
        if let Some((evicted, _)) = inserted.evicted() {
            debug!(evicted = %evicted, "historical entry evicted");
        }
        Ok(())
    }

    pub fn get_historical_data(&self, id: &str) -> Option<&HistoricalDataEntry> {
        self.historical.get(id)
    }

    /// Cached result for `key`, unless missing or expired at `now`
    pub fn cache_get(&self, key: &str, now: DateTime<Utc>) -> Option<&ForecastResult> {
        self.cache
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| &entry.result)
    }

    /// Write a forecast through the cache.
    ///
    /// Expired entries are purged first so they never reach the snapshot. A
    /// failed snapshot write undoes the insert, so the next lookup recomputes
    /// instead of serving an unpersisted result.
    pub async fn cache_put(
        &mut self,
        key: &str,
        result: ForecastResult,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.purge_expired(now);

        let key = key.to_string();
        let entry = CacheEntry {
            key: key.clone(),
            result,
            written_at: now,
            ttl,
        };
        let inserted = self.cache.insert(key.clone(), entry);
        if let Err(err) = self.persist(Snapshot::ForecastCache).await {
            self.cache.undo_insert(&key, inserted);
            return Err(err);
        }
        Ok(())
    }

    /// Drop expired cache entries, returning how many were removed
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let purged = self.cache.remove_where(|_, entry| entry.is_expired(now));
        if purged > 0 {
            debug!(purged, "expired forecasts purged");
        }
        purged
    }

    /// Oldest to newest
    pub fn pattern_history(&self) -> impl Iterator<Item = &PatternRecord> {
        self.patterns.iter()
    }

    /// Newest `limit` records, oldest first
    pub fn recent_patterns(&self, limit: usize) -> Vec<PatternRecord> {
        self.patterns.recent(limit).cloned().collect()
    }

    pub fn sizes(&self) -> StoreSizes {
        StoreSizes {
            pattern_history: self.patterns.len(),
            historical_data: self.historical.len(),
            cache: self.cache.len(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        self.config.cache_ttl()
    }

    /// Write a full snapshot of one collection
    pub async fn persist(&self, snapshot: Snapshot) -> Result<()> {
        match snapshot {
            Snapshot::Patterns => {
                let value = serde_json::to_value(self.patterns.iter().collect::<Vec<_>>())?;
                self.persistence.set(PATTERNS_KEY, value, None).await
            }
            Snapshot::HistoricalData => {
                let value = serde_json::to_value(self.historical.values().collect::<Vec<_>>())?;
                self.persistence.set(HISTORICAL_DATA_KEY, value, None).await
            }
            Snapshot::ForecastCache => {
                let value = serde_json::to_value(self.cache.values().collect::<Vec<_>>())?;
                self.persistence
                    .set(FORECAST_CACHE_KEY, value, Some(self.config.cache_ttl()))
                    .await
            }
        }
    }
}
