//! Core data types for the memory store

use crate::analysis::Pattern;
use crate::forecast::ForecastResult;
use crate::types::AnalysisContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One significant-pattern set appended after a recognition call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub id: String,
    pub patterns: Vec<Pattern>,
    pub context: AnalysisContext,
    pub recorded_at: DateTime<Utc>,
}

impl PatternRecord {
    pub fn new(patterns: Vec<Pattern>, context: AnalysisContext) -> Self {
        Self {
            id: format!("pattern_{}", uuid::Uuid::new_v4().simple()),
            patterns,
            context,
            recorded_at: Utc::now(),
        }
    }
}

/// Caller-supplied data kept for later analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataEntry {
    pub id: String,
    pub payload: serde_json::Value,
    pub context: AnalysisContext,
    pub timestamp: DateTime<Utc>,
}

impl HistoricalDataEntry {
    pub fn new(payload: serde_json::Value, context: AnalysisContext) -> Self {
        Self {
            id: format!("data_{}", uuid::Uuid::new_v4().simple()),
            payload,
            context,
            timestamp: Utc::now(),
        }
    }
}

/// Cached forecast with its write time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub result: ForecastResult,
    pub written_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CacheEntry {
    /// Expired once strictly more than `ttl` has passed since the write
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => now - self.written_at > ttl,
            // TTL beyond chrono's range never expires
            Err(_) => false,
        }
    }
}

/// Collection sizes reported by the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSizes {
    pub pattern_history: usize,
    pub historical_data: usize,
    pub cache: usize,
}
