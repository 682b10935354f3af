//! Telemetry for PredictBuddy
//!
//! Operation metrics leave the engine through a `MetricsSink`. Sinks may
//! fail; the engine records such failures instead of propagating them.

use crate::errors::{PredictError, Result};
use crate::memory::BoundedHistory;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// Structured fields attached to a metric event
pub type MetricFields = Map<String, Value>;

/// Fields from a JSON object; anything else yields no fields
pub fn metric_fields(value: Value) -> MetricFields {
    match value {
        Value::Object(map) => map,
        _ => MetricFields::new(),
    }
}

/// Destination for operation metrics
pub trait MetricsSink: Send + Sync {
    fn log(&self, event: &str, fields: MetricFields) -> Result<()>;
}

/// Emits each metric as a `tracing` event on the `predictbuddy::metrics` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn log(&self, event: &str, fields: MetricFields) -> Result<()> {
        let fields = Value::Object(fields);
        info!(target: "predictbuddy::metrics", event, fields = %fields, "metric");
        Ok(())
    }
}

/// One recorded metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEvent {
    pub name: String,
    pub fields: MetricFields,
    pub timestamp: DateTime<Utc>,
}

impl MetricEvent {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Events a `RecordingMetrics` keeps before dropping the oldest
pub const DEFAULT_RECORDED_EVENTS: usize = 10_000;

#[derive(Debug)]
struct Recorded {
    events: BoundedHistory<MetricEvent>,
    /// Per-name totals, including events no longer retained
    counts: HashMap<String, usize>,
    failing_logs: usize,
}

/// Keeps the newest metrics in memory; clones share the same buffer
#[derive(Debug, Clone)]
pub struct RecordingMetrics {
    inner: Arc<Mutex<Recorded>>,
}

impl Default for RecordingMetrics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RECORDED_EVENTS)
    }
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder retaining at most `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Recorded {
                events: BoundedHistory::new(capacity),
                counts: HashMap::new(),
                failing_logs: 0,
            })),
        }
    }

    /// Make the next `count` log calls fail
    pub fn fail_next_logs(&self, count: usize) {
        self.lock().failing_logs = count;
    }

    pub fn events(&self) -> Vec<MetricEvent> {
        self.lock().events.iter().cloned().collect()
    }

    /// Events recorded under `name`, oldest first
    pub fn events_named(&self, name: &str) -> Vec<MetricEvent> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.lock().counts.get(name).copied().unwrap_or(0)
    }

    pub fn event_count(&self) -> usize {
        self.lock().events.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricsSink for RecordingMetrics {
    fn log(&self, event: &str, fields: MetricFields) -> Result<()> {
        let mut recorded = self.lock();
        if recorded.failing_logs > 0 {
            recorded.failing_logs -= 1;
            return Err(PredictError::transient("metrics", "sink unavailable"));
        }

        *recorded.counts.entry(event.to_string()).or_insert(0) += 1;
        recorded.events.push(MetricEvent {
            name: event.to_string(),
            fields,
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
