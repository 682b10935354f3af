//! Engine facade result types

use crate::analysis::{AnalysisCounts, DetectorFailure, Pattern};
use crate::engine::state::EngineState;
use crate::forecast::{CachedForecast, ForecastResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of `recognize_patterns`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionOutcome {
    /// Significant patterns only
    pub patterns: Vec<Pattern>,
    /// Every detected pattern, significant or not
    pub all_patterns: Vec<Pattern>,
    pub total_patterns: usize,
    pub significant_patterns: usize,
    pub analysis_counts: AnalysisCounts,
    /// Detectors that could not run on this input
    pub failures: Vec<DetectorFailure>,
}

/// Result of `generate_forecast`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutcome {
    pub forecast: ForecastResult,
    pub confidence: f64,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    /// Served from the forecast cache
    pub from_cache: bool,
}

impl From<CachedForecast> for ForecastOutcome {
    fn from(cached: CachedForecast) -> Self {
        let forecast = cached.result;
        Self {
            confidence: forecast.confidence,
            model: forecast.model.clone(),
            timestamp: forecast.generated_at,
            forecast,
            from_cache: cached.from_cache,
        }
    }
}

/// Snapshot of engine health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub initialized: bool,
    pub state: EngineState,
    pub pattern_history_size: usize,
    pub historical_data_size: usize,
    pub cache_size: usize,
    pub available_models: Vec<String>,
    pub available_analyses: Vec<String>,
    /// Metrics-sink failures recorded instead of propagated
    pub collaborator_errors: usize,
}
