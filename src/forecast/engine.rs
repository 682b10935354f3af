//! Forecast Engine: per-kind multi-step forecast models
//!
//! Models:
//! - trend:       last + slope·i, confidence max(0.5, 1 − 0.1·i)
//! - behavior:    most likely action repeated at the pattern's confidence
//! - performance: last + slope·i, confidence max(0.3, 1 − 0.15·i)
//! - demand:      base·(1 + growth·i), constant confidence 0.7
//! - risk:        base·(1 + trend·i), constant confidence 0.6
//!
//! Results are written through the memory store's TTL cache, keyed by a
//! fingerprint of (input, kind, horizon).

use crate::analysis::stats::{ensure_finite, linear_slope};
use crate::analysis::PatternAnalyzer;
use crate::errors::{PredictError, Result};
use crate::forecast::types::{
    ForecastDetails, ForecastKind, ForecastPoint, ForecastResult, ForecastValue,
};
use crate::memory::MemoryStore;
use crate::types::AnalysisInput;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Largest accepted horizon, in steps
pub const MAX_FORECAST_HORIZON: usize = 10_000;

/// Demand baseline when the input carries none
pub const DEFAULT_BASE_DEMAND: f64 = 100.0;

/// Demand growth per step when the input carries none
pub const DEFAULT_GROWTH_RATE: f64 = 0.05;

/// Risk baseline when the input carries none
pub const DEFAULT_BASE_RISK: f64 = 0.1;

/// Risk growth per step when the input carries none
pub const DEFAULT_RISK_TREND: f64 = 0.02;

const DEMAND_CONFIDENCE: f64 = 0.7;
const RISK_CONFIDENCE: f64 = 0.6;

/// Forecast output plus whether it came from the cache
#[derive(Debug, Clone)]
pub struct CachedForecast {
    pub result: ForecastResult,
    pub from_cache: bool,
}

/// Dispatches forecast requests to the matching model
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    analyzer: PatternAnalyzer,
}

impl ForecastEngine {
    pub fn new(analyzer: PatternAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Cache lookup, then model dispatch and cache store on miss or expiry
    pub async fn generate(
        &self,
        store: &mut MemoryStore,
        input: &AnalysisInput,
        kind: ForecastKind,
        horizon: usize,
    ) -> Result<CachedForecast> {
        let key = cache_key(input, kind, horizon)?;
        let now = Utc::now();

        if let Some(hit) = store.cache_get(&key, now) {
            debug!(key = %key, "forecast cache hit");
            return Ok(CachedForecast {
                result: hit.clone(),
                from_cache: true,
            });
        }

        let result = self.forecast(input, kind, horizon, now)?;
        let ttl = store.cache_ttl();
        store.cache_put(&key, result.clone(), ttl, now).await?;

        Ok(CachedForecast {
            result,
            from_cache: false,
        })
    }

    /// Run one model without touching the cache
    pub fn forecast(
        &self,
        input: &AnalysisInput,
        kind: ForecastKind,
        horizon: usize,
        now: DateTime<Utc>,
    ) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(PredictError::Validation(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        if horizon > MAX_FORECAST_HORIZON {
            return Err(PredictError::Validation(format!(
                "forecast horizon {} exceeds the maximum of {}",
                horizon, MAX_FORECAST_HORIZON
            )));
        }

        let (values, confidence, details) = match kind {
            ForecastKind::Trend => self.forecast_trend(input, horizon, now)?,
            ForecastKind::Behavior => self.forecast_behavior(input, horizon, now)?,
            ForecastKind::Performance => self.forecast_performance(input, horizon, now)?,
            ForecastKind::Demand => self.forecast_demand(input, horizon, now)?,
            ForecastKind::Risk => self.forecast_risk(input, horizon, now)?,
        };

        debug_assert_eq!(values.len(), horizon);
        Ok(ForecastResult {
            kind,
            horizon,
            values,
            confidence,
            model: kind.model_id().to_string(),
            generated_at: now,
            details,
        })
    }

    fn forecast_trend(
        &self,
        input: &AnalysisInput,
        horizon: usize,
        now: DateTime<Utc>,
    ) -> Result<ModelOutput> {
        let series = input.numeric_series().unwrap_or_default();
        let (slope, last_value) = fit_line(series, "trend forecast")?;

        let values = (1..=horizon)
            .map(|i| -> Result<ForecastPoint> {
                Ok(ForecastPoint {
                    value: ForecastValue::Numeric(last_value + slope * i as f64),
                    confidence: decayed_confidence(0.1, 0.5, i),
                    timestamp: step_time(now, Duration::days(i as i64))?,
                })
            })
            .collect::<Result<_>>()?;

        Ok((
            values,
            (slope.abs() * 2.0).min(1.0),
            ForecastDetails::LinearTrend { slope, last_value },
        ))
    }

    fn forecast_behavior(
        &self,
        input: &AnalysisInput,
        horizon: usize,
        now: DateTime<Utc>,
    ) -> Result<ModelOutput> {
        let log = input.action_log().ok_or_else(|| {
            PredictError::Validation("No behavior patterns found for forecasting".to_string())
        })?;
        let profile = self.analyzer.analyze_behavior(log)?;

        let values = (1..=horizon)
            .map(|i| -> Result<ForecastPoint> {
                Ok(ForecastPoint {
                    value: ForecastValue::Action {
                        action: profile.most_likely_action.clone(),
                        probability: profile.confidence,
                    },
                    confidence: profile.confidence,
                    timestamp: step_time(now, Duration::hours(i as i64))?,
                })
            })
            .collect::<Result<_>>()?;

        Ok((
            values,
            profile.confidence,
            ForecastDetails::BehavioralPattern { profile },
        ))
    }

    fn forecast_performance(
        &self,
        input: &AnalysisInput,
        horizon: usize,
        now: DateTime<Utc>,
    ) -> Result<ModelOutput> {
        let metrics = input.metric_series().unwrap_or_default();
        let (slope, last_value) = fit_line(metrics, "performance forecast")?;

        let values = (1..=horizon)
            .map(|i| -> Result<ForecastPoint> {
                Ok(ForecastPoint {
                    value: ForecastValue::Numeric(last_value + slope * i as f64),
                    confidence: decayed_confidence(0.15, 0.3, i),
                    timestamp: step_time(now, Duration::days(i as i64))?,
                })
            })
            .collect::<Result<_>>()?;

        Ok((
            values,
            (slope.abs() * 1.5).min(1.0),
            ForecastDetails::PerformanceTrend { slope, last_value },
        ))
    }

    fn forecast_demand(
        &self,
        input: &AnalysisInput,
        horizon: usize,
        now: DateTime<Utc>,
    ) -> Result<ModelOutput> {
        let (base, rate) = input.demand_signal();
        let base_demand = base.unwrap_or(DEFAULT_BASE_DEMAND);
        let growth_rate = rate.unwrap_or(DEFAULT_GROWTH_RATE);

        Ok((
            linear_growth(base_demand, growth_rate, DEMAND_CONFIDENCE, horizon, now)?,
            DEMAND_CONFIDENCE,
            ForecastDetails::Demand {
                base_demand,
                growth_rate,
            },
        ))
    }

    fn forecast_risk(
        &self,
        input: &AnalysisInput,
        horizon: usize,
        now: DateTime<Utc>,
    ) -> Result<ModelOutput> {
        let (base, trend) = input.risk_signal();
        let base_risk = base.unwrap_or(DEFAULT_BASE_RISK);
        let risk_trend = trend.unwrap_or(DEFAULT_RISK_TREND);

        Ok((
            linear_growth(base_risk, risk_trend, RISK_CONFIDENCE, horizon, now)?,
            RISK_CONFIDENCE,
            ForecastDetails::Risk {
                base_risk,
                risk_trend,
            },
        ))
    }
}

/// Step values, overall confidence, model parameters
type ModelOutput = (Vec<ForecastPoint>, f64, ForecastDetails);

/// Slope and last value of a series with at least two finite points
fn fit_line(series: &[f64], operation: &str) -> Result<(f64, f64)> {
    ensure_finite(series, operation)?;
    match (linear_slope(series), series.last()) {
        (Some(slope), Some(&last)) => Ok((slope, last)),
        _ => Err(PredictError::insufficient(operation, 2, series.len())),
    }
}

/// `max(floor, 1 − decay·step)`, rounded to ten decimals so that
/// 1 − 0.1·3 reads back as 0.7
fn decayed_confidence(decay: f64, floor: f64, step: usize) -> f64 {
    let raw = (1.0 - decay * step as f64).max(floor);
    (raw * 1e10).round() / 1e10
}

/// `base·(1 + rate·i)`: linear, not compounded
fn linear_growth(
    base: f64,
    rate: f64,
    confidence: f64,
    horizon: usize,
    now: DateTime<Utc>,
) -> Result<Vec<ForecastPoint>> {
    (1..=horizon)
        .map(|i| -> Result<ForecastPoint> {
            Ok(ForecastPoint {
                value: ForecastValue::Numeric(base * (1.0 + rate * i as f64)),
                confidence,
                timestamp: step_time(now, Duration::days(i as i64))?,
            })
        })
        .collect()
}

/// Timestamp `offset` after `now`, rejecting dates past chrono's range
fn step_time(now: DateTime<Utc>, offset: Duration) -> Result<DateTime<Utc>> {
    now.checked_add_signed(offset).ok_or_else(|| {
        PredictError::Validation("forecast horizon runs past the last representable date".to_string())
    })
}

/// Cache key for a forecast request: `forecast_<hash>_<kind>_<horizon>`.
///
/// The hash is the first 8 bytes of the SHA-256 of the input's JSON, so keys
/// stay stable across builds and persisted cache entries keep matching.
pub fn cache_key(input: &AnalysisInput, kind: ForecastKind, horizon: usize) -> Result<String> {
    let canonical = serde_json::to_string(input)?;
    let digest = Sha256::digest(canonical.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    Ok(format!(
        "forecast_{:016x}_{}_{}",
        u64::from_be_bytes(prefix),
        kind.as_str(),
        horizon
    ))
}
