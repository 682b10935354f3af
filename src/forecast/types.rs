//! Forecast type definitions

use crate::analysis::BehaviorProfile;
use crate::errors::PredictError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Forecast model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastKind {
    Trend,
    Behavior,
    Performance,
    Demand,
    Risk,
}

impl ForecastKind {
    pub fn all() -> [ForecastKind; 5] {
        [
            ForecastKind::Trend,
            ForecastKind::Behavior,
            ForecastKind::Performance,
            ForecastKind::Demand,
            ForecastKind::Risk,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastKind::Trend => "trend",
            ForecastKind::Behavior => "behavior",
            ForecastKind::Performance => "performance",
            ForecastKind::Demand => "demand",
            ForecastKind::Risk => "risk",
        }
    }

    /// Identifier of the model serving this kind
    pub fn model_id(&self) -> &'static str {
        match self {
            ForecastKind::Trend => "linear_trend",
            ForecastKind::Behavior => "behavioral_pattern",
            ForecastKind::Performance => "performance_trend",
            ForecastKind::Demand => "demand_forecast",
            ForecastKind::Risk => "risk_forecast",
        }
    }
}

impl FromStr for ForecastKind {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ForecastKind::all()
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PredictError::Validation(format!("Unknown forecast type: {}", s)))
    }
}

impl std::fmt::Display for ForecastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of one forecast step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForecastValue {
    Numeric(f64),
    Action { action: String, probability: f64 },
}

impl ForecastValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ForecastValue::Numeric(v) => Some(*v),
            ForecastValue::Action { .. } => None,
        }
    }

    pub fn as_action(&self) -> Option<&str> {
        match self {
            ForecastValue::Action { action, .. } => Some(action),
            ForecastValue::Numeric(_) => None,
        }
    }
}

/// One future step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub value: ForecastValue,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// Fitted model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ForecastDetails {
    LinearTrend { slope: f64, last_value: f64 },
    BehavioralPattern { profile: BehaviorProfile },
    PerformanceTrend { slope: f64, last_value: f64 },
    Demand { base_demand: f64, growth_rate: f64 },
    Risk { base_risk: f64, risk_trend: f64 },
}

/// Complete multi-step forecast.
///
/// `values.len() == horizon` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub kind: ForecastKind,
    pub horizon: usize,
    pub values: Vec<ForecastPoint>,
    /// Overall model confidence
    pub confidence: f64,
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub details: ForecastDetails,
}

impl ForecastResult {
    /// Numeric step values, skipping action payloads
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(|p| p.value.as_f64()).collect()
    }
}
