//! Analysis input variants
//!
//! Callers always state which kind of data they are handing over. Nothing
//! downstream guesses the variant from the shape of the payload.

use serde::{Deserialize, Serialize};

/// Free-form caller context attached to recognitions and historical entries
pub type AnalysisContext = serde_json::Value;

/// Tagged input accepted by the analyzer and the forecast models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AnalysisInput {
    /// Ordered numeric observations (index = time step)
    NumericSeries(Vec<f64>),
    /// Discrete user actions in the order they happened
    ActionLog(ActionLog),
    /// Ordered performance samples, usually in [0, 1]
    MetricSeries(Vec<f64>),
    /// Several of the above plus demand/risk signals
    Composite(CompositeInput),
}

/// Sequence of action labels, optionally attributed to a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub actions: Vec<String>,
}

impl ActionLog {
    pub fn new<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id: None,
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Bag of optional parts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<ActionLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<f64>>,
    /// Demand observations; the first value is the demand baseline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_trend: Option<f64>,
}

impl AnalysisInput {
    /// Numeric series, directly or from a composite
    pub fn numeric_series(&self) -> Option<&[f64]> {
        match self {
            AnalysisInput::NumericSeries(values) => Some(values),
            AnalysisInput::Composite(c) => c.series.as_deref(),
            _ => None,
        }
    }

    /// Action log, directly or from a composite
    pub fn action_log(&self) -> Option<&ActionLog> {
        match self {
            AnalysisInput::ActionLog(log) => Some(log),
            AnalysisInput::Composite(c) => c.actions.as_ref(),
            _ => None,
        }
    }

    /// Metric series, directly or from a composite
    pub fn metric_series(&self) -> Option<&[f64]> {
        match self {
            AnalysisInput::MetricSeries(values) => Some(values),
            AnalysisInput::Composite(c) => c.metrics.as_deref(),
            _ => None,
        }
    }

    /// Demand baseline and growth rate, if supplied
    pub fn demand_signal(&self) -> (Option<f64>, Option<f64>) {
        match self {
            AnalysisInput::Composite(c) => (
                c.demand.as_ref().and_then(|d| d.first().copied()),
                c.growth_rate,
            ),
            _ => (None, None),
        }
    }

    /// Base risk and risk trend, if supplied
    pub fn risk_signal(&self) -> (Option<f64>, Option<f64>) {
        match self {
            AnalysisInput::Composite(c) => (c.risk, c.risk_trend),
            _ => (None, None),
        }
    }

    /// Variant name used in logs and metrics
    pub fn variant_name(&self) -> &'static str {
        match self {
            AnalysisInput::NumericSeries(_) => "numeric_series",
            AnalysisInput::ActionLog(_) => "action_log",
            AnalysisInput::MetricSeries(_) => "metric_series",
            AnalysisInput::Composite(_) => "composite",
        }
    }

    /// Total number of samples carried by the input
    pub fn size(&self) -> usize {
        match self {
            AnalysisInput::NumericSeries(v) | AnalysisInput::MetricSeries(v) => v.len(),
            AnalysisInput::ActionLog(log) => log.actions.len(),
            AnalysisInput::Composite(c) => {
                c.series.as_ref().map_or(0, Vec::len)
                    + c.actions.as_ref().map_or(0, |a| a.actions.len())
                    + c.metrics.as_ref().map_or(0, Vec::len)
                    + c.demand.as_ref().map_or(0, Vec::len)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_follow_variant() {
        let series = AnalysisInput::NumericSeries(vec![1.0, 2.0]);
        assert_eq!(series.numeric_series(), Some(&[1.0, 2.0][..]));
        assert!(series.metric_series().is_none());
        assert!(series.action_log().is_none());

        let metrics = AnalysisInput::MetricSeries(vec![0.5]);
        assert!(metrics.numeric_series().is_none());
        assert_eq!(metrics.metric_series(), Some(&[0.5][..]));
    }

    #[test]
    fn test_composite_parts() {
        let input = AnalysisInput::Composite(CompositeInput {
            series: Some(vec![1.0, 2.0, 3.0]),
            actions: Some(ActionLog::new(["open", "close"]).with_user("u1")),
            demand: Some(vec![250.0, 260.0]),
            growth_rate: Some(0.1),
            ..Default::default()
        });

        assert_eq!(input.numeric_series().map(|s| s.len()), Some(3));
        assert_eq!(input.action_log().and_then(|l| l.user_id.as_deref()), Some("u1"));
        assert_eq!(input.demand_signal(), (Some(250.0), Some(0.1)));
        assert_eq!(input.risk_signal(), (None, None));
        assert_eq!(input.size(), 7);
    }

    #[test]
    fn test_tagged_json_shape() {
        let json = r#"{"type":"numeric_series","data":[1.0,2.5]}"#;
        let input: AnalysisInput = serde_json::from_str(json).unwrap();
        assert_eq!(input, AnalysisInput::NumericSeries(vec![1.0, 2.5]));

        let json = r#"{"type":"action_log","data":{"actions":["a","b"]}}"#;
        let input: AnalysisInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.variant_name(), "action_log");
        assert_eq!(input.size(), 2);
    }
}
