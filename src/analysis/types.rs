//! Pattern and analysis result types

use serde::{Deserialize, Serialize};

/// Patterns at or above this confidence are significant
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 0.7;

/// Category of a detected pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    TemporalTrend,
    TemporalSeasonality,
    Anomaly,
    Behavioral,
    Performance,
}

impl PatternKind {
    /// All detectors in the order the analyzer runs them
    pub fn all() -> [PatternKind; 5] {
        [
            PatternKind::TemporalTrend,
            PatternKind::TemporalSeasonality,
            PatternKind::Anomaly,
            PatternKind::Behavioral,
            PatternKind::Performance,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::TemporalTrend => "temporal_trend",
            PatternKind::TemporalSeasonality => "temporal_seasonality",
            PatternKind::Anomaly => "anomaly",
            PatternKind::Behavioral => "behavioral",
            PatternKind::Performance => "performance",
        }
    }
}

/// Sign of a slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl TrendDirection {
    /// Zero counts as decreasing
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
        }
    }
}

/// Type-specific attributes of a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternDetail {
    TemporalTrend {
        direction: TrendDirection,
        slope: f64,
        strength: f64,
    },
    TemporalSeasonality {
        period: usize,
        strength: f64,
    },
    Anomaly {
        index: usize,
        value: f64,
        z_score: f64,
    },
    Behavioral {
        most_likely_action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
        distribution: Vec<ActionFrequency>,
    },
    Performance {
        direction: TrendDirection,
        slope: f64,
        average: f64,
    },
}

/// A detected regularity. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Self-reported certainty in [0, 1]
    pub confidence: f64,
    pub description: String,
    #[serde(flatten)]
    pub detail: PatternDetail,
}

impl Pattern {
    pub fn new(detail: PatternDetail, confidence: f64, description: impl Into<String>) -> Self {
        Self {
            confidence: confidence.clamp(0.0, 1.0),
            description: description.into(),
            detail,
        }
    }

    pub fn kind(&self) -> PatternKind {
        match self.detail {
            PatternDetail::TemporalTrend { .. } => PatternKind::TemporalTrend,
            PatternDetail::TemporalSeasonality { .. } => PatternKind::TemporalSeasonality,
            PatternDetail::Anomaly { .. } => PatternKind::Anomaly,
            PatternDetail::Behavioral { .. } => PatternKind::Behavioral,
            PatternDetail::Performance { .. } => PatternKind::Performance,
        }
    }

    /// Direction for trend and performance patterns
    pub fn direction(&self) -> Option<TrendDirection> {
        match self.detail {
            PatternDetail::TemporalTrend { direction, .. }
            | PatternDetail::Performance { direction, .. } => Some(direction),
            _ => None,
        }
    }

    pub fn is_significant(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

/// Result of the seasonality check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub detected: bool,
    pub period: usize,
    pub strength: f64,
    pub confidence: f64,
}

impl Seasonality {
    pub fn not_detected(period: usize) -> Self {
        Self {
            detected: false,
            period,
            strength: 0.0,
            confidence: 0.0,
        }
    }
}

/// A single outlying sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
    pub confidence: f64,
}

/// Count of one distinct action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFrequency {
    pub action: String,
    pub count: usize,
}

/// Action frequencies for a log, in first-seen order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProfile {
    pub most_likely_action: String,
    /// Relative frequency of the most likely action
    pub confidence: f64,
    pub distribution: Vec<ActionFrequency>,
    pub total_actions: usize,
}

/// Trend and level of a metric series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    pub slope: f64,
    pub average: f64,
    pub confidence: f64,
}

/// Per-category pattern counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisCounts {
    /// Trend plus seasonality
    pub temporal: usize,
    pub behavioral: usize,
    pub performance: usize,
    pub anomaly: usize,
}

impl AnalysisCounts {
    pub fn record(&mut self, kind: PatternKind) {
        match kind {
            PatternKind::TemporalTrend | PatternKind::TemporalSeasonality => self.temporal += 1,
            PatternKind::Behavioral => self.behavioral += 1,
            PatternKind::Performance => self.performance += 1,
            PatternKind::Anomaly => self.anomaly += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.temporal + self.behavioral + self.performance + self.anomaly
    }
}

/// A detector that could not analyze its input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorFailure {
    pub detector: PatternKind,
    pub message: String,
}

/// Output of one aggregate analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    /// Every detected pattern
    pub patterns: Vec<Pattern>,
    /// Patterns at or above the significance threshold
    pub significant: Vec<Pattern>,
    pub counts: AnalysisCounts,
    /// Detectors that failed; the others still ran
    pub failures: Vec<DetectorFailure>,
}

impl PatternAnalysis {
    pub fn total_patterns(&self) -> usize {
        self.patterns.len()
    }

    pub fn significant_count(&self) -> usize {
        self.significant.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_confidence_is_clamped() {
        let p = Pattern::new(
            PatternDetail::TemporalSeasonality {
                period: 12,
                strength: 0.9,
            },
            1.8,
            "seasonal",
        );
        assert_eq!(p.confidence, 1.0);
        assert_eq!(p.kind(), PatternKind::TemporalSeasonality);
        assert!(p.direction().is_none());
    }

    #[test]
    fn test_significance_threshold_is_inclusive() {
        let p = Pattern::new(
            PatternDetail::Anomaly {
                index: 0,
                value: 1.0,
                z_score: 2.1,
            },
            0.7,
            "anomaly",
        );
        assert!(p.is_significant(DEFAULT_SIGNIFICANCE_THRESHOLD));
        assert!(!p.is_significant(0.71));
    }

    #[test]
    fn test_counts_group_temporal_kinds() {
        let mut counts = AnalysisCounts::default();
        counts.record(PatternKind::TemporalTrend);
        counts.record(PatternKind::TemporalSeasonality);
        counts.record(PatternKind::Anomaly);
        assert_eq!(counts.temporal, 2);
        assert_eq!(counts.anomaly, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_pattern_json_is_flat() {
        let p = Pattern::new(
            PatternDetail::TemporalTrend {
                direction: TrendDirection::Increasing,
                slope: 0.5,
                strength: 0.5,
            },
            1.0,
            "up",
        );
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["kind"], "temporal_trend");
        assert_eq!(json["direction"], "increasing");
        let back: Pattern = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
