//! Pattern Analyzer: statistical detectors over typed inputs
//!
//! Detectors:
//! - Temporal trend: least-squares slope, emitted when |slope| > 0.1
//! - Seasonality: phase-average spread with an assumed period of 12
//! - Anomaly: population z-score of 2 or more
//! - Behavioral: most frequent action in an action log
//! - Performance: slope and mean of a metric series
//!
//! The aggregate `recognize` call isolates each detector. A detector that
//! cannot analyze its data is recorded as a failure and the rest still run.

use crate::analysis::stats::{ensure_finite, linear_slope, mean, seasonal_strength, std_dev};
use crate::analysis::types::{
    ActionFrequency, Anomaly, AnalysisCounts, BehaviorProfile, DetectorFailure, Pattern,
    PatternAnalysis, PatternDetail, PatternKind, PerformanceProfile, Seasonality, TrendDirection,
    DEFAULT_SIGNIFICANCE_THRESHOLD,
};
use crate::errors::{PredictError, Result};
use crate::types::{ActionLog, AnalysisInput};
use tracing::debug;

/// Minimum |slope| for a trend pattern
pub const TREND_SLOPE_THRESHOLD: f64 = 0.1;

/// Assumed seasonal period
pub const SEASONAL_PERIOD: usize = 12;

/// Minimum seasonal strength for detection
pub const SEASONAL_STRENGTH_THRESHOLD: f64 = 0.3;

/// Z-score at which a sample becomes anomalous
pub const ANOMALY_Z_THRESHOLD: f64 = 2.0;

/// Stateless pattern analyzer
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    /// Significance threshold for the aggregate call
    threshold: f64,
}

impl PatternAnalyzer {
    /// Create analyzer with the default significance threshold
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SIGNIFICANCE_THRESHOLD)
    }

    /// Create analyzer with a custom significance threshold
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Temporal trend over a numeric series.
    ///
    /// Returns `Ok(None)` when the slope is too flat to report.
    pub fn detect_trend(&self, series: &[f64]) -> Result<Option<Pattern>> {
        ensure_finite(series, "trend detection")?;
        let slope = linear_slope(series)
            .ok_or_else(|| PredictError::insufficient("trend detection", 2, series.len()))?;

        if slope.abs() <= TREND_SLOPE_THRESHOLD {
            return Ok(None);
        }

        let direction = TrendDirection::from_slope(slope);
        Ok(Some(Pattern::new(
            PatternDetail::TemporalTrend {
                direction,
                slope,
                strength: slope.abs(),
            },
            (slope.abs() * 2.0).min(1.0),
            format!("Data shows a {} trend", direction.as_str()),
        )))
    }

    /// Seasonality check. Series shorter than one period are never seasonal.
    pub fn detect_seasonality(&self, series: &[f64]) -> Seasonality {
        if series.len() < SEASONAL_PERIOD || ensure_finite(series, "seasonality").is_err() {
            return Seasonality::not_detected(SEASONAL_PERIOD);
        }

        let strength = seasonal_strength(series, SEASONAL_PERIOD);
        Seasonality {
            detected: strength > SEASONAL_STRENGTH_THRESHOLD,
            period: SEASONAL_PERIOD,
            strength,
            confidence: (strength * 2.0).clamp(0.0, 1.0),
        }
    }

    /// Flag every sample at least two standard deviations from the mean.
    ///
    /// The bound is inclusive: four equal samples plus one spike put the
    /// spike at exactly z = 2.
    pub fn detect_anomalies(&self, series: &[f64]) -> Result<Vec<Anomaly>> {
        ensure_finite(series, "anomaly detection")?;
        let (Some(mu), Some(sigma)) = (mean(series), std_dev(series)) else {
            return Err(PredictError::insufficient("anomaly detection", 1, 0));
        };

        // Constant series have no outliers
        if sigma == 0.0 {
            return Ok(Vec::new());
        }

        Ok(series
            .iter()
            .enumerate()
            .filter_map(|(index, &value)| {
                let z_score = (value - mu).abs() / sigma;
                (z_score >= ANOMALY_Z_THRESHOLD).then(|| Anomaly {
                    index,
                    value,
                    z_score,
                    confidence: (z_score / 3.0).min(1.0),
                })
            })
            .collect())
    }

    /// Frequency of each distinct action; the most frequent wins.
    ///
    /// On a tie the action seen first later in the log wins.
    pub fn analyze_behavior(&self, log: &ActionLog) -> Result<BehaviorProfile> {
        if log.actions.is_empty() {
            return Err(PredictError::insufficient("behavior analysis", 1, 0));
        }

        let mut distribution: Vec<ActionFrequency> = Vec::new();
        for action in &log.actions {
            match distribution.iter_mut().find(|f| &f.action == action) {
                Some(freq) => freq.count += 1,
                None => distribution.push(ActionFrequency {
                    action: action.clone(),
                    count: 1,
                }),
            }
        }

        let mut best = &distribution[0];
        for freq in &distribution[1..] {
            if freq.count >= best.count {
                best = freq;
            }
        }

        let total_actions = log.actions.len();
        Ok(BehaviorProfile {
            most_likely_action: best.action.clone(),
            confidence: best.count as f64 / total_actions as f64,
            distribution: distribution.clone(),
            total_actions,
        })
    }

    /// Slope and mean of a metric series
    pub fn analyze_performance(&self, metrics: &[f64]) -> Result<PerformanceProfile> {
        ensure_finite(metrics, "performance analysis")?;
        let slope = linear_slope(metrics)
            .ok_or_else(|| PredictError::insufficient("performance analysis", 2, metrics.len()))?;
        let average = mean(metrics).unwrap_or_default();

        Ok(PerformanceProfile {
            slope,
            average,
            confidence: (slope.abs() * 2.0).min(1.0),
        })
    }

    /// Run every detector that applies to the input
    pub fn recognize(&self, input: &AnalysisInput) -> PatternAnalysis {
        let mut run = DetectorRun::default();

        if let Some(series) = input.numeric_series() {
            if let Some(pattern) = run.isolate(PatternKind::TemporalTrend, || self.detect_trend(series)) {
                run.extend(pattern);
            }

            let seasonality = self.detect_seasonality(series);
            if seasonality.detected {
                run.push(Pattern::new(
                    PatternDetail::TemporalSeasonality {
                        period: seasonality.period,
                        strength: seasonality.strength,
                    },
                    seasonality.confidence,
                    format!("Data shows seasonal patterns with period {}", seasonality.period),
                ));
            }

            if let Some(anomalies) = run.isolate(PatternKind::Anomaly, || self.detect_anomalies(series)) {
                run.extend(anomalies.into_iter().map(|a| {
                    Pattern::new(
                        PatternDetail::Anomaly {
                            index: a.index,
                            value: a.value,
                            z_score: a.z_score,
                        },
                        a.confidence,
                        format!("Anomaly detected at index {}", a.index),
                    )
                }));
            }
        }

        if let Some(log) = input.action_log() {
            if let Some(profile) = run.isolate(PatternKind::Behavioral, || self.analyze_behavior(log)) {
                run.push(Pattern::new(
                    PatternDetail::Behavioral {
                        most_likely_action: profile.most_likely_action.clone(),
                        user_id: log.user_id.clone(),
                        distribution: profile.distribution,
                    },
                    profile.confidence,
                    format!(
                        "Most frequent action is '{}'",
                        profile.most_likely_action
                    ),
                ));
            }
        }

        if let Some(metrics) = input.metric_series() {
            if let Some(profile) =
                run.isolate(PatternKind::Performance, || self.analyze_performance(metrics))
            {
                let direction = TrendDirection::from_slope(profile.slope);
                run.push(Pattern::new(
                    PatternDetail::Performance {
                        direction,
                        slope: profile.slope,
                        average: profile.average,
                    },
                    profile.confidence,
                    format!(
                        "Performance shows {} trend",
                        match direction {
                            TrendDirection::Increasing => "improving",
                            TrendDirection::Decreasing => "declining",
                        }
                    ),
                ));
            }
        }

        run.finish(self.threshold)
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulator for one aggregate analysis
#[derive(Default)]
struct DetectorRun {
    patterns: Vec<Pattern>,
    counts: AnalysisCounts,
    failures: Vec<DetectorFailure>,
}

impl DetectorRun {
    /// Run one detector, recording instead of propagating its failure
    fn isolate<T>(&mut self, detector: PatternKind, f: impl FnOnce() -> Result<T>) -> Option<T> {
        match f() {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(detector = detector.as_str(), error = %e, "detector skipped");
                self.failures.push(DetectorFailure {
                    detector,
                    message: e.to_string(),
                });
                None
            }
        }
    }

    fn push(&mut self, pattern: Pattern) {
        self.counts.record(pattern.kind());
        self.patterns.push(pattern);
    }

    fn extend(&mut self, patterns: impl IntoIterator<Item = Pattern>) {
        for pattern in patterns {
            self.push(pattern);
        }
    }

    fn finish(self, threshold: f64) -> PatternAnalysis {
        let significant = self
            .patterns
            .iter()
            .filter(|p| p.is_significant(threshold))
            .cloned()
            .collect();

        PatternAnalysis {
            patterns: self.patterns,
            significant,
            counts: self.counts,
            failures: self.failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompositeInput;

    #[test]
    fn test_trend_on_ramp() {
        let analyzer = PatternAnalyzer::new();
        let pattern = analyzer
            .detect_trend(&[1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .expect("ramp should trend");

        assert_eq!(pattern.kind(), PatternKind::TemporalTrend);
        assert_eq!(pattern.direction(), Some(TrendDirection::Increasing));
        assert_eq!(pattern.confidence, 1.0);
    }

    #[test]
    fn test_flat_series_has_no_trend() {
        let analyzer = PatternAnalyzer::new();
        assert!(analyzer.detect_trend(&[3.0, 3.0, 3.0]).unwrap().is_none());
        // slope 0.05 stays below the 0.1 cut-off
        assert!(analyzer.detect_trend(&[1.0, 1.05, 1.1]).unwrap().is_none());
    }

    #[test]
    fn test_decreasing_trend_confidence() {
        let analyzer = PatternAnalyzer::new();
        let pattern = analyzer.detect_trend(&[1.0, 0.8, 0.6, 0.4]).unwrap().unwrap();
        assert_eq!(pattern.direction(), Some(TrendDirection::Decreasing));
        assert!((pattern.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_trend_rejects_single_point() {
        let analyzer = PatternAnalyzer::new();
        let err = analyzer.detect_trend(&[42.0]).unwrap_err();
        assert!(matches!(err, PredictError::InsufficientData { required: 2, actual: 1, .. }));
    }

    #[test]
    fn test_seasonality_requires_full_period() {
        let analyzer = PatternAnalyzer::new();
        for len in 0..SEASONAL_PERIOD {
            let series: Vec<f64> = (0..len).map(|i| if i % 2 == 0 { 1.0 } else { 100.0 }).collect();
            assert!(!analyzer.detect_seasonality(&series).detected);
        }
    }

    #[test]
    fn test_seasonality_detected_on_spiky_cycle() {
        let analyzer = PatternAnalyzer::new();
        let series: Vec<f64> = (0..24).map(|i| if i % 12 == 0 { 100.0 } else { 10.0 }).collect();
        let seasonality = analyzer.detect_seasonality(&series);

        assert!(seasonality.detected);
        assert_eq!(seasonality.period, 12);
        assert!(seasonality.strength > SEASONAL_STRENGTH_THRESHOLD);
        assert!(seasonality.confidence <= 1.0);
    }

    #[test]
    fn test_anomaly_flags_outlier() {
        let analyzer = PatternAnalyzer::new();
        let anomalies = analyzer
            .detect_anomalies(&[10.0, 10.0, 10.0, 10.0, 100.0])
            .unwrap();

        assert_eq!(anomalies.len(), 1);
        let a = anomalies[0];
        assert_eq!(a.index, 4);
        assert_eq!(a.value, 100.0);
        assert!(a.z_score >= ANOMALY_Z_THRESHOLD);
        assert!((a.confidence - (a.z_score / 3.0).min(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_anomaly_constant_and_empty() {
        let analyzer = PatternAnalyzer::new();
        assert!(analyzer.detect_anomalies(&[5.0; 8]).unwrap().is_empty());
        assert!(analyzer.detect_anomalies(&[]).is_err());
    }

    #[test]
    fn test_behavior_most_frequent() {
        let analyzer = PatternAnalyzer::new();
        let log = ActionLog::new(["chat", "voice", "chat", "chat", "settings"]);
        let profile = analyzer.analyze_behavior(&log).unwrap();

        assert_eq!(profile.most_likely_action, "chat");
        assert!((profile.confidence - 0.6).abs() < 1e-12);
        assert_eq!(profile.distribution.len(), 3);
        assert_eq!(profile.total_actions, 5);
    }

    #[test]
    fn test_behavior_tie_prefers_later_action() {
        let analyzer = PatternAnalyzer::new();
        let log = ActionLog::new(["a", "b", "b", "a"]);
        let profile = analyzer.analyze_behavior(&log).unwrap();
        assert_eq!(profile.most_likely_action, "b");
        assert_eq!(profile.confidence, 0.5);
    }

    #[test]
    fn test_performance_profile() {
        let analyzer = PatternAnalyzer::new();
        let profile = analyzer.analyze_performance(&[0.9, 0.7, 0.5]).unwrap();
        assert!((profile.slope + 0.2).abs() < 1e-9);
        assert!((profile.average - 0.7).abs() < 1e-9);
        assert!((profile.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_recognize_numeric_series() {
        let analyzer = PatternAnalyzer::new();
        let input = AnalysisInput::NumericSeries(vec![10.0, 10.0, 10.0, 10.0, 100.0]);
        let analysis = analyzer.recognize(&input);

        assert!(analysis.failures.is_empty());
        assert_eq!(analysis.counts.anomaly, 1);
        assert_eq!(analysis.counts.temporal, 1);
        assert_eq!(analysis.total_patterns(), analysis.counts.total());
        assert!(analysis
            .significant
            .iter()
            .all(|p| p.confidence >= DEFAULT_SIGNIFICANCE_THRESHOLD));
    }

    #[test]
    fn test_recognize_isolates_failing_detector() {
        let analyzer = PatternAnalyzer::new();
        let input = AnalysisInput::Composite(CompositeInput {
            series: Some(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            actions: Some(ActionLog::new(["chat", "chat"])),
            // One sample is too few for the performance detector
            metrics: Some(vec![0.5]),
            ..Default::default()
        });

        let analysis = analyzer.recognize(&input);

        assert_eq!(analysis.failures.len(), 1);
        assert_eq!(analysis.failures[0].detector, PatternKind::Performance);
        assert_eq!(analysis.counts.temporal, 1);
        assert_eq!(analysis.counts.behavioral, 1);
        assert_eq!(analysis.counts.performance, 0);
    }

    #[test]
    fn test_recognize_single_point_records_trend_failure() {
        let analyzer = PatternAnalyzer::new();
        let analysis = analyzer.recognize(&AnalysisInput::NumericSeries(vec![7.0]));

        assert_eq!(analysis.failures.len(), 1);
        assert_eq!(analysis.failures[0].detector, PatternKind::TemporalTrend);
        assert!(analysis.patterns.is_empty());
    }

    #[test]
    fn test_custom_threshold_filters_more() {
        let strict = PatternAnalyzer::with_threshold(0.95);
        let input = AnalysisInput::MetricSeries(vec![0.5, 0.6, 0.7]);
        let analysis = strict.recognize(&input);

        assert_eq!(analysis.counts.performance, 1);
        assert!(analysis.significant.is_empty());
    }
}
