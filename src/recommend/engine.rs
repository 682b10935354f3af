//! Recommendation Engine: patterns and heuristics into ranked suggestions
//!
//! Ranking is a stable sort on confidence · relevance, so ties keep
//! generation order (pattern-derived before heuristic).

use crate::analysis::stats::mean;
use crate::analysis::{Pattern, PatternAnalysis, PatternDetail, TrendDirection};
use crate::config::RecommendationConfig;
use crate::recommend::types::{
    RecommendationKind, RecommendationRecord, RecommendationSet, RecommendedAction,
};
use crate::types::AnalysisInput;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashSet;

const IMPROVEMENT_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(config: RecommendationConfig) -> Self {
        Self { config }
    }

    /// Merge, deduplicate, rank and truncate
    pub fn recommend(&self, input: &AnalysisInput, analysis: &PatternAnalysis) -> RecommendationSet {
        let from_patterns: Vec<RecommendationRecord> = analysis
            .significant
            .iter()
            .filter_map(Self::from_pattern)
            .collect();
        let heuristics = self.heuristics(input);

        let mut seen = HashSet::new();
        let mut pattern_derived = 0;
        let mut candidates = Vec::with_capacity(from_patterns.len() + heuristics.len());
        for (record, derived) in from_patterns
            .into_iter()
            .map(|r| (r, true))
            .chain(heuristics.into_iter().map(|r| (r, false)))
        {
            if seen.insert((record.action, record.description.clone())) {
                pattern_derived += usize::from(derived);
                candidates.push(record);
            }
        }

        let total_recommendations = candidates.len();
        rank(&mut candidates);
        candidates.truncate(self.config.max_recommendations);

        RecommendationSet {
            recommendations: candidates,
            total_recommendations,
            based_on_pattern_count: analysis.significant_count(),
            pattern_derived,
            generated_at: Utc::now(),
        }
    }

    /// Template for one significant pattern, if its kind has one
    pub fn from_pattern(pattern: &Pattern) -> Option<RecommendationRecord> {
        match &pattern.detail {
            PatternDetail::TemporalTrend { direction, .. } => {
                let action = match direction {
                    TrendDirection::Increasing => RecommendedAction::InvestigateOpportunity,
                    TrendDirection::Decreasing => RecommendedAction::InvestigateConcern,
                };
                Some(RecommendationRecord::new(
                    RecommendationKind::TrendAction,
                    action,
                    format!("Address {} trend", direction.as_str()),
                    format!(
                        "Data shows a {} trend that may require attention",
                        direction.as_str()
                    ),
                    pattern.confidence,
                ))
            }
            PatternDetail::Anomaly { index, value, .. } => Some(RecommendationRecord::new(
                RecommendationKind::AnomalyInvestigation,
                RecommendedAction::InvestigateAnomaly,
                "Investigate anomaly",
                format!("Unusual value {} detected at index {}", value, index),
                pattern.confidence,
            )),
            PatternDetail::Performance { .. } => Some(RecommendationRecord::new(
                RecommendationKind::PerformanceOptimization,
                RecommendedAction::OptimizePerformance,
                "Optimize performance",
                pattern.description.clone(),
                pattern.confidence,
            )),
            PatternDetail::TemporalSeasonality { .. } | PatternDetail::Behavioral { .. } => None,
        }
    }

    /// Aggregate rules that do not depend on a detected pattern
    fn heuristics(&self, input: &AnalysisInput) -> Vec<RecommendationRecord> {
        let mut records = Vec::new();

        let average = input.metric_series().and_then(mean);
        if let Some(average) = average.filter(|a| *a < self.config.performance_floor) {
            records.push(RecommendationRecord::new(
                RecommendationKind::PerformanceImprovement,
                RecommendedAction::ImprovePerformance,
                "Improve performance",
                format!(
                    "Average performance {:.2} is below {:.2}",
                    average, self.config.performance_floor
                ),
                IMPROVEMENT_CONFIDENCE,
            ));
        }

        records
    }
}

/// Best first; stable for equal scores
pub fn rank(records: &mut [RecommendationRecord]) {
    records.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{PatternAnalyzer, PatternKind};

    fn record(confidence: f64, kind: RecommendationKind, description: &str) -> RecommendationRecord {
        RecommendationRecord::new(
            kind,
            RecommendedAction::InvestigateAnomaly,
            "t",
            description,
            confidence,
        )
    }

    #[test]
    fn test_rank_by_confidence_times_relevance() {
        let mut a = record(0.9, RecommendationKind::TrendAction, "a");
        a.relevance = 0.8;
        let mut b = record(0.95, RecommendationKind::TrendAction, "b");
        b.relevance = 0.5;

        let mut records = vec![b, a];
        rank(&mut records);

        assert_eq!(records[0].description, "a");
        assert!((records[0].score() - 0.72).abs() < 1e-12);
        assert!((records[1].score() - 0.475).abs() < 1e-12);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let mut records = vec![
            record(0.5, RecommendationKind::TrendAction, "first"),
            record(0.5, RecommendationKind::TrendAction, "second"),
        ];
        rank(&mut records);
        assert_eq!(records[0].description, "first");
    }

    #[test]
    fn test_trend_templates() {
        let analyzer = PatternAnalyzer::new();
        let rising = analyzer
            .detect_trend(&[1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .unwrap();
        let falling = analyzer
            .detect_trend(&[5.0, 4.0, 3.0, 2.0, 1.0])
            .unwrap()
            .unwrap();

        let up = RecommendationEngine::from_pattern(&rising).unwrap();
        let down = RecommendationEngine::from_pattern(&falling).unwrap();

        assert_eq!(up.action, RecommendedAction::InvestigateOpportunity);
        assert_eq!(down.action, RecommendedAction::InvestigateConcern);
        assert_eq!(up.relevance, 0.8);
        assert_eq!(up.title, "Address increasing trend");
    }

    #[test]
    fn test_anomaly_recommendation() {
        let mut series = vec![10.0; 9];
        series.push(100.0);
        let input = AnalysisInput::NumericSeries(series);
        let analysis = PatternAnalyzer::new().recognize(&input);
        let set = RecommendationEngine::default().recommend(&input, &analysis);

        let anomaly = set
            .recommendations
            .iter()
            .find(|r| r.action == RecommendedAction::InvestigateAnomaly)
            .unwrap();
        assert_eq!(anomaly.relevance, 0.9);
        assert!(anomaly.description.contains("index 9"));
        assert_eq!(set.based_on_pattern_count, analysis.significant_count());
    }

    #[test]
    fn test_low_metrics_trigger_improvement() {
        let input = AnalysisInput::MetricSeries(vec![0.4, 0.4, 0.4]);
        let analysis = PatternAnalyzer::new().recognize(&input);
        let set = RecommendationEngine::default().recommend(&input, &analysis);

        assert_eq!(set.total_recommendations, 1);
        assert_eq!(set.pattern_derived, 0);
        let only = &set.recommendations[0];
        assert_eq!(only.action, RecommendedAction::ImprovePerformance);
        assert_eq!(only.confidence, 0.8);
        assert_eq!(only.relevance, 0.9);
    }

    #[test]
    fn test_healthy_metrics_have_no_heuristic() {
        let input = AnalysisInput::MetricSeries(vec![0.9, 0.9, 0.9]);
        let analysis = PatternAnalyzer::new().recognize(&input);
        let set = RecommendationEngine::default().recommend(&input, &analysis);
        assert!(set.recommendations.is_empty());
    }

    #[test]
    fn test_top_n_and_dedup() {
        let engine = RecommendationEngine::new(RecommendationConfig {
            max_recommendations: 2,
            performance_floor: 0.7,
        });
        // Four anomalies, all distinct by index
        let mut series = vec![0.0; 40];
        for i in [5, 15, 25, 35] {
            series[i] = 100.0;
        }
        let input = AnalysisInput::NumericSeries(series);
        let mut analysis = PatternAnalyzer::new().recognize(&input);
        let duplicate = analysis
            .significant
            .iter()
            .find(|p| p.kind() == PatternKind::Anomaly)
            .cloned()
            .unwrap();
        analysis.significant.push(duplicate);

        let set = engine.recommend(&input, &analysis);
        assert_eq!(set.recommendations.len(), 2);
        assert_eq!(set.total_recommendations, 4);
        assert_eq!(set.pattern_derived, 4);
    }
}
