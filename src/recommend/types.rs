//! Recommendation type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recommendation categories; each carries a fixed relevance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    TrendAction,
    AnomalyInvestigation,
    PerformanceOptimization,
    PerformanceImprovement,
}

impl RecommendationKind {
    pub fn relevance(&self) -> f64 {
        match self {
            RecommendationKind::TrendAction => 0.8,
            RecommendationKind::AnomalyInvestigation => 0.9,
            RecommendationKind::PerformanceOptimization => 0.7,
            RecommendationKind::PerformanceImprovement => 0.9,
        }
    }
}

/// Suggested follow-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    InvestigateOpportunity,
    InvestigateConcern,
    InvestigateAnomaly,
    OptimizePerformance,
    ImprovePerformance,
}

/// One ranked suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub relevance: f64,
    pub action: RecommendedAction,
}

impl RecommendationRecord {
    /// Relevance comes from the kind
    pub fn new(
        kind: RecommendationKind,
        action: RecommendedAction,
        title: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            confidence: confidence.clamp(0.0, 1.0),
            relevance: kind.relevance(),
            action,
        }
    }

    /// Ranking key: confidence · relevance
    pub fn score(&self) -> f64 {
        self.confidence * self.relevance
    }
}

/// Output of one recommendation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    /// Top-ranked records, best first
    pub recommendations: Vec<RecommendationRecord>,
    /// Candidates before truncation, after deduplication
    pub total_recommendations: usize,
    /// Significant patterns the candidates were derived from
    pub based_on_pattern_count: usize,
    /// Candidates that came from patterns rather than heuristics
    pub pattern_derived: usize,
    pub generated_at: DateTime<Utc>,
}
