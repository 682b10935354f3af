//! Pattern recognition system
//! Statistical detectors for trend, seasonality, anomaly, behavior and performance

pub mod analyzer;
pub mod stats;
pub mod types;

pub use analyzer::PatternAnalyzer;
pub use types::{
    Anomaly, AnalysisCounts, BehaviorProfile, DetectorFailure, Pattern, PatternAnalysis,
    PatternDetail, PatternKind, PerformanceProfile, Seasonality, TrendDirection,
    DEFAULT_SIGNIFICANCE_THRESHOLD,
};
