//! Recommendation system
//! Ranked, deduplicated suggestions derived from significant patterns

pub mod engine;
pub mod types;

pub use engine::{rank, RecommendationEngine};
pub use types::{RecommendationKind, RecommendationRecord, RecommendationSet, RecommendedAction};
