//! PredictBuddy v0.1.0 - Predictive Pattern Engine
//!
//! In-process statistical engine for companion-chat services: detects
//! trends, seasonality, anomalies and behavioral habits, forecasts several
//! steps ahead with decaying confidence, and ranks follow-up recommendations.
//!
//! # Architecture
//!
//! - **Analysis**: stateless detectors over a tagged input variant
//! - **Forecast**: per-kind models behind a TTL cache
//! - **Recommend**: ranked suggestions from significant patterns
//! - **Memory**: bounded, persisted pattern history, historical data and cache
//! - **Engine**: lifecycle, recovery envelope, metrics

pub mod errors;
pub mod types;
pub mod config;

// Statistical core
pub mod analysis;
pub mod forecast;
pub mod recommend;

// State and collaborators
pub mod memory;
pub mod persistence;
pub mod recovery;
pub mod telemetry;

// Facade
pub mod engine;

// Command-line interface
pub mod cli;

// Re-export commonly used types
pub use errors::{ErrorKind, PredictError, Result};
pub use types::{ActionLog, AnalysisContext, AnalysisInput, CompositeInput};
pub use config::EngineConfig;
pub use engine::{EngineState, ForecastOutcome, HealthStatus, PredictiveEngine, RecognitionOutcome};
pub use forecast::{ForecastKind, ForecastResult};
pub use recommend::RecommendationSet;
