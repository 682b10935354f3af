//! Engine orchestration module
//!
//! Lifecycle state machine, facade result types and the orchestrator.

pub mod orchestrator;
pub mod state;
pub mod types;

pub use orchestrator::PredictiveEngine;
pub use state::{EngineState, LifecycleEvent};
pub use types::{ForecastOutcome, HealthStatus, RecognitionOutcome};
