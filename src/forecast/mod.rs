//! Forecasting system
//! Multi-step forecast models with decaying confidence and a TTL cache

pub mod engine;
pub mod types;

pub use engine::{cache_key, CachedForecast, ForecastEngine, MAX_FORECAST_HORIZON};
pub use types::{ForecastDetails, ForecastKind, ForecastPoint, ForecastResult, ForecastValue};
