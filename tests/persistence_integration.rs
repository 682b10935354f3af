//! Integration tests for persisted engine state
//!
//! Runs the engine against the directory-backed store and restarts it to
//! verify that snapshots survive a reload.

use predictbuddy::config::StoreConfig;
use predictbuddy::memory::{FORECAST_CACHE_KEY, HISTORICAL_DATA_KEY, PATTERNS_KEY};
use predictbuddy::persistence::{JsonFileStore, KeyValueStore};
use predictbuddy::telemetry::TracingMetrics;
use predictbuddy::{AnalysisInput, EngineConfig, ForecastKind, PredictiveEngine};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

async fn engine_at(dir: &Path, config: EngineConfig) -> PredictiveEngine {
    let store = JsonFileStore::new(dir).await.unwrap();
    PredictiveEngine::new(config, Arc::new(store), Arc::new(TracingMetrics)).unwrap()
}

fn ramp() -> AnalysisInput {
    AnalysisInput::NumericSeries(vec![2.0, 4.0, 6.0, 8.0])
}

#[tokio::test]
async fn test_state_survives_restart() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("store");

    let (entry, forecast) = {
        let engine = engine_at(&dir, EngineConfig::default()).await;
        engine.recognize_patterns(&ramp(), json!({"run": 1})).await.unwrap();
        let entry = engine
            .record_historical_data(json!({"note": "first"}), json!(null))
            .await
            .unwrap();
        let forecast = engine
            .generate_forecast(&ramp(), ForecastKind::Trend, 2)
            .await
            .unwrap();
        (entry, forecast)
    };

    let restarted = engine_at(&dir, EngineConfig::default()).await;
    restarted.initialize().await.unwrap();

    let health = restarted.health_status().await;
    assert_eq!(health.pattern_history_size, 1);
    assert_eq!(health.historical_data_size, 1);
    assert_eq!(health.cache_size, 1);

    assert_eq!(restarted.historical_data(&entry.id).await.unwrap(), Some(entry));
    let replay = restarted
        .generate_forecast(&ramp(), ForecastKind::Trend, 2)
        .await
        .unwrap();
    assert!(replay.from_cache);
    assert_eq!(replay.forecast, forecast.forecast);
}

#[tokio::test]
async fn test_snapshots_use_fixed_keys() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("store");
    let engine = engine_at(&dir, EngineConfig::default()).await;

    engine.recognize_patterns(&ramp(), json!({})).await.unwrap();
    engine.record_historical_data(json!(1), json!({})).await.unwrap();
    engine
        .generate_forecast(&ramp(), ForecastKind::Demand, 3)
        .await
        .unwrap();

    let store = JsonFileStore::new(&dir).await.unwrap();
    for key in [PATTERNS_KEY, HISTORICAL_DATA_KEY, FORECAST_CACHE_KEY] {
        let snapshot = store.get(key).await.unwrap();
        assert_eq!(
            snapshot.as_ref().and_then(|v| v.as_array()).map(Vec::len),
            Some(1),
            "{}",
            key
        );
    }
}

#[tokio::test]
async fn test_reload_recaps_to_smaller_capacity() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("store");

    {
        let engine = engine_at(&dir, EngineConfig::default()).await;
        for i in 0..5 {
            engine.recognize_patterns(&ramp(), json!({ "run": i })).await.unwrap();
        }
    }

    let config = EngineConfig {
        store: StoreConfig {
            max_history_size: 2,
            ..StoreConfig::default()
        },
        ..EngineConfig::default()
    };
    let smaller = engine_at(&dir, config).await;

    let history = smaller.pattern_history(10).await.unwrap();
    let runs: Vec<_> = history.iter().map(|r| r.context["run"].clone()).collect();
    assert_eq!(runs, vec![json!(3), json!(4)]);
}

#[tokio::test]
async fn test_empty_directory_starts_clean() {
    let temp = TempDir::new().unwrap();
    let engine = engine_at(&temp.path().join("fresh"), EngineConfig::default()).await;

    engine.initialize().await.unwrap();
    let health = engine.health_status().await;

    assert!(health.initialized);
    assert_eq!(health.pattern_history_size, 0);
    assert_eq!(health.historical_data_size, 0);
    assert_eq!(health.cache_size, 0);
}
