//! Predictive engine orchestrator - public facade
//!
//! Coordinates:
//! - Lazy, one-time initialization of the collaborators
//! - The error-recovery envelope around every operation
//! - Timing and metric emission
//! - All-or-nothing write-through of memory store mutations
//!
//! The memory store sits behind a single async mutex, so mutations are
//! serialized even when several calls are in flight.

use crate::analysis::{PatternAnalyzer, PatternKind};
use crate::config::EngineConfig;
use crate::engine::state::{EngineState, LifecycleEvent};
use crate::engine::types::{ForecastOutcome, HealthStatus, RecognitionOutcome};
use crate::errors::{ErrorKind, PredictError, Result};
use crate::forecast::{ForecastEngine, ForecastKind};
use crate::memory::{HistoricalDataEntry, MemoryStore, PatternRecord};
use crate::persistence::KeyValueStore;
use crate::recommend::{RecommendationEngine, RecommendationSet};
use crate::recovery::{ErrorRecovery, RetryRecovery};
use crate::telemetry::{metric_fields, MetricFields, MetricsSink};
use crate::types::{AnalysisContext, AnalysisInput};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

const PATTERN_RECOGNITION: &str = "pattern_recognition";
const FORECASTING: &str = "forecasting";
const RECOMMENDATIONS: &str = "recommendations";
const MEMORY_STORE: &str = "memory_store";

/// Pattern recognition, forecasting and recommendations behind one facade
pub struct PredictiveEngine<R = RetryRecovery> {
    config: EngineConfig,
    analyzer: PatternAnalyzer,
    forecaster: ForecastEngine,
    recommender: RecommendationEngine,
    store: Mutex<MemoryStore>,
    metrics: Arc<dyn MetricsSink>,
    recovery: R,
    state: Mutex<EngineState>,
    /// Metrics-sink failures seen so far
    collaborator_errors: AtomicUsize,
}

impl PredictiveEngine<RetryRecovery> {
    /// Engine with the retry-with-backoff recovery policy from `config`
    pub fn new(
        config: EngineConfig,
        persistence: Arc<dyn KeyValueStore>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Self> {
        let recovery = RetryRecovery::new(config.recovery.clone());
        Self::with_recovery(config, persistence, metrics, recovery)
    }
}

impl<R: ErrorRecovery> PredictiveEngine<R> {
    /// Engine with a caller-supplied recovery policy
    pub fn with_recovery(
        config: EngineConfig,
        persistence: Arc<dyn KeyValueStore>,
        metrics: Arc<dyn MetricsSink>,
        recovery: R,
    ) -> Result<Self> {
        config.validate()?;

        let analyzer = PatternAnalyzer::with_threshold(config.analysis.significance_threshold);
        Ok(Self {
            forecaster: ForecastEngine::new(analyzer.clone()),
            recommender: RecommendationEngine::new(config.recommendations.clone()),
            store: Mutex::new(MemoryStore::new(persistence, config.store.clone())),
            analyzer,
            metrics,
            recovery,
            state: Mutex::new(EngineState::Uninitialized),
            collaborator_errors: AtomicUsize::new(0),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn recovery(&self) -> &R {
        &self.recovery
    }

    /// Set up collaborators and load persisted state.
    ///
    /// Idempotent: once ready, later calls return immediately. Concurrent
    /// callers wait on the lifecycle lock, so setup runs once. A failed
    /// setup returns the engine to `Uninitialized` so a later call retries.
    pub async fn initialize(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.is_ready() {
            return Ok(());
        }

        *state = state.transition(LifecycleEvent::Begin)?;
        debug!("initializing predictive engine");

        match self.setup().await {
            Ok(()) => {
                *state = state.transition(LifecycleEvent::Complete)?;
                let sizes = self.store.lock().await.sizes();
                info!(
                    patterns = sizes.pattern_history,
                    historical = sizes.historical_data,
                    cached = sizes.cache,
                    "predictive engine ready"
                );
                Ok(())
            }
            Err(err) => {
                *state = state.transition(LifecycleEvent::Fail)?;
                error!(error = %err, "predictive engine initialization failed");
                Err(err)
            }
        }
    }

    async fn setup(&self) -> Result<()> {
        self.recovery.initialize().await?;

        let store = &self.store;
        self.recovery
            .execute(MEMORY_STORE, move || async move { store.lock().await.load().await })
            .await
    }

    /// Run every applicable detector and record significant patterns.
    ///
    /// Detector failures are reported in the outcome, never raised.
    pub async fn recognize_patterns(
        &self,
        input: &AnalysisInput,
        context: AnalysisContext,
    ) -> Result<RecognitionOutcome> {
        self.initialize().await?;
        let started = Instant::now();

        let analyzer = &self.analyzer;
        let analysis = match self
            .recovery
            .execute(PATTERN_RECOGNITION, move || async move {
                Ok::<_, PredictError>(analyzer.recognize(input))
            })
            .await
        {
            Ok(analysis) => analysis,
            Err(err) => return Err(self.fail(PATTERN_RECOGNITION, started, input, err)),
        };

        if !analysis.significant.is_empty() {
            let record = PatternRecord::new(analysis.significant.clone(), context);
            if let Err(err) = self.append_pattern(record).await {
                return Err(self.fail(PATTERN_RECOGNITION, started, input, err));
            }
        }

        self.emit(
            PATTERN_RECOGNITION,
            metric_fields(json!({
                "duration_ms": elapsed_ms(started),
                "success": true,
                "data_size": input.size(),
                "input_type": input.variant_name(),
                "patterns_found": analysis.total_patterns(),
                "significant_patterns": analysis.significant_count(),
                "failed_detectors": analysis.failures.len(),
            })),
        );

        Ok(RecognitionOutcome {
            total_patterns: analysis.total_patterns(),
            significant_patterns: analysis.significant_count(),
            analysis_counts: analysis.counts,
            failures: analysis.failures,
            patterns: analysis.significant,
            all_patterns: analysis.patterns,
        })
    }

    /// Forecast `horizon` steps ahead, reading through the forecast cache
    pub async fn generate_forecast(
        &self,
        input: &AnalysisInput,
        kind: ForecastKind,
        horizon: usize,
    ) -> Result<ForecastOutcome> {
        self.initialize().await?;
        let started = Instant::now();

        let (forecaster, store) = (&self.forecaster, &self.store);
        let cached = match self
            .recovery
            .execute(FORECASTING, move || async move {
                let mut guard = store.lock().await;
                forecaster.generate(&mut guard, input, kind, horizon).await
            })
            .await
        {
            Ok(cached) => cached,
            Err(err) => return Err(self.fail(FORECASTING, started, input, err)),
        };

        let outcome = ForecastOutcome::from(cached);
        self.emit(
            FORECASTING,
            metric_fields(json!({
                "duration_ms": elapsed_ms(started),
                "success": true,
                "data_size": input.size(),
                "forecast_type": kind.as_str(),
                "horizon": horizon,
                "confidence": outcome.confidence,
                "from_cache": outcome.from_cache,
            })),
        );

        Ok(outcome)
    }

    /// Ranked recommendations for the input. Does not touch pattern history.
    pub async fn generate_recommendations(
        &self,
        input: &AnalysisInput,
        context: AnalysisContext,
    ) -> Result<RecommendationSet> {
        self.initialize().await?;
        let started = Instant::now();

        let (analyzer, recommender) = (&self.analyzer, &self.recommender);
        let set = match self
            .recovery
            .execute(RECOMMENDATIONS, move || async move {
                let analysis = analyzer.recognize(input);
                Ok::<_, PredictError>(recommender.recommend(input, &analysis))
            })
            .await
        {
            Ok(set) => set,
            Err(err) => return Err(self.fail(RECOMMENDATIONS, started, input, err)),
        };

        debug!(
            context = %context,
            recommendations = set.recommendations.len(),
            "recommendations generated"
        );
        self.emit(
            "recommendations_generated",
            metric_fields(json!({
                "duration_ms": elapsed_ms(started),
                "success": true,
                "data_size": input.size(),
                "recommendation_count": set.recommendations.len(),
                "total_recommendations": set.total_recommendations,
                "based_on_patterns": set.based_on_pattern_count,
            })),
        );

        Ok(set)
    }

    /// Store a payload in the historical-data table
    pub async fn record_historical_data(
        &self,
        payload: Value,
        context: AnalysisContext,
    ) -> Result<HistoricalDataEntry> {
        self.initialize().await?;

        let entry = HistoricalDataEntry::new(payload, context);
        let (store, staged) = (&self.store, &entry);
        self.recovery
            .execute(MEMORY_STORE, move || async move {
                store.lock().await.put_historical_data(staged.clone()).await
            })
            .await?;

        debug!(id = %entry.id, "historical data recorded");
        Ok(entry)
    }

    pub async fn historical_data(&self, id: &str) -> Result<Option<HistoricalDataEntry>> {
        self.initialize().await?;
        Ok(self.store.lock().await.get_historical_data(id).cloned())
    }

    /// Newest `limit` pattern records, oldest first
    pub async fn pattern_history(&self, limit: usize) -> Result<Vec<PatternRecord>> {
        self.initialize().await?;
        Ok(self.store.lock().await.recent_patterns(limit))
    }

    /// Sizes, lifecycle state and capabilities. Does not initialize.
    ///
    /// Expired forecasts are purged first so `cache_size` counts live entries.
    pub async fn health_status(&self) -> HealthStatus {
        let state = *self.state.lock().await;
        let sizes = {
            let mut store = self.store.lock().await;
            store.purge_expired(Utc::now());
            store.sizes()
        };

        HealthStatus {
            initialized: state.is_ready(),
            state,
            pattern_history_size: sizes.pattern_history,
            historical_data_size: sizes.historical_data,
            cache_size: sizes.cache,
            available_models: ForecastKind::all()
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
            available_analyses: PatternKind::all()
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
            collaborator_errors: self.collaborator_errors.load(Ordering::SeqCst),
        }
    }

    /// Each attempt is all-or-nothing in the store, so retrying cannot
    /// duplicate the record
    async fn append_pattern(&self, record: PatternRecord) -> Result<()> {
        let (store, record) = (&self.store, &record);
        self.recovery
            .execute(MEMORY_STORE, move || async move {
                store.lock().await.append_pattern(record.clone()).await
            })
            .await
    }

    /// Record a failed operation and hand the error back for propagation
    fn fail(
        &self,
        operation: &str,
        started: Instant,
        input: &AnalysisInput,
        err: PredictError,
    ) -> PredictError {
        let duration_ms = elapsed_ms(started);
        let kind = err.kind();

        if kind == ErrorKind::Unknown {
            error!(
                operation,
                duration_ms,
                input_size = input.size(),
                error = %err,
                "operation failed"
            );
        } else {
            debug!(operation, error_kind = kind.as_str(), error = %err, "operation rejected");
        }

        self.emit(
            &format!("{}_error", operation),
            metric_fields(json!({
                "duration_ms": duration_ms,
                "success": false,
                "error": err.to_string(),
                "error_kind": kind.as_str(),
            })),
        );
        err
    }

    /// Sink failures are counted and logged, never raised
    fn emit(&self, event: &str, fields: MetricFields) {
        if let Err(err) = self.metrics.log(event, fields) {
            self.collaborator_errors.fetch_add(1, Ordering::SeqCst);
            warn!(event, error = %err, "metrics sink rejected event");
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
