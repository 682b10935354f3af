use crate::errors::{PredictError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine configuration, loadable from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub recommendations: RecommendationConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum confidence for a pattern to count as significant
    pub significance_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Capacity of the pattern history and the historical-data table
    pub max_history_size: usize,
    /// Capacity of the forecast cache
    pub max_cache_entries: usize,
    /// Forecast cache time-to-live
    pub cache_ttl_secs: u64,
}

impl StoreConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_history_size: 10_000,
            max_cache_entries: 10_000,
            cache_ttl_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Number of recommendations returned per call
    pub max_recommendations: usize,
    /// Mean metric value below which an improvement is suggested
    pub performance_floor: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_recommendations: 10,
            performance_floor: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Total attempts including the first
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// ±25% random variation on each delay
    pub jitter: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
            jitter: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        Ok(config)
    }

    /// Load the file at `default_path()`, or defaults when it is absent
    pub fn load_or_default() -> anyhow::Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(contents)
            .map_err(|e| PredictError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".predictbuddy").join("config.toml"))
    }

    /// Reject settings the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        let threshold = self.analysis.significance_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PredictError::Config(format!(
                "significance_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.store.max_history_size == 0 || self.store.max_cache_entries == 0 {
            return Err(PredictError::Config(
                "store capacities must be greater than zero".to_string(),
            ));
        }
        if self.store.cache_ttl_secs == 0 {
            return Err(PredictError::Config(
                "cache_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.recommendations.max_recommendations == 0 {
            return Err(PredictError::Config(
                "max_recommendations must be greater than zero".to_string(),
            ));
        }
        if self.recovery.max_attempts == 0 {
            return Err(PredictError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.analysis.significance_threshold, 0.7);
        assert_eq!(config.store.max_history_size, 10_000);
        assert_eq!(config.store.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.recommendations.max_recommendations, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [store]
            max_history_size = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.store.max_history_size, 50);
        assert_eq!(config.store.cache_ttl_secs, 3600);
        assert_eq!(config.analysis.significance_threshold, 0.7);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
            [analysis]
            significance_threshold = 1.5
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PredictError::Config(_)));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = EngineConfig::default();
        config.store.cache_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = EngineConfig::default();
        config.recommendations.max_recommendations = 5;
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
