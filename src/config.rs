//! Configuration management

use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::error::{MindshareError, Result};
use crate::prediction::TimeHorizon;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub matcher: MatcherConfig,
    pub prediction: PredictionConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Posts fetched per platform per topic
    pub post_limit: usize,
    /// Markets fetched per matching pass
    pub market_limit: usize,
    /// Posts the mock sources synthesize per fetch
    pub mock_post_count: usize,
    /// Seed for the mock generators; unseeded when absent
    pub mock_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum combined similarity for a topic-market match
    pub threshold: f64,
    /// Matches kept per topic
    pub top_k: usize,
    /// Embedding vector dimension
    pub embedding_dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Horizons every matched market is predicted over
    pub horizons: Vec<TimeHorizon>,
    /// Probability points of shift per unit of sentiment change
    pub sentiment_multiplier: f64,
    /// Cap on the volume factor
    pub volume_cap: f64,
    /// Confidence at or above this is high
    pub high_confidence_threshold: f64,
    /// Confidence at or above this is medium
    pub min_confidence_threshold: f64,
    /// Final shifts are clamped to this magnitude
    pub max_shift: f64,
}

impl PredictionConfig {
    /// The subset the prediction engine consumes
    pub fn engine_config(&self) -> crate::prediction::PredictionConfig {
        crate::prediction::PredictionConfig {
            sentiment_multiplier: self.sentiment_multiplier,
            volume_cap: self.volume_cap,
            high_confidence_threshold: self.high_confidence_threshold,
            min_confidence_threshold: self.min_confidence_threshold,
            max_shift: self.max_shift,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for cached sentiment metrics in seconds
    pub metrics_ttl_secs: i64,
    /// TTL for cached market matches in seconds
    pub match_ttl_secs: i64,
    /// TTL for cached predictions in seconds
    pub prediction_ttl_secs: i64,
    /// Interval for the background cleanup task in seconds
    pub cleanup_interval_secs: u64,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path.as_ref().to_str().unwrap()))
            .add_source(config::Environment::with_prefix("MINDSHARE"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Load from default locations
    pub fn load_default() -> anyhow::Result<Self> {
        // Try loading from current directory or user config
        let paths = ["config.toml", "~/.config/mindshare/config.toml"];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        anyhow::bail!("No configuration file found")
    }

    /// Load from file, falling back to defaults when it is missing or invalid
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Could not load config from {}: {}. Using defaults",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Check value ranges before the pipeline starts
    pub fn validate(&self) -> Result<()> {
        if self.sources.post_limit == 0 {
            return Err(MindshareError::Config(
                "sources.post_limit must be at least 1".to_string(),
            ));
        }
        if self.sources.market_limit == 0 {
            return Err(MindshareError::Config(
                "sources.market_limit must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.matcher.threshold) {
            return Err(MindshareError::Config(
                "matcher.threshold must be in [0, 1]".to_string(),
            ));
        }
        if self.matcher.top_k == 0 {
            return Err(MindshareError::Config(
                "matcher.top_k must be at least 1".to_string(),
            ));
        }
        if self.matcher.embedding_dimension == 0 {
            return Err(MindshareError::Config(
                "matcher.embedding_dimension must be at least 1".to_string(),
            ));
        }
        if self.prediction.horizons.is_empty() {
            return Err(MindshareError::Config(
                "prediction.horizons must not be empty".to_string(),
            ));
        }
        if self.prediction.volume_cap <= 0.0 {
            return Err(MindshareError::Config(
                "prediction.volume_cap must be positive".to_string(),
            ));
        }
        if self.prediction.max_shift <= 0.0 {
            return Err(MindshareError::Config(
                "prediction.max_shift must be positive".to_string(),
            ));
        }
        if self.prediction.min_confidence_threshold > self.prediction.high_confidence_threshold {
            return Err(MindshareError::Config(
                "prediction.min_confidence_threshold must not exceed high_confidence_threshold"
                    .to_string(),
            ));
        }
        if self.cache.metrics_ttl_secs <= 0
            || self.cache.match_ttl_secs <= 0
            || self.cache.prediction_ttl_secs <= 0
        {
            return Err(MindshareError::Config(
                "cache TTLs must be positive".to_string(),
            ));
        }
        if self.cache.cleanup_interval_secs == 0 {
            return Err(MindshareError::Config(
                "cache.cleanup_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            matcher: MatcherConfig::default(),
            prediction: PredictionConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            post_limit: 100,
            market_limit: 50,
            mock_post_count: 50,
            mock_seed: None,
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 0.65,
            top_k: 5,
            embedding_dimension: 256,
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            horizons: TimeHorizon::ALL.to_vec(),
            sentiment_multiplier: 10.0,
            volume_cap: 2.0,
            high_confidence_threshold: 0.7,
            min_confidence_threshold: 0.4,
            max_shift: 20.0,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            metrics_ttl_secs: 300,   // 5 minutes
            match_ttl_secs: 600,     // 10 minutes
            prediction_ttl_secs: 300,
            cleanup_interval_secs: 120,
        }
    }
}
