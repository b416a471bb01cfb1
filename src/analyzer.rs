//! Topic analysis facade
//!
//! Composes the pipeline end to end: fetch posts from every configured
//! source, aggregate sentiment per platform and overall, match the topic to
//! markets, and predict probability shifts per horizon. Results are cached
//! by topic so repeat requests inside the TTL reuse earlier readings, and
//! the cached reading from a previous run supplies the "previous sentiment"
//! side of the shift calculation.
//!
//! Source failures degrade instead of aborting: a platform that errors
//! contributes no posts and the rest of the analysis proceeds.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{MindshareError, Result};
use crate::matcher::{
    create_topic_description, Embedder, EntityExtractor, HashEmbedder, KeywordEntityExtractor,
    MatchResult, SemanticMatcher,
};
use crate::prediction::{Prediction, PredictionEngine, SentimentSnapshot};
use crate::sentiment::{
    Classifier, LexiconClassifier, MindshareCalculator, SentimentAggregator, SentimentMetrics,
};
use crate::source::{Market, MarketSource, Platform, PostSource, SocialPost};
use crate::storage::CacheManager;

/// Everything the pipeline derives for one topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicAnalysis {
    pub topic: String,
    /// Aggregated sentiment over all platforms
    pub metrics: SentimentMetrics,
    /// Per-platform sentiment, for platforms that returned posts
    pub platform_metrics: HashMap<Platform, SentimentMetrics>,
    /// Share-of-attention score in [0, 1]
    pub mindshare: f64,
    /// Markets judged relevant to the topic, best first
    pub matches: Vec<MatchResult>,
    /// One prediction per matched market per configured horizon
    pub predictions: Vec<Prediction>,
    pub generated_at: DateTime<Utc>,
}

/// Runs the full topic-to-prediction pipeline over configured sources
pub struct TopicAnalyzer {
    config: Config,
    post_sources: Vec<Arc<dyn PostSource>>,
    market_sources: Vec<Arc<dyn MarketSource>>,
    aggregator: SentimentAggregator,
    matcher: SemanticMatcher,
    engine: PredictionEngine,
    cache: CacheManager,
}

impl TopicAnalyzer {
    /// Build an analyzer with the bundled local capabilities
    pub fn new(
        config: Config,
        post_sources: Vec<Arc<dyn PostSource>>,
        market_sources: Vec<Arc<dyn MarketSource>>,
    ) -> Self {
        let classifier: Arc<dyn Classifier> = Arc::new(LexiconClassifier::new());
        let embedder: Arc<dyn Embedder> =
            Arc::new(HashEmbedder::new(config.matcher.embedding_dimension));
        let extractor: Arc<dyn EntityExtractor> = Arc::new(KeywordEntityExtractor::new());
        Self::with_capabilities(config, post_sources, market_sources, classifier, embedder, extractor)
    }

    /// Build an analyzer with injected classifier and matcher capabilities
    pub fn with_capabilities(
        config: Config,
        post_sources: Vec<Arc<dyn PostSource>>,
        market_sources: Vec<Arc<dyn MarketSource>>,
        classifier: Arc<dyn Classifier>,
        embedder: Arc<dyn Embedder>,
        extractor: Arc<dyn EntityExtractor>,
    ) -> Self {
        let cache = CacheManager::with_ttls(
            config.cache.metrics_ttl_secs,
            config.cache.match_ttl_secs,
            config.cache.prediction_ttl_secs,
        );
        Self {
            aggregator: SentimentAggregator::new(classifier),
            matcher: SemanticMatcher::new(embedder, extractor),
            engine: PredictionEngine::with_config(config.prediction.engine_config()),
            cache,
            config,
            post_sources,
            market_sources,
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Analyze one topic end to end.
    ///
    /// Always returns an analysis: source failures and empty results produce
    /// baseline metrics (zero sentiment, no matches) rather than errors.
    pub async fn analyze_topic(&self, topic: &str) -> TopicAnalysis {
        let posts = self.fetch_all_posts(topic).await;
        info!("Fetched {} posts for '{}'", posts.len(), topic);

        // The cached reading from the last run is this run's previous score
        let previous = self.cache.metrics.get(topic);

        let metrics = self.aggregator.aggregate(&posts);
        let platform_metrics = self.aggregate_per_platform(&posts);
        let snapshot = build_snapshot(&metrics, previous.as_ref(), &platform_metrics);
        let mindshare = MindshareCalculator::calculate_mindshare(&metrics, previous.as_ref());

        self.cache.metrics.put(topic.to_string(), metrics.clone());

        let matches = self.match_topic(topic, &posts).await;
        let predictions = self.predict_matches(&snapshot, &matches);

        debug!(
            "Topic '{}': sentiment {:.3} over {} mentions, {} matches, {} predictions",
            topic,
            metrics.sentiment_score,
            metrics.mention_count,
            matches.len(),
            predictions.len()
        );

        TopicAnalysis {
            topic: topic.to_string(),
            metrics,
            platform_metrics,
            mindshare,
            matches,
            predictions,
            generated_at: Utc::now(),
        }
    }

    /// Predict shifts for one specific market, looked up by id across the
    /// configured market sources.
    pub async fn predict_market(&self, topic: &str, market_id: &str) -> Result<Vec<Prediction>> {
        let market = self.lookup_market(market_id).await?;

        let posts = self.fetch_all_posts(topic).await;
        let previous = self.cache.metrics.get(topic);
        let metrics = self.aggregator.aggregate(&posts);
        let platform_metrics = self.aggregate_per_platform(&posts);
        let snapshot = build_snapshot(&metrics, previous.as_ref(), &platform_metrics);
        self.cache.metrics.put(topic.to_string(), metrics);

        Ok(self
            .config
            .prediction
            .horizons
            .iter()
            .map(|&horizon| self.engine.predict_market_shift(&snapshot, &market, horizon))
            .collect())
    }

    /// Fetch active markets from every configured market source
    pub async fn fetch_markets(&self) -> Vec<Market> {
        let limit = self.config.sources.market_limit;
        let fetches = self
            .market_sources
            .iter()
            .map(|source| async move { (source.name().to_string(), source.fetch_markets(limit).await) });

        let mut markets = Vec::new();
        for (name, result) in join_all(fetches).await {
            match result {
                Ok(batch) => markets.extend(batch),
                Err(e) => warn!("Market source {} failed: {}", name, e),
            }
        }
        markets
    }

    async fn fetch_all_posts(&self, topic: &str) -> Vec<SocialPost> {
        let limit = self.config.sources.post_limit;
        let fetches = self
            .post_sources
            .iter()
            .map(|source| async move { (source.name().to_string(), source.fetch_posts(topic, limit).await) });

        let mut posts = Vec::new();
        for (name, result) in join_all(fetches).await {
            match result {
                Ok(batch) => posts.extend(batch),
                Err(e) => warn!("Post source {} failed, continuing without it: {}", name, e),
            }
        }
        posts
    }

    fn aggregate_per_platform(&self, posts: &[SocialPost]) -> HashMap<Platform, SentimentMetrics> {
        let mut by_platform: HashMap<Platform, Vec<SocialPost>> = HashMap::new();
        for post in posts {
            by_platform
                .entry(post.platform)
                .or_default()
                .push(post.clone());
        }

        by_platform
            .into_iter()
            .map(|(platform, posts)| (platform, self.aggregator.aggregate(&posts)))
            .collect()
    }

    async fn match_topic(&self, topic: &str, posts: &[SocialPost]) -> Vec<MatchResult> {
        if let Some(cached) = self.cache.matches.get(topic) {
            debug!("Using cached matches for '{}'", topic);
            return cached;
        }

        let markets = self.fetch_markets().await;
        let description = create_topic_description(posts);
        let matches = self.matcher.match_topic_to_markets(
            topic,
            &description,
            &markets,
            self.config.matcher.threshold,
            self.config.matcher.top_k,
        );
        self.cache.matches.put(topic.to_string(), matches.clone());
        matches
    }

    fn predict_matches(
        &self,
        snapshot: &SentimentSnapshot,
        matches: &[MatchResult],
    ) -> Vec<Prediction> {
        let mut predictions = Vec::new();
        for matched in matches {
            let market_key = matched.market.key();
            for &horizon in &self.config.prediction.horizons {
                let cache_key = (market_key.clone(), horizon);
                if let Some(cached) = self.cache.predictions.get(&cache_key) {
                    predictions.push(cached);
                    continue;
                }
                let prediction =
                    self.engine
                        .predict_market_shift(snapshot, &matched.market, horizon);
                self.cache.predictions.put(cache_key, prediction.clone());
                predictions.push(prediction);
            }
        }
        predictions
    }

    async fn lookup_market(&self, market_id: &str) -> Result<Market> {
        for source in &self.market_sources {
            match source.get_market(market_id).await {
                Ok(market) => return Ok(market),
                Err(MindshareError::MarketNotFound(_)) => continue,
                Err(e) => warn!("Market source {} failed: {}", source.name(), e),
            }
        }
        Err(MindshareError::MarketNotFound(market_id.to_string()))
    }
}

/// Assemble the prediction inputs from the current reading and the cached
/// previous one. Without a previous reading the delta is zero and the volume
/// factor neutral, keeping first-seen topics at a baseline forecast.
fn build_snapshot(
    metrics: &SentimentMetrics,
    previous: Option<&SentimentMetrics>,
    platform_metrics: &HashMap<Platform, SentimentMetrics>,
) -> SentimentSnapshot {
    let previous_score = previous
        .map(|p| p.sentiment_score)
        .unwrap_or(metrics.sentiment_score);
    let historical_avg_volume = previous
        .map(|p| p.mention_count as f64)
        .unwrap_or(metrics.mention_count as f64);

    SentimentSnapshot {
        current_score: metrics.sentiment_score,
        previous_score,
        mention_count: metrics.mention_count,
        historical_avg_volume,
        platform_scores: platform_metrics
            .iter()
            .map(|(platform, m)| (*platform, m.sentiment_score))
            .collect(),
    }
}
