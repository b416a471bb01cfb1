//! Topic-to-market semantic matching
//!
//! Scores how well a social topic lines up with tradable markets by blending
//! embedding similarity with entity overlap, plus a boost when a topic word
//! appears in the market category. Matching never fails: embedding errors
//! zero out the semantic component and the entity overlap still counts.

pub mod embedder;


use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::source::{Market, SocialPost};

pub use embedder::{
    cosine_similarity, Embedder, EntityExtractor, HashEmbedder, KeywordEntityExtractor,
};

/// Default minimum combined score for a match
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.65;

/// Default number of matches kept per topic
pub const DEFAULT_TOP_K: usize = 5;

/// Weight of embedding similarity in the combined score
const SEMANTIC_WEIGHT: f64 = 0.7;

/// Weight of entity overlap in the combined score
const ENTITY_WEIGHT: f64 = 0.3;

/// Multiplier applied when a topic word appears in the market category.
/// Applied after the weighted blend, so boosted scores can exceed 1.0.
const CATEGORY_BOOST: f64 = 1.1;

/// Topic descriptions draw from at most this many posts
const DESCRIPTION_MAX_POSTS: usize = 20;

/// Topic descriptions are truncated to this many characters
const DESCRIPTION_MAX_CHARS: usize = 2000;

/// A market judged relevant to a topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub market: Market,
    /// Combined relevance score; exceeds 1.0 only via the category boost
    pub similarity_score: f64,
}

/// Precomputed matching inputs for a fixed market set, reusable across
/// topics so each market is embedded once
#[derive(Debug, Clone)]
pub struct MarketEmbeddings {
    markets: Vec<Market>,
    embeddings: Vec<Vec<f32>>,
    entities: Vec<HashSet<String>>,
}

impl MarketEmbeddings {
    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

/// Matches social topics to prediction markets
pub struct SemanticMatcher {
    embedder: Arc<dyn Embedder>,
    extractor: Arc<dyn EntityExtractor>,
}

impl SemanticMatcher {
    pub fn new(embedder: Arc<dyn Embedder>, extractor: Arc<dyn EntityExtractor>) -> Self {
        Self {
            embedder,
            extractor,
        }
    }

    /// Match one topic against a market set.
    ///
    /// Markets scoring at least `threshold` are returned best-first, at most
    /// `top_k` of them.
    pub fn match_topic_to_markets(
        &self,
        topic: &str,
        topic_description: &str,
        markets: &[Market],
        threshold: f64,
        top_k: usize,
    ) -> Vec<MatchResult> {
        if markets.is_empty() {
            return Vec::new();
        }
        let encoded = self.batch_encode_markets(markets);
        self.match_with_precomputed(topic, topic_description, &encoded, threshold, top_k)
    }

    /// Embed and extract entities for a market set once.
    ///
    /// Embedding failures are logged and leave the markets with empty
    /// vectors, which score zero semantic similarity later.
    pub fn batch_encode_markets(&self, markets: &[Market]) -> MarketEmbeddings {
        let texts: Vec<String> = markets.iter().map(|m| m.matching_text()).collect();
        let embeddings = match self.embedder.embed_batch(&texts) {
            Ok(vectors) if vectors.len() == texts.len() => vectors,
            Ok(vectors) => {
                warn!(
                    "Embedder returned {} vectors for {} markets, ignoring them",
                    vectors.len(),
                    texts.len()
                );
                vec![Vec::new(); markets.len()]
            }
            Err(e) => {
                warn!("Market embedding failed: {}", e);
                vec![Vec::new(); markets.len()]
            }
        };
        let entities = texts
            .iter()
            .map(|t| self.extractor.extract_entities(t))
            .collect();

        MarketEmbeddings {
            markets: markets.to_vec(),
            embeddings,
            entities,
        }
    }

    /// Match one topic against markets encoded by [`batch_encode_markets`].
    ///
    /// Produces the same scores as [`match_topic_to_markets`] over the same
    /// market set.
    pub fn match_with_precomputed(
        &self,
        topic: &str,
        topic_description: &str,
        encoded: &MarketEmbeddings,
        threshold: f64,
        top_k: usize,
    ) -> Vec<MatchResult> {
        if encoded.is_empty() {
            return Vec::new();
        }

        let topic_text = format!("{} {}", topic, topic_description);
        let topic_embedding = match self.embedder.embed(&topic_text) {
            Ok(vector) => vector,
            Err(e) => {
                warn!("Topic embedding failed for '{}': {}", topic, e);
                Vec::new()
            }
        };
        let topic_entities = self.extractor.extract_entities(&topic_text);
        let topic_words: Vec<String> = topic
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let mut matches: Vec<MatchResult> = Vec::new();
        for ((market, embedding), entities) in encoded
            .markets
            .iter()
            .zip(&encoded.embeddings)
            .zip(&encoded.entities)
        {
            let semantic =
                f64::from(cosine_similarity(&topic_embedding, embedding)).clamp(0.0, 1.0);
            let overlap = entity_overlap(&topic_entities, entities);
            let mut combined = SEMANTIC_WEIGHT * semantic + ENTITY_WEIGHT * overlap;

            if let Some(category) = &market.category {
                let category_lower = category.to_lowercase();
                if topic_words.iter().any(|w| category_lower.contains(w.as_str())) {
                    combined *= CATEGORY_BOOST;
                }
            }

            if combined >= threshold {
                matches.push(MatchResult {
                    market: market.clone(),
                    similarity_score: combined,
                });
            }
        }

        matches.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        matches
    }

    /// Match several topics against one market set, encoding markets once.
    pub fn match_multiple_topics(
        &self,
        topics: &HashMap<String, String>,
        markets: &[Market],
        threshold: f64,
        top_k: usize,
    ) -> HashMap<String, Vec<MatchResult>> {
        let encoded = self.batch_encode_markets(markets);

        let mut results = HashMap::new();
        for (topic, description) in topics {
            let matches =
                self.match_with_precomputed(topic, description, &encoded, threshold, top_k);
            info!("Matched '{}' to {} markets", topic, matches.len());
            results.insert(topic.clone(), matches);
        }
        results
    }
}

impl Default for SemanticMatcher {
    fn default() -> Self {
        Self::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(KeywordEntityExtractor::default()),
        )
    }
}

/// Jaccard overlap of two entity sets; 0.0 when either is empty
fn entity_overlap(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

/// Condense a batch of posts into one description text for matching.
///
/// Uses the display text of the first [`DESCRIPTION_MAX_POSTS`] posts and
/// truncates the result to [`DESCRIPTION_MAX_CHARS`] characters.
pub fn create_topic_description(posts: &[SocialPost]) -> String {
    let combined = posts
        .iter()
        .take(DESCRIPTION_MAX_POSTS)
        .map(|p| p.display_text())
        .collect::<Vec<_>>()
        .join(" ");
    combined.chars().take(DESCRIPTION_MAX_CHARS).collect()
}
