//! Sentiment scoring and aggregation
//!
//! Turns raw social posts into engagement-weighted sentiment metrics:
//! - [`normalize`] drops unusable posts and extracts scorable text
//! - [`SentimentScorer`] classifies text batches, degrading to neutral when
//!   the classifier fails
//! - [`SentimentAggregator`] rolls scored posts into [`SentimentMetrics`]
//!
//! Scoring never returns an error. A broken classifier surfaces as neutral
//! results and a warning so one bad batch cannot take down an analysis cycle.

pub mod classifier;
pub mod mindshare;


use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::source::{EngagementSignals, SocialPost};

pub use classifier::{Classification, Classifier, LexiconClassifier};
pub use mindshare::MindshareCalculator;

/// Classifier inputs are truncated to this many characters
pub const MAX_CLASSIFIER_CHARS: usize = 512;

/// Normalized scores above this count as positive mentions
const POSITIVE_THRESHOLD: f64 = 0.3;

/// Normalized scores below this count as negative mentions
const NEGATIVE_THRESHOLD: f64 = -0.3;

/// Sentiment class assigned to a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "POSITIVE"),
            SentimentLabel::Negative => write!(f, "NEGATIVE"),
            SentimentLabel::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Scored sentiment for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Classifier confidence in the label, in [0, 1]
    pub raw_confidence: f64,
    /// Signed score in [-1, 1]: confidence for positive labels, negated
    /// confidence for negative labels, zero for neutral
    pub normalized_score: f64,
}

impl SentimentResult {
    /// Neutral result with zero confidence, used when scoring degrades
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            raw_confidence: 0.0,
            normalized_score: 0.0,
        }
    }

    fn from_classification(c: Classification) -> Self {
        let normalized_score = match c.label {
            SentimentLabel::Positive => c.confidence,
            SentimentLabel::Negative => -c.confidence,
            SentimentLabel::Neutral => 0.0,
        };
        Self {
            label: c.label,
            raw_confidence: c.confidence,
            normalized_score,
        }
    }
}

/// Post reduced to scorable text plus the fields weighting needs
#[derive(Debug, Clone)]
pub struct NormalizedPost {
    pub text: String,
    pub engagement: EngagementSignals,
}

/// Extract display text for each post, dropping posts whose text is empty or
/// whitespace. Order is preserved.
pub fn normalize(posts: &[SocialPost]) -> Vec<NormalizedPost> {
    posts
        .iter()
        .filter_map(|post| {
            let text = post.display_text();
            if text.trim().is_empty() {
                return None;
            }
            Some(NormalizedPost {
                text,
                engagement: post.engagement.clone(),
            })
        })
        .collect()
}

/// Batch scorer over a [`Classifier`]
pub struct SentimentScorer {
    classifier: Arc<dyn Classifier>,
}

impl SentimentScorer {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Score a batch of texts, returning exactly one result per input in
    /// input order.
    ///
    /// Texts are truncated to [`MAX_CLASSIFIER_CHARS`] before classification.
    /// Empty or whitespace texts score neutral. If the classifier errors or
    /// breaks its one-result-per-input contract, every text in the batch
    /// scores neutral with zero confidence.
    pub fn score(&self, texts: &[String]) -> Vec<SentimentResult> {
        if texts.is_empty() {
            return Vec::new();
        }

        let truncated: Vec<String> = texts
            .iter()
            .map(|t| t.chars().take(MAX_CLASSIFIER_CHARS).collect())
            .collect();

        let classified = match self.classifier.classify(&truncated) {
            Ok(results) if results.len() == truncated.len() => results,
            Ok(results) => {
                warn!(
                    "Classifier returned {} results for {} inputs, falling back to neutral",
                    results.len(),
                    truncated.len()
                );
                return vec![SentimentResult::neutral(); texts.len()];
            }
            Err(e) => {
                warn!("Sentiment classification failed, falling back to neutral: {}", e);
                return vec![SentimentResult::neutral(); texts.len()];
            }
        };

        truncated
            .iter()
            .zip(classified)
            .map(|(text, c)| {
                if text.trim().is_empty() {
                    SentimentResult::neutral()
                } else {
                    SentimentResult::from_classification(c)
                }
            })
            .collect()
    }
}

/// Aggregation weight for one post.
///
/// Forum posts weigh upvotes plus twice the comment count. Microblog posts
/// weigh likes plus twice the reposts plus replies, scaled 1.5x for verified
/// authors and up to 3x by follower count. The base weight has a floor of 1
/// so zero-engagement posts still count.
fn engagement_weight(engagement: &EngagementSignals) -> f64 {
    match engagement {
        EngagementSignals::Forum {
            upvotes,
            comment_count,
            ..
        } => (f64::from(*upvotes) + f64::from(*comment_count) * 2.0).max(1.0),
        EngagementSignals::Microblog {
            likes,
            reposts,
            replies,
            author_followers,
            author_verified,
        } => {
            let mut weight =
                (f64::from(*likes) + f64::from(*reposts) * 2.0 + f64::from(*replies)).max(1.0);
            if *author_verified {
                weight *= 1.5;
            }
            weight * (1.0 + (f64::from(*author_followers) / 10_000.0).min(2.0))
        }
    }
}

/// Aggregated sentiment for one topic over one batch of posts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentMetrics {
    /// Engagement-weighted mean of normalized scores, in [-1, 1]
    pub sentiment_score: f64,
    /// Number of input posts, including posts that could not be scored
    pub mention_count: usize,
    /// Sum of raw engagement across all input posts
    pub engagement_score: f64,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
    pub neutral_ratio: f64,
    pub timestamp: DateTime<Utc>,
}

impl SentimentMetrics {
    /// Zeroed bundle for batches with nothing scorable
    pub fn empty(mention_count: usize) -> Self {
        Self {
            sentiment_score: 0.0,
            mention_count,
            engagement_score: 0.0,
            positive_ratio: 0.0,
            negative_ratio: 0.0,
            neutral_ratio: 0.0,
            timestamp: Utc::now(),
        }
    }
}

/// Rolls scored posts into a single metrics bundle
pub struct SentimentAggregator {
    scorer: SentimentScorer,
}

impl SentimentAggregator {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            scorer: SentimentScorer::new(classifier),
        }
    }

    /// Aggregate one batch of posts about a topic.
    ///
    /// The sentiment score is the engagement-weighted mean of per-post
    /// normalized scores. Ratios are per-post counts over the scored posts,
    /// while `mention_count` counts every input post.
    pub fn aggregate(&self, posts: &[SocialPost]) -> SentimentMetrics {
        if posts.is_empty() {
            return SentimentMetrics::empty(0);
        }

        let normalized = normalize(posts);
        let texts: Vec<String> = normalized.iter().map(|p| p.text.clone()).collect();
        let sentiments = self.scorer.score(&texts);
        if sentiments.is_empty() {
            return SentimentMetrics::empty(posts.len());
        }

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        let mut positive = 0usize;
        let mut negative = 0usize;

        for (post, sentiment) in normalized.iter().zip(&sentiments) {
            let weight = engagement_weight(&post.engagement);
            weighted_sum += sentiment.normalized_score * weight;
            total_weight += weight;

            if sentiment.normalized_score > POSITIVE_THRESHOLD {
                positive += 1;
            } else if sentiment.normalized_score < NEGATIVE_THRESHOLD {
                negative += 1;
            }
        }

        let total = sentiments.len();
        let neutral = total - positive - negative;
        let sentiment_score = if total_weight > 0.0 {
            round3(weighted_sum / total_weight)
        } else {
            0.0
        };
        let engagement_score = posts.iter().map(|p| p.engagement.raw_total()).sum();

        SentimentMetrics {
            sentiment_score,
            mention_count: posts.len(),
            engagement_score,
            positive_ratio: round3(positive as f64 / total as f64),
            negative_ratio: round3(negative as f64 / total as f64),
            neutral_ratio: round3(neutral as f64 / total as f64),
            timestamp: Utc::now(),
        }
    }
}

impl Default for SentimentAggregator {
    fn default() -> Self {
        Self::new(Arc::new(LexiconClassifier::new()))
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
