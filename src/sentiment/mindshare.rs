//! Mindshare scoring
//!
//! Condenses volume, sentiment and engagement into a single [0, 1] share of
//! attention, comparable across topics.

use super::SentimentMetrics;

/// Weight of normalized volume in the mindshare blend
const VOLUME_WEIGHT: f64 = 0.4;

/// Weight of sentiment in the mindshare blend
const SENTIMENT_WEIGHT: f64 = 0.3;

/// Weight of normalized engagement in the mindshare blend
const ENGAGEMENT_WEIGHT: f64 = 0.3;

/// Derived attention metrics over aggregated sentiment
pub struct MindshareCalculator;

impl MindshareCalculator {
    /// Blend volume, sentiment and engagement into a [0, 1] mindshare score.
    ///
    /// Volume and engagement are normalized against the historical average
    /// when one is available, capped at 2x, otherwise against fixed scales of
    /// 100 mentions and 1000 engagement.
    pub fn calculate_mindshare(
        current: &SentimentMetrics,
        historical_avg: Option<&SentimentMetrics>,
    ) -> f64 {
        let mentions = current.mention_count as f64;
        let normalized_volume = match historical_avg {
            Some(hist) if hist.mention_count > 0 => {
                (mentions / hist.mention_count as f64).min(2.0) / 2.0
            }
            _ => (mentions / 100.0).min(1.0),
        };

        // Map sentiment from [-1, 1] into [0, 1]
        let weighted_sentiment = (current.sentiment_score + 1.0) / 2.0;

        let normalized_engagement = match historical_avg {
            Some(hist) if hist.engagement_score > 0.0 => {
                (current.engagement_score / hist.engagement_score).min(2.0) / 2.0
            }
            _ => (current.engagement_score / 1000.0).min(1.0),
        };

        round3(
            VOLUME_WEIGHT * normalized_volume
                + SENTIMENT_WEIGHT * weighted_sentiment
                + ENGAGEMENT_WEIGHT * normalized_engagement,
        )
    }

    /// Rate of sentiment change per hour between two readings.
    ///
    /// Returns 0.0 when the elapsed time is zero or negative.
    pub fn sentiment_velocity(current_score: f64, previous_score: f64, hours_elapsed: f64) -> f64 {
        if hours_elapsed <= 0.0 {
            return 0.0;
        }
        round4((current_score - previous_score) / hours_elapsed)
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
