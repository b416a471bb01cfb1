//! Market shift prediction
//!
//! Converts sentiment movement into an expected probability shift per market
//! and time horizon. Each prediction carries its inputs and a human-readable
//! reasoning line, and the engine never panics on bad numbers: non-finite
//! inputs produce a zero-shift, low-confidence default.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MindshareError;
use crate::source::{Market, Platform};

/// Shift magnitude at or above which a confident prediction is strong
const STRONG_SHIFT_MAGNITUDE: f64 = 5.0;

/// Shift magnitude at or above which a confident prediction is moderate
const MODERATE_SHIFT_MAGNITUDE: f64 = 2.0;

/// Prediction timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeHorizon {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    TwentyFourHours,
}

impl TimeHorizon {
    pub const ALL: [TimeHorizon; 3] = [
        TimeHorizon::OneHour,
        TimeHorizon::SixHours,
        TimeHorizon::TwentyFourHours,
    ];

    /// Scale applied to the adjusted shift for this horizon
    pub fn multiplier(&self) -> f64 {
        match self {
            TimeHorizon::OneHour => 0.5,
            TimeHorizon::SixHours => 1.0,
            TimeHorizon::TwentyFourHours => 1.5,
        }
    }
}

impl fmt::Display for TimeHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeHorizon::OneHour => write!(f, "1h"),
            TimeHorizon::SixHours => write!(f, "6h"),
            TimeHorizon::TwentyFourHours => write!(f, "24h"),
        }
    }
}

impl FromStr for TimeHorizon {
    type Err = MindshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(TimeHorizon::OneHour),
            "6h" => Ok(TimeHorizon::SixHours),
            "24h" => Ok(TimeHorizon::TwentyFourHours),
            other => Err(MindshareError::InvalidInput(format!(
                "unknown time horizon: {}",
                other
            ))),
        }
    }
}

/// Confidence bucket derived from the confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "high"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::Low => write!(f, "low"),
        }
    }
}

/// Tradability bucket combining confidence and shift magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Strong,
    Moderate,
    Weak,
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalStrength::Strong => write!(f, "strong"),
            SignalStrength::Moderate => write!(f, "moderate"),
            SignalStrength::Weak => write!(f, "weak"),
        }
    }
}

/// Sentiment inputs for one prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    /// Latest aggregated sentiment score, in [-1, 1]
    pub current_score: f64,
    /// Score from the previous reading
    pub previous_score: f64,
    /// Mention count behind the current score
    pub mention_count: usize,
    /// Average mention count over the comparison window
    pub historical_avg_volume: f64,
    /// Per-platform sentiment scores, used for cross-platform agreement
    pub platform_scores: HashMap<Platform, f64>,
}

impl SentimentSnapshot {
    fn is_finite(&self) -> bool {
        self.current_score.is_finite()
            && self.previous_score.is_finite()
            && self.historical_avg_volume.is_finite()
            && self.platform_scores.values().all(|v| v.is_finite())
    }
}

/// Inputs a prediction was derived from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionMetadata {
    pub sentiment_delta: f64,
    pub volume_factor: f64,
    pub agreement: f64,
    pub current_sentiment: f64,
    pub previous_sentiment: f64,
}

/// Predicted probability shift for one market and horizon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub market_id: String,
    pub market_title: String,
    /// Market probability when the prediction was made
    pub current_probability: f64,
    /// Expected shift in probability points, clamped to the configured range
    pub predicted_shift: f64,
    pub confidence_level: ConfidenceLevel,
    pub confidence_score: f64,
    pub reasoning: String,
    pub time_horizon: TimeHorizon,
    pub metadata: PredictionMetadata,
    pub created_at: DateTime<Utc>,
}

/// Scoring of a past prediction against where the market actually went
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionAccuracy {
    pub predicted_shift: f64,
    /// Observed shift in probability points
    pub actual_shift: f64,
    pub absolute_error: f64,
    /// Absolute error relative to the observed shift magnitude
    pub relative_error: f64,
    pub direction_correct: bool,
    /// 1.0 for a perfect call, 0.0 once the error exceeds the actual move
    pub accuracy_score: f64,
}

/// Tunables for shift prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
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

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            sentiment_multiplier: 10.0,
            volume_cap: 2.0,
            high_confidence_threshold: 0.7,
            min_confidence_threshold: 0.4,
            max_shift: 20.0,
        }
    }
}

/// Converts sentiment snapshots into probability shift predictions
pub struct PredictionEngine {
    config: PredictionConfig,
}

impl PredictionEngine {
    pub fn new() -> Self {
        Self::with_config(PredictionConfig::default())
    }

    pub fn with_config(config: PredictionConfig) -> Self {
        Self { config }
    }

    /// Predict the probability shift for one market over one horizon.
    ///
    /// The shift scales sentiment change by discussion volume, cross-platform
    /// agreement and the horizon, then clamps to the configured range.
    /// Non-finite inputs yield the zero-shift safe default.
    pub fn predict_market_shift(
        &self,
        snapshot: &SentimentSnapshot,
        market: &Market,
        horizon: TimeHorizon,
    ) -> Prediction {
        if !snapshot.is_finite() || !market.current_probability.is_finite() {
            warn!(
                "Non-finite prediction inputs for market {}, returning safe default",
                market.market_id
            );
            return self.fallback_prediction(market, horizon);
        }

        let sentiment_delta = snapshot.current_score - snapshot.previous_score;
        let volume_factor = (snapshot.mention_count as f64
            / snapshot.historical_avg_volume.max(1.0))
        .min(self.config.volume_cap);
        let agreement = cross_platform_agreement(&snapshot.platform_scores);

        let base_shift = sentiment_delta * self.config.sentiment_multiplier;
        let adjusted_shift = base_shift * volume_factor * agreement;
        let final_shift = (adjusted_shift * horizon.multiplier())
            .clamp(-self.config.max_shift, self.config.max_shift);

        let confidence_score = (volume_factor * agreement).min(1.0);
        let reasoning = self.generate_reasoning(
            sentiment_delta,
            volume_factor,
            agreement,
            snapshot.mention_count,
            snapshot.historical_avg_volume,
        );

        Prediction {
            market_id: market.market_id.clone(),
            market_title: market.title.clone(),
            current_probability: market.current_probability,
            predicted_shift: round2(final_shift),
            confidence_level: self.confidence_level(confidence_score),
            confidence_score: round3(confidence_score),
            reasoning,
            time_horizon: horizon,
            metadata: PredictionMetadata {
                sentiment_delta: round3(sentiment_delta),
                volume_factor: round2(volume_factor),
                agreement: round3(agreement),
                current_sentiment: round3(snapshot.current_score),
                previous_sentiment: round3(snapshot.previous_score),
            },
            created_at: Utc::now(),
        }
    }

    /// Predict every matched market over every horizon
    pub fn predict_multiple_markets(
        &self,
        matched: &[(SentimentSnapshot, Market)],
        horizons: &[TimeHorizon],
    ) -> Vec<Prediction> {
        let mut predictions = Vec::with_capacity(matched.len() * horizons.len());
        for (snapshot, market) in matched {
            for horizon in horizons {
                predictions.push(self.predict_market_shift(snapshot, market, *horizon));
            }
        }
        predictions
    }

    /// Score a past prediction against the market's current probability.
    pub fn calculate_prediction_accuracy(
        &self,
        prediction: &Prediction,
        actual_market: &Market,
    ) -> PredictionAccuracy {
        let actual_shift =
            (actual_market.current_probability - prediction.current_probability) * 100.0;
        let absolute_error = (prediction.predicted_shift - actual_shift).abs();
        let relative_error = absolute_error / actual_shift.abs().max(0.01);
        let direction_correct = sign(prediction.predicted_shift) == sign(actual_shift);

        PredictionAccuracy {
            predicted_shift: prediction.predicted_shift,
            actual_shift: round2(actual_shift),
            absolute_error: round2(absolute_error),
            relative_error: round2(relative_error),
            direction_correct,
            accuracy_score: round3((1.0 - relative_error).max(0.0)),
        }
    }

    /// Bucket a prediction by how tradable it looks
    pub fn signal_strength(&self, prediction: &Prediction) -> SignalStrength {
        let magnitude = prediction.predicted_shift.abs();
        if prediction.confidence_score >= self.config.high_confidence_threshold
            && magnitude >= STRONG_SHIFT_MAGNITUDE
        {
            SignalStrength::Strong
        } else if prediction.confidence_score >= self.config.min_confidence_threshold
            && magnitude >= MODERATE_SHIFT_MAGNITUDE
        {
            SignalStrength::Moderate
        } else {
            SignalStrength::Weak
        }
    }

    fn confidence_level(&self, score: f64) -> ConfidenceLevel {
        if score >= self.config.high_confidence_threshold {
            ConfidenceLevel::High
        } else if score >= self.config.min_confidence_threshold {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    fn generate_reasoning(
        &self,
        sentiment_delta: f64,
        volume_factor: f64,
        agreement: f64,
        current_volume: usize,
        avg_volume: f64,
    ) -> String {
        let mut parts: Vec<String> = Vec::new();

        if sentiment_delta.abs() > 0.1 {
            let direction = if sentiment_delta > 0.0 {
                "increased"
            } else {
                "decreased"
            };
            parts.push(format!(
                "Sentiment {} {:.2}",
                direction,
                sentiment_delta.abs()
            ));
        } else {
            parts.push("Sentiment relatively stable".to_string());
        }

        if volume_factor > 1.5 {
            parts.push(format!(
                "with {:.1}x higher volume ({} vs avg {:.0})",
                volume_factor, current_volume, avg_volume
            ));
        } else if volume_factor > 1.0 {
            parts.push(format!("with {:.1}x volume", volume_factor));
        } else {
            parts.push("with below-average volume".to_string());
        }

        if agreement > 0.7 {
            parts.push(format!(
                "and strong cross-platform agreement ({:.0}%)",
                agreement * 100.0
            ));
        } else if agreement > 0.4 {
            parts.push(format!("and moderate agreement ({:.0}%)", agreement * 100.0));
        } else {
            parts.push(format!(
                "but low cross-platform agreement ({:.0}%)",
                agreement * 100.0
            ));
        }

        parts.join(" ")
    }

    fn fallback_prediction(&self, market: &Market, horizon: TimeHorizon) -> Prediction {
        Prediction {
            market_id: market.market_id.clone(),
            market_title: market.title.clone(),
            current_probability: market.current_probability,
            predicted_shift: 0.0,
            confidence_level: ConfidenceLevel::Low,
            confidence_score: 0.0,
            reasoning: "Error in prediction calculation".to_string(),
            time_horizon: horizon,
            metadata: PredictionMetadata::default(),
            created_at: Utc::now(),
        }
    }
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 1 minus the population standard deviation of per-platform scores; 0.5
/// when fewer than two platforms report
fn cross_platform_agreement(platform_scores: &HashMap<Platform, f64>) -> f64 {
    if platform_scores.len() < 2 {
        return 0.5;
    }
    let scores: Vec<f64> = platform_scores.values().copied().collect();
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    1.0 - variance.sqrt()
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
