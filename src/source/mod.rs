//! Social post and market data sources
//!
//! Defines the already-parsed records the pipeline consumes:
//! - `SocialPost`: a single post from a forum-style or microblog-style platform
//! - `Market`: a prediction market snapshot from an external venue
//!
//! Concrete sources implement [`PostSource`] and [`MarketSource`]. The bundled
//! mock implementations live in [`mock`].

pub mod mock;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

pub use mock::{MockDataGenerator, MockMarketSource, MockPostSource, SentimentDistribution};

/// Social platform a post came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Threaded discussion platform with titled posts and upvotes
    Forum,
    /// Short-form feed platform with likes and reposts
    Microblog,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Forum => write!(f, "forum"),
            Platform::Microblog => write!(f, "microblog"),
        }
    }
}

/// Raw engagement counters attached to a post, shaped by platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementSignals {
    Forum {
        upvotes: u32,
        /// Fraction of votes that were upvotes, in [0, 1]
        upvote_ratio: f64,
        comment_count: u32,
    },
    Microblog {
        likes: u32,
        reposts: u32,
        replies: u32,
        author_followers: u32,
        author_verified: bool,
    },
}

impl EngagementSignals {
    /// Platform implied by the counter shape
    pub fn platform(&self) -> Platform {
        match self {
            EngagementSignals::Forum { .. } => Platform::Forum,
            EngagementSignals::Microblog { .. } => Platform::Microblog,
        }
    }

    /// Plain sum of interaction counts, used for volume metrics.
    ///
    /// Forum posts count upvotes only; microblog posts count likes,
    /// reposts and replies without any weighting.
    pub fn raw_total(&self) -> f64 {
        match self {
            EngagementSignals::Forum { upvotes, .. } => f64::from(*upvotes),
            EngagementSignals::Microblog {
                likes,
                reposts,
                replies,
                ..
            } => f64::from(*likes) + f64::from(*reposts) + f64::from(*replies),
        }
    }
}

/// A single social post, already parsed from its platform's API shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPost {
    /// Platform-unique post id
    pub id: String,
    pub platform: Platform,
    /// Present for forum posts, absent for microblog posts
    pub title: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub engagement: EngagementSignals,
    pub url: String,
}

impl SocialPost {
    /// Text used for scoring and topic descriptions: title and body when a
    /// non-empty title exists, body alone otherwise.
    pub fn display_text(&self) -> String {
        match &self.title {
            Some(title) if !title.trim().is_empty() => format!("{} {}", title, self.body),
            _ => self.body.clone(),
        }
    }
}

/// A prediction market snapshot from one of the tracked venues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Venue the market trades on
    pub platform: String,
    /// Venue-unique market id
    pub market_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Current implied probability of the YES outcome, in [0, 1]
    pub current_probability: f64,
    /// Traded volume in USD
    pub volume: Decimal,
    pub close_time: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

impl Market {
    /// Globally unique key; market ids are only unique per venue.
    pub fn key(&self) -> String {
        format!("{}:{}", self.platform, self.market_id)
    }

    /// Title and description joined for embedding
    pub fn matching_text(&self) -> String {
        format!("{} {}", self.title, self.description.as_deref().unwrap_or(""))
    }
}

/// Fetches social posts about a topic from one platform
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &str;

    /// Platform this source feeds from
    fn platform(&self) -> Platform;

    /// Fetch up to `limit` recent posts mentioning `topic`
    async fn fetch_posts(&self, topic: &str, limit: usize) -> Result<Vec<SocialPost>>;
}

/// Fetches prediction market snapshots from a venue
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &str;

    /// Fetch up to `limit` active markets, most liquid first
    async fn fetch_markets(&self, limit: usize) -> Result<Vec<Market>>;

    /// Look up a single market by venue-unique id
    async fn get_market(&self, market_id: &str) -> Result<Market>;
}
