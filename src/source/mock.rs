//! Synthetic data sources
//!
//! Template-driven generator for social posts with a configurable sentiment
//! mix, plus mock [`PostSource`] and [`MarketSource`] implementations built
//! on it. Seeded generators replay the same stream, so demos and tests are
//! reproducible without network access.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{MindshareError, Result};

use super::{EngagementSignals, Market, MarketSource, Platform, PostSource, SocialPost};

/// Posts per fetch when the caller does not configure a count
const DEFAULT_POST_COUNT: usize = 50;

/// Time range generated timestamps are spread over
const HOURS_BACK: i64 = 24;

const MICROBLOG_POSITIVE_TEMPLATES: &[&str] = &[
    "{topic} is looking great! {filler}",
    "Bullish on {topic}! {filler}",
    "{topic} to the moon! {filler}",
    "Amazing news for {topic}. {filler}",
    "Very optimistic about {topic}. {filler}",
];

const MICROBLOG_NEGATIVE_TEMPLATES: &[&str] = &[
    "{topic} is disappointing. {filler}",
    "Bearish on {topic}. {filler}",
    "Not looking good for {topic}. {filler}",
    "Concerned about {topic}. {filler}",
    "Major issues with {topic}. {filler}",
];

const MICROBLOG_NEUTRAL_TEMPLATES: &[&str] = &[
    "Discussing {topic}: {filler}",
    "Thoughts on {topic}? {filler}",
    "Analysis of {topic}. {filler}",
    "Update on {topic}. {filler}",
    "What do you think about {topic}? {filler}",
];

const FORUM_POSITIVE_TITLES: &[&str] = &[
    "Why {topic} is the best! {filler}",
    "Great news for {topic}! {filler}",
    "Another breakthrough for {topic}. {filler}",
];

const FORUM_NEGATIVE_TITLES: &[&str] = &[
    "Problems with {topic}: {filler}",
    "Disappointed by {topic}. {filler}",
    "Major concerns about {topic}. {filler}",
];

const FORUM_NEUTRAL_TITLES: &[&str] = &[
    "Thoughts on {topic}? {filler}",
    "Discussion: {topic}. {filler}",
    "Analysis of {topic}. {filler}",
];

/// Sentence pool standing in for free-form user text. Kept free of lexicon
/// words so the template prefix alone decides a post's sentiment.
const FILLER_SENTENCES: &[&str] = &[
    "The numbers from this week tell a more nuanced story.",
    "Several analysts shared charts covering the last month.",
    "Activity on the main venues has been steady since Monday.",
    "Here is the summary thread with sources linked.",
    "More details are expected after the next scheduled update.",
    "Comparing this cycle to the last one misses some context.",
    "The updated timeline covers the next two quarters.",
    "Regional coverage picked up the story overnight.",
    "Most of the replies focus on the timeline.",
    "A longer writeup is planned for the weekend.",
    "The data set behind this chart is public.",
    "Everyone keeps citing the same two sources.",
];

/// Sentiment mix for generated posts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl Default for SentimentDistribution {
    fn default() -> Self {
        Self {
            positive: 0.4,
            negative: 0.3,
            neutral: 0.3,
        }
    }
}

impl SentimentDistribution {
    /// Mostly positive mix, for simulating a hyped topic
    pub fn bullish() -> Self {
        Self {
            positive: 0.7,
            negative: 0.1,
            neutral: 0.2,
        }
    }

    /// Mostly negative mix, for simulating a topic under fire
    pub fn bearish() -> Self {
        Self {
            positive: 0.1,
            negative: 0.7,
            neutral: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TemplateKind {
    Positive,
    Negative,
    Neutral,
}

/// Template-driven synthetic post generator.
///
/// Each post gets a template matching its slot in the requested sentiment
/// distribution, filled with neutral sentences, so downstream scoring reads
/// the mix the caller asked for. Seeded generators replay the same stream.
pub struct MockDataGenerator {
    rng: StdRng,
}

impl MockDataGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Generator that replays the same post stream on every run
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate short-form posts with per-author engagement scaled by a
    /// synthetic follower count
    pub fn generate_microblog_posts(
        &mut self,
        topic: &str,
        count: usize,
        distribution: SentimentDistribution,
    ) -> Vec<SocialPost> {
        let labels = self.label_pool(count, distribution);
        let mut posts = Vec::with_capacity(count);

        for kind in labels {
            let template = match kind {
                TemplateKind::Positive => self.pick(MICROBLOG_POSITIVE_TEMPLATES),
                TemplateKind::Negative => self.pick(MICROBLOG_NEGATIVE_TEMPLATES),
                TemplateKind::Neutral => self.pick(MICROBLOG_NEUTRAL_TEMPLATES),
            };
            let body = self.fill_template(template, topic);

            let followers: u32 = self.rng.random_range(100..=50_000);
            // Bigger accounts see proportionally more interactions, capped at 10x
            let multiplier = (f64::from(followers) / 1000.0).min(10.0);
            let likes = (f64::from(self.rng.random_range(0..=100u32)) * multiplier) as u32;
            let reposts = (f64::from(self.rng.random_range(0..=50u32)) * multiplier) as u32;
            let replies = (f64::from(self.rng.random_range(0..=30u32)) * multiplier) as u32;

            let id = self.next_id();
            posts.push(SocialPost {
                url: format!("https://social.example/microblog/{}", id),
                id,
                platform: Platform::Microblog,
                title: None,
                body,
                created_at: self.recent_timestamp(),
                engagement: EngagementSignals::Microblog {
                    likes,
                    reposts,
                    replies,
                    author_followers: followers,
                    author_verified: self.rng.random_bool(0.1), // 10% verified
                },
            });
        }

        info!(
            "Generated {} mock microblog posts for topic: {}",
            posts.len(),
            topic
        );
        posts
    }

    /// Generate titled discussion posts with upvote-style engagement
    pub fn generate_forum_posts(
        &mut self,
        topic: &str,
        count: usize,
        distribution: SentimentDistribution,
    ) -> Vec<SocialPost> {
        let labels = self.label_pool(count, distribution);
        let mut posts = Vec::with_capacity(count);

        for kind in labels {
            let template = match kind {
                TemplateKind::Positive => self.pick(FORUM_POSITIVE_TITLES),
                TemplateKind::Negative => self.pick(FORUM_NEGATIVE_TITLES),
                TemplateKind::Neutral => self.pick(FORUM_NEUTRAL_TITLES),
            };
            let title = self.fill_template(template, topic);
            let body = self.forum_body(topic);

            let id = self.next_id();
            posts.push(SocialPost {
                url: format!("https://social.example/forum/{}", id),
                id,
                platform: Platform::Forum,
                title: Some(title),
                body,
                created_at: self.recent_timestamp(),
                engagement: EngagementSignals::Forum {
                    upvotes: self.rng.random_range(0..=1000),
                    upvote_ratio: self.rng.random_range(0.5..0.95),
                    comment_count: self.rng.random_range(0..=200),
                },
            });
        }

        info!(
            "Generated {} mock forum posts for topic: {}",
            posts.len(),
            topic
        );
        posts
    }

    /// Build the shuffled per-post sentiment assignment. Fractional quotas
    /// truncate and the remainder falls to neutral.
    fn label_pool(&mut self, count: usize, distribution: SentimentDistribution) -> Vec<TemplateKind> {
        let mut labels = Vec::with_capacity(count);
        for (kind, ratio) in [
            (TemplateKind::Positive, distribution.positive),
            (TemplateKind::Negative, distribution.negative),
            (TemplateKind::Neutral, distribution.neutral),
        ] {
            let quota = (count as f64 * ratio) as usize;
            labels.extend(std::iter::repeat(kind).take(quota));
        }
        labels.truncate(count);
        while labels.len() < count {
            labels.push(TemplateKind::Neutral);
        }
        labels.shuffle(&mut self.rng);
        labels
    }

    fn fill_template(&mut self, template: &str, topic: &str) -> String {
        let filler = self.pick(FILLER_SENTENCES);
        template.replace("{topic}", topic).replace("{filler}", filler)
    }

    fn forum_body(&mut self, topic: &str) -> String {
        let sentence_count = self.rng.random_range(2..=4);
        let mut sentences = Vec::with_capacity(sentence_count);
        for _ in 0..sentence_count {
            sentences.push(self.pick(FILLER_SENTENCES));
        }
        let mut body = sentences.join(" ");

        let lowered = topic.to_lowercase();
        if lowered.contains("crypto") || lowered.contains("bitcoin") {
            body.push_str(&format!(
                " Blockchain technology and {} are changing the landscape.",
                topic
            ));
        } else if lowered.contains("election") || lowered.contains("politic") {
            body.push_str(&format!(
                " The political implications of {} are significant.",
                topic
            ));
        }
        body
    }

    fn pick(&mut self, pool: &'static [&'static str]) -> &'static str {
        pool[self.rng.random_range(0..pool.len())]
    }

    fn next_id(&mut self) -> String {
        Uuid::from_u128(self.rng.random()).to_string()
    }

    fn recent_timestamp(&mut self) -> DateTime<Utc> {
        let minutes_back = self.rng.random_range(0..HOURS_BACK * 60);
        Utc::now() - Duration::minutes(minutes_back)
    }
}

impl Default for MockDataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock [`PostSource`] backed by the template generator.
///
/// Each fetch builds a fresh generator, so a seeded source returns the same
/// posts on every call and concurrent fetches never contend on RNG state.
pub struct MockPostSource {
    name: String,
    platform: Platform,
    post_count: usize,
    distribution: SentimentDistribution,
    seed: Option<u64>,
    simulate_failures: bool,
}

impl MockPostSource {
    /// Forum-style source named `mock-forum`
    pub fn forum() -> Self {
        Self {
            name: "mock-forum".to_string(),
            platform: Platform::Forum,
            post_count: DEFAULT_POST_COUNT,
            distribution: SentimentDistribution::default(),
            seed: None,
            simulate_failures: false,
        }
    }

    /// Microblog-style source named `mock-microblog`
    pub fn microblog() -> Self {
        Self {
            name: "mock-microblog".to_string(),
            platform: Platform::Microblog,
            post_count: DEFAULT_POST_COUNT,
            distribution: SentimentDistribution::default(),
            seed: None,
            simulate_failures: false,
        }
    }

    pub fn with_post_count(mut self, count: usize) -> Self {
        self.post_count = count;
        self
    }

    pub fn with_distribution(mut self, distribution: SentimentDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Replay the same posts on every fetch
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Make every fetch fail, for exercising degraded-source handling
    pub fn with_failures(mut self) -> Self {
        self.simulate_failures = true;
        self
    }

    fn generator(&self) -> MockDataGenerator {
        match self.seed {
            Some(seed) => MockDataGenerator::with_seed(seed),
            None => MockDataGenerator::new(),
        }
    }
}

#[async_trait]
impl PostSource for MockPostSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch_posts(&self, topic: &str, limit: usize) -> Result<Vec<SocialPost>> {
        if self.simulate_failures {
            return Err(MindshareError::Source(format!(
                "simulated failure from {}",
                self.name
            )));
        }

        let count = self.post_count.min(limit);
        let mut generator = self.generator();
        let posts = match self.platform {
            Platform::Forum => generator.generate_forum_posts(topic, count, self.distribution),
            Platform::Microblog => {
                generator.generate_microblog_posts(topic, count, self.distribution)
            }
        };
        Ok(posts)
    }
}

/// Mock [`MarketSource`] serving a fixed market list
pub struct MockMarketSource {
    markets: Vec<Market>,
    simulate_failures: bool,
}

impl MockMarketSource {
    pub fn new() -> Self {
        Self {
            markets: default_markets(),
            simulate_failures: false,
        }
    }

    pub fn with_markets(markets: Vec<Market>) -> Self {
        Self {
            markets,
            simulate_failures: false,
        }
    }

    pub fn with_failures(mut self) -> Self {
        self.simulate_failures = true;
        self
    }
}

impl Default for MockMarketSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketSource for MockMarketSource {
    fn name(&self) -> &str {
        "mock-markets"
    }

    async fn fetch_markets(&self, limit: usize) -> Result<Vec<Market>> {
        if self.simulate_failures {
            return Err(MindshareError::Source(
                "simulated failure from mock-markets".to_string(),
            ));
        }
        Ok(self.markets.iter().take(limit).cloned().collect())
    }

    async fn get_market(&self, market_id: &str) -> Result<Market> {
        if self.simulate_failures {
            return Err(MindshareError::Source(
                "simulated failure from mock-markets".to_string(),
            ));
        }
        self.markets
            .iter()
            .find(|m| m.market_id == market_id)
            .cloned()
            .ok_or_else(|| MindshareError::MarketNotFound(market_id.to_string()))
    }
}

fn default_markets() -> Vec<Market> {
    vec![
        Market {
            platform: "polymarket".to_string(),
            market_id: "btc-150k-2027".to_string(),
            title: "Will Bitcoin reach $150,000 by June 2027?".to_string(),
            description: Some(
                "Resolves YES if BTC trades at or above $150,000 on any major exchange before June 30, 2027."
                    .to_string(),
            ),
            category: Some("Crypto".to_string()),
            current_probability: 0.42,
            volume: dec!(2850000),
            close_time: None,
            metadata: None,
        },
        Market {
            platform: "polymarket".to_string(),
            market_id: "eth-10k-2028".to_string(),
            title: "Will Ethereum trade above $10,000 before 2028?".to_string(),
            description: Some(
                "Resolves YES if ETH trades at or above $10,000 on any major exchange before January 1, 2028."
                    .to_string(),
            ),
            category: Some("Crypto".to_string()),
            current_probability: 0.31,
            volume: dec!(1240000),
            close_time: None,
            metadata: None,
        },
        Market {
            platform: "kalshi".to_string(),
            market_id: "fed-cut-dec".to_string(),
            title: "Will the Fed cut rates at the December meeting?".to_string(),
            description: Some(
                "Resolves YES if the FOMC lowers the target range at its December meeting.".to_string(),
            ),
            category: Some("Economics".to_string()),
            current_probability: 0.58,
            volume: dec!(3100000),
            close_time: None,
            metadata: None,
        },
        Market {
            platform: "kalshi".to_string(),
            market_id: "cpi-above-3".to_string(),
            title: "Will annual CPI come in above 3 percent next month?".to_string(),
            description: Some(
                "Resolves YES if the year-over-year CPI print exceeds 3.0 percent.".to_string(),
            ),
            category: Some("Economics".to_string()),
            current_probability: 0.27,
            volume: dec!(980000),
            close_time: None,
            metadata: None,
        },
        Market {
            platform: "polymarket".to_string(),
            market_id: "ai-frontier-2026".to_string(),
            title: "Will a major lab release a new frontier AI model this year?".to_string(),
            description: Some(
                "Resolves YES on an official release announcement from one of the tracked labs."
                    .to_string(),
            ),
            category: Some("Technology".to_string()),
            current_probability: 0.74,
            volume: dec!(620000),
            close_time: None,
            metadata: None,
        },
        Market {
            platform: "polymarket".to_string(),
            market_id: "senate-2026".to_string(),
            title: "Will Republicans hold the Senate after the midterm elections?".to_string(),
            description: Some(
                "Resolves YES if Republicans control at least 50 Senate seats when the next Congress is seated."
                    .to_string(),
            ),
            category: Some("Politics".to_string()),
            current_probability: 0.51,
            volume: dec!(4520000),
            close_time: None,
            metadata: None,
        },
    ]
}
