//! Tests for source types and mock data generation

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use crate::error::MindshareError;
    use crate::sentiment::{Classifier, LexiconClassifier, SentimentLabel};
    use crate::source::{
        EngagementSignals, Market, MarketSource, MockDataGenerator, MockMarketSource,
        MockPostSource, Platform, PostSource, SentimentDistribution, SocialPost,
    };

    fn classify_all(posts: &[SocialPost]) -> Vec<SentimentLabel> {
        let classifier = LexiconClassifier::new();
        let texts: Vec<String> = posts.iter().map(|p| p.display_text()).collect();
        classifier
            .classify(&texts)
            .unwrap()
            .into_iter()
            .map(|c| c.label)
            .collect()
    }

    fn market_fixture(id: &str) -> Market {
        Market {
            platform: "polymarket".to_string(),
            market_id: id.to_string(),
            title: format!("Test market {}", id),
            description: None,
            category: None,
            current_probability: 0.5,
            volume: dec!(1000),
            close_time: None,
            metadata: None,
        }
    }

    #[test]
    fn test_generator_respects_count() {
        let mut generator = MockDataGenerator::with_seed(1);

        let posts =
            generator.generate_microblog_posts("bitcoin", 25, SentimentDistribution::default());
        assert_eq!(posts.len(), 25);

        let posts = generator.generate_forum_posts("bitcoin", 10, SentimentDistribution::default());
        assert_eq!(posts.len(), 10);
    }

    #[test]
    fn test_seeded_generator_replays_stream() {
        let mut first = MockDataGenerator::with_seed(42);
        let mut second = MockDataGenerator::with_seed(42);

        let a = first.generate_microblog_posts("bitcoin", 20, SentimentDistribution::default());
        let b = second.generate_microblog_posts("bitcoin", 20, SentimentDistribution::default());

        let ids_a: Vec<&str> = a.iter().map(|p| p.id.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);

        let bodies_a: Vec<&str> = a.iter().map(|p| p.body.as_str()).collect();
        let bodies_b: Vec<&str> = b.iter().map(|p| p.body.as_str()).collect();
        assert_eq!(bodies_a, bodies_b);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut first = MockDataGenerator::with_seed(1);
        let mut second = MockDataGenerator::with_seed(2);

        let a = first.generate_microblog_posts("bitcoin", 5, SentimentDistribution::default());
        let b = second.generate_microblog_posts("bitcoin", 5, SentimentDistribution::default());

        assert_ne!(a[0].id, b[0].id);
    }

    #[test]
    fn test_all_positive_distribution_scores_positive() {
        let distribution = SentimentDistribution {
            positive: 1.0,
            negative: 0.0,
            neutral: 0.0,
        };
        let mut generator = MockDataGenerator::with_seed(7);
        let posts = generator.generate_microblog_posts("bitcoin", 20, distribution);

        for label in classify_all(&posts) {
            assert_eq!(label, SentimentLabel::Positive);
        }
    }

    #[test]
    fn test_all_negative_forum_distribution_scores_negative() {
        let distribution = SentimentDistribution {
            positive: 0.0,
            negative: 1.0,
            neutral: 0.0,
        };
        let mut generator = MockDataGenerator::with_seed(7);
        let posts = generator.generate_forum_posts("bitcoin", 15, distribution);

        for label in classify_all(&posts) {
            assert_eq!(label, SentimentLabel::Negative);
        }
    }

    #[test]
    fn test_distribution_quotas_are_exact() {
        let distribution = SentimentDistribution {
            positive: 0.5,
            negative: 0.25,
            neutral: 0.25,
        };
        let mut generator = MockDataGenerator::with_seed(11);
        let posts = generator.generate_microblog_posts("bitcoin", 8, distribution);

        let labels = classify_all(&posts);
        let positive = labels
            .iter()
            .filter(|l| **l == SentimentLabel::Positive)
            .count();
        let negative = labels
            .iter()
            .filter(|l| **l == SentimentLabel::Negative)
            .count();
        let neutral = labels
            .iter()
            .filter(|l| **l == SentimentLabel::Neutral)
            .count();
        assert_eq!(positive, 4);
        assert_eq!(negative, 2);
        assert_eq!(neutral, 2);
    }

    #[test]
    fn test_quota_remainder_falls_to_neutral() {
        // Truncated quotas leave 3 of 10 slots unassigned, which fill as neutral
        let distribution = SentimentDistribution {
            positive: 0.4,
            negative: 0.3,
            neutral: 0.0,
        };
        let mut generator = MockDataGenerator::with_seed(3);
        let posts = generator.generate_microblog_posts("bitcoin", 10, distribution);

        let labels = classify_all(&posts);
        let neutral = labels
            .iter()
            .filter(|l| **l == SentimentLabel::Neutral)
            .count();
        assert_eq!(neutral, 3);
    }

    #[test]
    fn test_microblog_engagement_ranges() {
        let mut generator = MockDataGenerator::with_seed(5);
        let posts =
            generator.generate_microblog_posts("bitcoin", 50, SentimentDistribution::default());

        for post in &posts {
            match post.engagement {
                EngagementSignals::Microblog {
                    likes,
                    reposts,
                    replies,
                    author_followers,
                    ..
                } => {
                    assert!((100..=50_000).contains(&author_followers));
                    assert!(likes <= 1000);
                    assert!(reposts <= 500);
                    assert!(replies <= 300);
                }
                _ => panic!("expected microblog engagement"),
            }
            assert!(post.title.is_none());
            assert_eq!(post.platform, Platform::Microblog);
            assert_eq!(post.engagement.platform(), Platform::Microblog);
        }
    }

    #[test]
    fn test_forum_engagement_ranges() {
        let mut generator = MockDataGenerator::with_seed(5);
        let posts = generator.generate_forum_posts("bitcoin", 50, SentimentDistribution::default());

        for post in &posts {
            match post.engagement {
                EngagementSignals::Forum {
                    upvotes,
                    upvote_ratio,
                    comment_count,
                } => {
                    assert!(upvotes <= 1000);
                    assert!((0.5..0.95).contains(&upvote_ratio));
                    assert!(comment_count <= 200);
                }
                _ => panic!("expected forum engagement"),
            }
            assert!(post.title.is_some());
            assert!(post.created_at <= Utc::now());
        }
    }

    #[test]
    fn test_raw_total_sums_interactions() {
        let forum = EngagementSignals::Forum {
            upvotes: 120,
            upvote_ratio: 0.9,
            comment_count: 30,
        };
        assert!((forum.raw_total() - 120.0).abs() < 0.001);

        let microblog = EngagementSignals::Microblog {
            likes: 10,
            reposts: 5,
            replies: 2,
            author_followers: 500,
            author_verified: false,
        };
        assert!((microblog.raw_total() - 17.0).abs() < 0.001);
    }

    #[test]
    fn test_display_text_uses_title_when_present() {
        let mut post = SocialPost {
            id: "p1".to_string(),
            platform: Platform::Forum,
            title: Some("Rate cut discussion".to_string()),
            body: "What does everyone expect?".to_string(),
            created_at: Utc::now(),
            engagement: EngagementSignals::Forum {
                upvotes: 10,
                upvote_ratio: 0.8,
                comment_count: 4,
            },
            url: "https://social.example/forum/p1".to_string(),
        };

        assert_eq!(
            post.display_text(),
            "Rate cut discussion What does everyone expect?"
        );

        post.title = None;
        assert_eq!(post.display_text(), "What does everyone expect?");

        post.title = Some("   ".to_string());
        assert_eq!(post.display_text(), "What does everyone expect?");
    }

    #[tokio::test]
    async fn test_mock_post_source_caps_at_limit() {
        let source = MockPostSource::microblog().with_seed(7).with_post_count(30);

        let posts = source.fetch_posts("bitcoin", 10).await.unwrap();
        assert_eq!(posts.len(), 10);

        let posts = source.fetch_posts("bitcoin", 100).await.unwrap();
        assert_eq!(posts.len(), 30);
    }

    #[tokio::test]
    async fn test_seeded_source_replays_posts() {
        let source = MockPostSource::forum().with_seed(9).with_post_count(5);

        let first = source.fetch_posts("elections", 5).await.unwrap();
        let second = source.fetch_posts("elections", 5).await.unwrap();

        let ids_first: Vec<&str> = first.iter().map(|p| p.id.as_str()).collect();
        let ids_second: Vec<&str> = second.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids_first, ids_second);
    }

    #[tokio::test]
    async fn test_failing_source_returns_source_error() {
        let source = MockPostSource::microblog().with_failures();

        let result = source.fetch_posts("bitcoin", 10).await;
        assert!(matches!(result, Err(MindshareError::Source(_))));
    }

    #[test]
    fn test_source_metadata() {
        let forum = MockPostSource::forum();
        assert_eq!(forum.name(), "mock-forum");
        assert_eq!(forum.platform(), Platform::Forum);

        let microblog = MockPostSource::microblog();
        assert_eq!(microblog.name(), "mock-microblog");
        assert_eq!(microblog.platform(), Platform::Microblog);
    }

    #[tokio::test]
    async fn test_mock_market_source_fetch() {
        let source = MockMarketSource::new();

        let markets = source.fetch_markets(3).await.unwrap();
        assert_eq!(markets.len(), 3);
    }

    #[tokio::test]
    async fn test_get_market_by_id() {
        let source = MockMarketSource::new();

        let market = source.get_market("btc-150k-2027").await.unwrap();
        assert!(market.title.contains("Bitcoin"));
        assert_eq!(market.key(), "polymarket:btc-150k-2027");
    }

    #[tokio::test]
    async fn test_get_market_not_found() {
        let source = MockMarketSource::new();

        let result = source.get_market("does-not-exist").await;
        assert!(matches!(result, Err(MindshareError::MarketNotFound(_))));
    }

    #[tokio::test]
    async fn test_failing_market_source() {
        let source = MockMarketSource::new().with_failures();

        assert!(source.fetch_markets(5).await.is_err());
        assert!(source.get_market("btc-150k-2027").await.is_err());
    }

    #[tokio::test]
    async fn test_custom_market_list() {
        let markets = vec![market_fixture("m1"), market_fixture("m2")];
        let source = MockMarketSource::with_markets(markets);

        assert_eq!(source.fetch_markets(10).await.unwrap().len(), 2);
    }

    #[test]
    fn test_post_serializes_with_platform_tag() {
        let post = SocialPost {
            id: "p1".to_string(),
            platform: Platform::Forum,
            title: Some("Rate cut discussion".to_string()),
            body: "What does everyone expect?".to_string(),
            created_at: Utc::now(),
            engagement: EngagementSignals::Forum {
                upvotes: 10,
                upvote_ratio: 0.8,
                comment_count: 4,
            },
            url: "https://social.example/forum/p1".to_string(),
        };

        let json = serde_json::to_string(&post).unwrap();
        assert!(json.contains("\"platform\":\"forum\""));
        assert!(json.contains("\"upvotes\":10"));

        let back: SocialPost = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "p1");
        assert_eq!(back.engagement, post.engagement);
    }

    #[test]
    fn test_market_round_trips_through_json() {
        let market = market_fixture("m1");

        let json = serde_json::to_string(&market).unwrap();
        let back: Market = serde_json::from_str(&json).unwrap();

        assert_eq!(back.market_id, "m1");
        assert_eq!(back.volume, dec!(1000));
    }

    #[test]
    fn test_default_distribution_sums_to_one() {
        let d = SentimentDistribution::default();
        assert!((d.positive + d.negative + d.neutral - 1.0).abs() < 0.001);
    }
}
