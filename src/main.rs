//! Mindshare demo CLI
//!
//! Runs the analysis pipeline over the bundled mock sources so the scoring,
//! matching, and prediction stages can be exercised without API credentials.

use clap::{Parser, Subcommand};
use mindshare::analyzer::TopicAnalyzer;
use mindshare::config::Config;
use mindshare::source::{
    MarketSource, MockMarketSource, MockPostSource, PostSource, SentimentDistribution,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mindshare")]
#[command(about = "Social sentiment scoring and market shift prediction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Seed for the mock sources, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Sentiment mix of the generated posts
    #[arg(long, value_parser = ["bullish", "bearish", "mixed"], default_value = "mixed")]
    mood: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a topic end to end
    Analyze {
        /// Topic to search posts and markets for
        topic: String,
    },
    /// Show available markets
    Markets {
        /// Number of markets to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Predict shifts for one market
    Predict {
        /// Topic supplying the sentiment
        topic: String,
        /// Market ID to predict
        market_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    let analyzer = build_analyzer(&config, cli.seed, &cli.mood);
    analyzer
        .cache()
        .clone()
        .start_cleanup_task(config.cache.cleanup_interval_secs);

    match cli.command {
        Commands::Analyze { topic } => analyze(&analyzer, &topic).await,
        Commands::Markets { limit } => show_markets(&analyzer, limit).await,
        Commands::Predict { topic, market_id } => predict(&analyzer, &topic, &market_id).await,
    }
}

fn build_analyzer(config: &Config, seed: Option<u64>, mood: &str) -> TopicAnalyzer {
    let distribution = match mood {
        "bullish" => SentimentDistribution::bullish(),
        "bearish" => SentimentDistribution::bearish(),
        _ => SentimentDistribution::default(),
    };
    let seed = seed.or(config.sources.mock_seed);

    let mut forum = MockPostSource::forum()
        .with_post_count(config.sources.mock_post_count)
        .with_distribution(distribution);
    let mut microblog = MockPostSource::microblog()
        .with_post_count(config.sources.mock_post_count)
        .with_distribution(distribution);
    if let Some(seed) = seed {
        forum = forum.with_seed(seed);
        microblog = microblog.with_seed(seed.wrapping_add(1));
    }

    let post_sources: Vec<Arc<dyn PostSource>> = vec![Arc::new(forum), Arc::new(microblog)];
    let market_sources: Vec<Arc<dyn MarketSource>> = vec![Arc::new(MockMarketSource::new())];

    TopicAnalyzer::new(config.clone(), post_sources, market_sources)
}

async fn analyze(analyzer: &TopicAnalyzer, topic: &str) -> anyhow::Result<()> {
    let analysis = analyzer.analyze_topic(topic).await;

    println!("\n📊 Sentiment for '{}':\n", topic);
    println!("  Score:      {:+.3}", analysis.metrics.sentiment_score);
    println!("  Mentions:   {}", analysis.metrics.mention_count);
    println!("  Engagement: {:.0}", analysis.metrics.engagement_score);
    println!(
        "  Mix:        {:.0}% positive / {:.0}% negative / {:.0}% neutral",
        analysis.metrics.positive_ratio * 100.0,
        analysis.metrics.negative_ratio * 100.0,
        analysis.metrics.neutral_ratio * 100.0
    );
    println!("  Mindshare:  {:.3}", analysis.mindshare);

    for (platform, metrics) in &analysis.platform_metrics {
        println!(
            "  {:<10}  {:+.3} over {} mentions",
            format!("{}:", platform),
            metrics.sentiment_score,
            metrics.mention_count
        );
    }

    if analysis.matches.is_empty() {
        println!("\nNo markets matched '{}'", topic);
        return Ok(());
    }

    println!("\n🎯 Matched markets:\n");
    for matched in &analysis.matches {
        println!(
            "  {:.3}  [{}] {}",
            matched.similarity_score, matched.market.platform, matched.market.title
        );
    }

    println!("\n🔮 Predictions:\n");
    println!(
        "{:<44} {:>7} {:>9} {:>11}",
        "Market", "Horizon", "Shift", "Confidence"
    );
    println!("{}", "-".repeat(75));
    for prediction in &analysis.predictions {
        let title = truncate(&prediction.market_title, 42);
        println!(
            "{:<44} {:>7} {:>+8.2}pp {:>11}",
            title,
            prediction.time_horizon.to_string(),
            prediction.predicted_shift,
            prediction.confidence_level.to_string()
        );
    }

    Ok(())
}

async fn show_markets(analyzer: &TopicAnalyzer, limit: usize) -> anyhow::Result<()> {
    let markets = analyzer.fetch_markets().await;

    println!("\n📈 Markets:\n");
    println!(
        "{:<24} {:<44} {:>6} {:>12}",
        "ID", "Title", "Prob", "Volume"
    );
    println!("{}", "-".repeat(90));
    for market in markets.iter().take(limit) {
        println!(
            "{:<24} {:<44} {:>5.0}% {:>12}",
            market.market_id,
            truncate(&market.title, 42),
            market.current_probability * 100.0,
            market.volume
        );
    }

    Ok(())
}

async fn predict(analyzer: &TopicAnalyzer, topic: &str, market_id: &str) -> anyhow::Result<()> {
    let predictions = analyzer.predict_market(topic, market_id).await?;

    println!("\n🔮 Predictions for {} from '{}':\n", market_id, topic);
    for prediction in &predictions {
        println!(
            "  {:>3}: {:+.2}pp ({} confidence, {:.3})",
            prediction.time_horizon,
            prediction.predicted_shift,
            prediction.confidence_level,
            prediction.confidence_score
        );
        println!("       {}", prediction.reasoning);
    }

    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars - 3).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
