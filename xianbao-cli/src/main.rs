//! xianbao-rss CLI
//!
//! Crawls the deal-tip forum, filters low-quality posts and writes the
//! survivors as RSS 2.0, Atom 1.0 and JSON feeds.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use xianbao_core::QualityFilter;
use xianbao_crawler::{create_client, fetch_page, HttpConfig, IxbkSource, Source};
use xianbao_feed::{render_atom, render_json, render_rss, save_to_file, FeedConfig};

#[derive(Parser)]
#[command(name = "xianbao-rss")]
#[command(author, version, about = "Quality-filtered deal-tip feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl, filter and write the feed files
    Generate {
        /// Output directory for feed.xml / feed.atom / feed.json
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Minimum quality score a post needs to survive
        #[arg(short, long, env = "QUALITY_THRESHOLD", default_value = "60")]
        threshold: f64,

        /// Maximum number of items per feed
        #[arg(short, long, env = "RSS_MAX_ITEMS", default_value = "100")]
        max_items: usize,

        /// Maximum posts taken from the source's list page
        #[arg(long, env = "MAX_POSTS_PER_SOURCE", default_value = "50")]
        max_posts: usize,

        /// HTTP timeout in seconds
        #[arg(long, env = "REQUEST_TIMEOUT", default_value = "10")]
        timeout: u64,

        /// Skip detail pages and use list-page summaries only
        #[arg(long)]
        skip_detail: bool,
    },

    /// Crawl and score without filtering, print batch statistics
    Stats {
        /// Threshold the pass rate is computed against
        #[arg(short, long, env = "QUALITY_THRESHOLD", default_value = "60")]
        threshold: f64,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether the source site is reachable
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Generate {
            output_dir,
            threshold,
            max_items,
            max_posts,
            timeout,
            skip_detail,
        } => {
            let config = HttpConfig {
                timeout_secs: timeout,
                ..HttpConfig::default()
            };
            let source = IxbkSource::new(config, !skip_detail, max_posts);
            generate(&source, threshold, max_items, &output_dir).await
        }

        Commands::Stats { threshold, json } => stats(threshold, json).await,

        Commands::Status => status().await,
    }
}

async fn generate(
    source: &IxbkSource,
    threshold: f64,
    max_items: usize,
    output_dir: &Path,
) -> Result<()> {
    info!("Crawling {}...", source.name());
    let posts = source.crawl().await.context("crawl failed")?;
    info!("Crawled {} posts", posts.len());

    let filter = QualityFilter::new(threshold);
    let mut survivors = filter.filter_posts(posts);
    if survivors.len() > max_items {
        info!("Truncating output to {max_items} items");
        survivors.truncate(max_items);
    }

    let feed_config = FeedConfig::default();
    let now = Utc::now();

    save_to_file(
        &output_dir.join("feed.xml"),
        &render_rss(&feed_config, &survivors, now),
    )?;
    save_to_file(
        &output_dir.join("feed.atom"),
        &render_atom(&feed_config, &survivors, now),
    )?;
    save_to_file(
        &output_dir.join("feed.json"),
        &render_json(&feed_config, &survivors, now)?,
    )?;

    let stats = filter.filter_stats(&survivors);
    info!(
        "Done: {} items written, avg score {:.1}, range {:.1}-{:.1}",
        stats.total, stats.avg_score, stats.min_score, stats.max_score
    );

    Ok(())
}

async fn stats(threshold: f64, json: bool) -> Result<()> {
    let source = IxbkSource::new(HttpConfig::default(), false, 50);

    info!("Crawling {}...", source.name());
    let posts = source.crawl().await.context("crawl failed")?;

    let filter = QualityFilter::new(threshold);
    let scored = filter.score_posts_at(posts, Utc::now());
    let stats = filter.filter_stats(&scored);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Scored posts:  {}", stats.total);
        println!("Average score: {:.1}", stats.avg_score);
        println!("Score range:   {:.1} - {:.1}", stats.min_score, stats.max_score);
        println!(
            "Pass rate:     {:.1}% ({} passed, {} filtered, threshold {:.0})",
            stats.pass_rate, stats.passed, stats.filtered, threshold
        );
    }

    Ok(())
}

async fn status() -> Result<()> {
    let source = IxbkSource::default();
    let config = HttpConfig::default();
    let client = create_client(&config)?;

    match fetch_page(&client, source.base_url(), &config).await {
        Ok(body) => {
            println!("✓ {} reachable ({} bytes)", source.base_url(), body.len());
            Ok(())
        }
        Err(e) => {
            println!("✗ {} unreachable: {e}", source.base_url());
            std::process::exit(1);
        }
    }
}
