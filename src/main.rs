mod config;
mod db;
mod error;
mod fetch;
mod notify;
mod parser;
mod pipeline;

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use scraper::Html;
use tracing::warn;

use crate::fetch::Fetcher;

#[derive(Parser)]
#[command(name = "olx_watch", about = "OLX listings watcher with Discord notifications")]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one polling cycle over all configured sources
    Run,
    /// Extract listings from a single search URL and print them as JSON
    Probe {
        url: String,
        /// Also fetch each listing's detail page
        #[arg(short, long)]
        details: bool,
        /// Max listings to print
        #[arg(short = 'n', long, default_value = "3")]
        limit: usize,
    },
    /// Show identity store statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = config::Settings::load(&cli.config)?;

    let result = match cli.command {
        Commands::Run => {
            let conn = db::connect(&settings.database.path)?;
            db::init_schema(&conn)?;
            let fetcher = Fetcher::new(Duration::from_secs(settings.scraper.timeout_secs))?;
            let notifier = notify::Notifier::new(settings.discord.webhook_url.clone())?;
            if !notifier.enabled() {
                warn!("Webhook URL not configured, notifications are disabled");
            }
            let stats = pipeline::run_cycle(&settings, &conn, &fetcher, &notifier).await?;
            stats.print();
            Ok(())
        }
        Commands::Probe {
            url,
            details,
            limit,
        } => {
            let fetcher = Fetcher::new(Duration::from_secs(settings.scraper.timeout_secs))?;
            let body = fetcher.get(&url).await?;
            let mut listings = {
                let doc = Html::parse_document(&body);
                parser::search::extract_listings(&doc)
            };
            let total = listings.len();
            listings.truncate(limit);

            if details {
                for listing in listings.iter_mut().filter(|l| l.is_enrichable()) {
                    match fetcher.get(&listing.url).await {
                        Ok(body) => {
                            let data = {
                                let doc = Html::parse_document(&body);
                                parser::detail::extract_detail(&doc)
                            };
                            listing.merge_detail(data);
                        }
                        Err(e) => warn!("Detail fetch failed for {}: {}", listing.id, e),
                    }
                }
            }

            for listing in &listings {
                println!("{}", serde_json::to_string_pretty(listing)?);
            }
            println!("Found {} listings.", total);
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.database.path)?;
            db::init_schema(&conn)?;
            db::get_stats(&conn)?.print();
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}
