//! NewsForge Extractor CLI
//!
//! Extracts one article, or a batch of the latest articles from a site's
//! listing page.

use anyhow::Context;
use clap::{Parser, Subcommand};
use newsforge_extractor::browser::BrowserConfig;
use newsforge_extractor::config::{BulkConfig, ExtractorConfig, SiteProfile, DEFAULT_OUTPUT_DIR};
use newsforge_extractor::extractor::{BulkExtractor, SingleExtractor};
use newsforge_extractor::fetch::FetchMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// NewsForge article extractor
#[derive(Parser, Debug)]
#[command(name = "nf-extract")]
#[command(version)]
#[command(about = "Extract news articles into structured records")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long, global = true)]
    chrome_path: Option<String>,

    /// Show the browser window
    #[arg(long, global = true)]
    headful: bool,

    /// Directory for saved articles
    #[arg(long, global = true, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a single article
    Single {
        /// Article URL
        url: String,

        /// Render the page in a headless browser
        #[arg(long, conflicts_with = "auto")]
        dynamic: bool,

        /// Pick static or dynamic from the URL's domain
        #[arg(long)]
        auto: bool,

        /// Save the article to the output directory
        #[arg(long)]
        save: bool,
    },

    /// Extract the latest articles from a listing page
    Bulk {
        /// JSON site profile (default: Yahoo Finance)
        #[arg(long)]
        site_profile: Option<PathBuf>,

        /// Listing URL overriding the profile's
        #[arg(long)]
        listing_url: Option<String>,

        /// Maximum number of articles
        #[arg(long, default_value_t = 10)]
        max: usize,

        /// Concurrent article workers (1 = sequential)
        #[arg(long, default_value_t = 1)]
        workers: usize,

        /// Do not save articles
        #[arg(long)]
        no_save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let mut browser = BrowserConfig::builder().headless(!args.headful);
    if let Some(path) = &args.chrome_path {
        browser = browser.chrome_path(path.clone());
    }

    let mut config = ExtractorConfig::builder().browser(browser.build());

    match args.command {
        Command::Single {
            url,
            dynamic,
            auto,
            save,
        } => {
            let mode = if auto {
                FetchMode::suggest_for(&url)
            } else if dynamic {
                FetchMode::Dynamic
            } else {
                FetchMode::Static
            };
            if save {
                config = config.save_to(args.output_dir);
            }

            tracing::info!("Extracting {} ({})", url, mode);
            let extractor = SingleExtractor::new(config.build(), mode == FetchMode::Dynamic)
                .await
                .context("failed to open fetch session")?;
            let result = extractor.extract(&url, mode).await;
            extractor.close().await.context("failed to release fetch session")?;

            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_success() {
                std::process::exit(1);
            }
        }

        Command::Bulk {
            site_profile,
            listing_url,
            max,
            workers,
            no_save,
        } => {
            let profile = match site_profile {
                Some(path) => SiteProfile::from_json_file(&path)
                    .with_context(|| format!("failed to load site profile {}", path.display()))?,
                None => SiteProfile::yahoo_finance(),
            };

            let mut bulk = BulkConfig::builder().max_articles(max).workers(workers);
            if !no_save {
                bulk = bulk.save_to(args.output_dir);
            }

            tracing::info!("Bulk extraction from {} (max {})", profile.name, max);
            let listing_url = listing_url.unwrap_or_else(|| profile.listing_url.clone());
            let extractor = BulkExtractor::new(bulk.build(), profile, config.build())
                .await
                .context("failed to launch browser")?;
            let report = extractor.run(&listing_url, max).await;

            for (i, result) in report.results.iter().enumerate() {
                match result.error() {
                    None => println!("{:>2}. ok    {} ({})", i + 1, result.title(), result.url()),
                    Some(err) => println!("{:>2}. fail  {} ({})", i + 1, result.url(), err),
                }
            }
            for path in &report.saved_files {
                println!("saved {}", path.display());
            }
            println!("{}", report);
        }
    }

    Ok(())
}
