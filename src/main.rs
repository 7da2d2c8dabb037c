//! Docs-Scribe main entry point
//!
//! This is the command-line interface for the Docs-Scribe documentation harvester.

use anyhow::Context;
use clap::Parser;
use docs_scribe::config::{load_config_with_hash, Config};
use docs_scribe::crawler::{collect_urls, crawl, CrawlOptions, HttpRenderer};
use docs_scribe::logging::init_logging;
use docs_scribe::output::print_summary;
use std::path::PathBuf;

/// Docs-Scribe: a documentation site harvester
///
/// Docs-Scribe collects the pages linked from a documentation seed page, renders
/// each one under a shared rate limit, and stores it as Markdown with a JSON
/// metadata sidecar.
#[derive(Parser, Debug)]
#[command(name = "docs-scribe")]
#[command(version)]
#[command(about = "A documentation site harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Collect URLs from the seed page, print them and exit
    #[arg(long, conflicts_with = "url")]
    dry_run: bool,

    /// Process only this URL instead of collecting from the seed page (repeatable)
    #[arg(long, value_name = "URL")]
    url: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let _log_guard = init_logging(cli.verbose, cli.quiet, &config.output.log_dir)
        .with_context(|| format!("Failed to set up logging in {}", config.output.log_dir.display()))?;

    tracing::info!("Configuration loaded from {} (hash: {})", cli.config.display(), config_hash);

    if cli.dry_run {
        handle_dry_run(&config).await
    } else {
        handle_crawl(&config, cli.url, config_hash).await
    }
}

/// Handles the --dry-run mode: shows which URLs a crawl would process
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Docs-Scribe Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Seed URL: {}", config.site.seed());

    println!("\nCrawler:");
    println!("  Max concurrent pages: {}", config.crawler.max_concurrent);
    println!("  Max retries: {}", config.crawler.max_retries);
    println!(
        "  Rate limit: {} tokens, {}/s refill",
        config.rate_limit.max_tokens, config.rate_limit.refill_rate
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.output_dir.display());
    println!("  Logs: {}", config.output.log_dir.display());

    let renderer = HttpRenderer::new(&config.renderer).context("Failed to start the renderer")?;
    let urls = collect_urls(config, &renderer)
        .await
        .context("Failed to collect URLs from the seed page")?;

    println!("\nURLs ({}):", urls.len());
    for url in &urls {
        println!("  - {}", url);
    }

    println!("\n✓ Would process {} pages", urls.len());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, urls: Vec<String>, config_hash: String) -> anyhow::Result<()> {
    let options = CrawlOptions {
        urls: if urls.is_empty() { None } else { Some(urls) },
        config_hash: Some(config_hash),
    };

    match crawl(config, options).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed: {} persisted, {} failed, {} rejected",
                report.persisted.len(),
                report.failed.len(),
                report.rejected_count()
            );
            print_summary(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
