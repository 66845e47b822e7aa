use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use curio_cli::{mask_secret, Command, Config, SearchArgs};
use curio_client::{Aggregator, CollectionSearch};
use curio_core::{FetchOutcome, Settings, SourceSummary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Setup logging (stderr to keep stdout clean for JSON output)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    let settings = config
        .resolve_settings(|key| std::env::var(key).ok())
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match &config.command {
        Command::Search(args) => search(&settings, args).await?,
        Command::Config => show_config(&settings),
    }

    Ok(())
}

/// Search both collections and print the combined items
async fn search(settings: &Settings, args: &SearchArgs) -> anyhow::Result<()> {
    let aggregator =
        Aggregator::from_settings(settings).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let criteria = args.criteria();

    let result = aggregator
        .search(&criteria, None)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    report_source(&result.harvard);
    report_source(&result.met);

    let json = if args.pretty {
        serde_json::to_string_pretty(&result.items)
    } else {
        serde_json::to_string(&result.items)
    }
    .context("Failed to serialize search results")?;
    println!("{}", json);

    Ok(())
}

fn report_source(summary: &SourceSummary) {
    match summary.outcome {
        FetchOutcome::Failed => warn!(
            source = %summary.source,
            error = summary.error.as_deref().unwrap_or("unknown error"),
            "Source contributed no items"
        ),
        FetchOutcome::DeadlineExpired => warn!(
            source = %summary.source,
            count = summary.count,
            "Source stopped early at the deadline"
        ),
        _ => info!(
            source = %summary.source,
            count = summary.count,
            skipped = summary.skipped,
            "Source complete"
        ),
    }
}

/// Print the resolved settings
fn show_config(settings: &Settings) {
    let api_key = settings
        .harvard_api_key
        .as_deref()
        .map(mask_secret)
        .unwrap_or_else(|| "(not set)".to_string());

    println!("\nCurio Settings\n");
    println!("  Harvard API key:       {}", api_key);
    println!("  Harvard endpoint:      {}", settings.endpoints.harvard_object_url);
    println!("  MET search endpoint:   {}", settings.endpoints.met_search_url);
    println!("  MET object endpoint:   {}", settings.endpoints.met_object_url);
    println!("  Max results/source:    {}", settings.fetch.max_results);
    println!("  MET concurrency:       {}", settings.fetch.met_concurrency);
    println!("  MET requests/second:   {}", settings.fetch.met_requests_per_second);
    println!("  HTTP timeout:          {}s", settings.http.timeout.as_secs());
    println!("  HTTP max retries:      {}", settings.http.max_retries);
    println!("  Deadline margin:       {}ms", settings.deadline_margin.as_millis());
    println!();
}
