//! Stoker main entry point
//!
//! This is the command-line interface for the Stoker cache warmer.

use clap::Parser;
use std::path::PathBuf;
use stoker::config::load_config_with_hash;
use stoker::warmer::warm;
use tracing_subscriber::EnvFilter;

/// Stoker: a sitemap-driven CDN cache warmer
///
/// Stoker discovers each target's URL inventory from its sitemap, fetches
/// every URL to populate upstream caches, purges CDN entries that did not
/// warm into a hit, and reports the run to a remote log sink.
#[derive(Parser, Debug)]
#[command(name = "stoker")]
#[command(version = "1.0.0")]
#[command(about = "A sitemap-driven CDN cache warmer", long_about = None)]
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

    /// Validate config and show what would be warmed without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    handle_warm(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("stoker=info,warn"),
            1 => EnvFilter::new("stoker=debug,info"),
            2 => EnvFilter::new("stoker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the warm plan
fn handle_dry_run(config: &stoker::config::Config, config_hash: &str) {
    println!("=== Stoker Dry Run ===\n");

    println!("Warmer Configuration:");
    println!("  Batch size: {}", config.warmer.batch_size);
    println!("  Inter-batch delay: {}ms", config.warmer.inter_batch_delay_ms);
    println!("  Max retries: {}", config.warmer.max_retries);
    println!("  Retry delay: {}ms", config.warmer.retry_delay_ms);
    println!("  Sitemap timeout: {}s", config.warmer.sitemap_timeout_secs);
    println!("  Fetch timeout: {}s", config.warmer.fetch_timeout_secs);

    println!("\nClassifier Headers:");
    println!("  Origin status: {}", config.headers.origin_status);
    println!("  CDN status: {}", config.headers.cdn_status);
    println!("  CDN trace: {}", config.headers.cdn_trace);
    println!("  Platform id: {}", config.headers.platform_id);

    println!("\nTargets ({}):", config.targets.len());
    for target in &config.targets {
        println!("  - [{}] {}", target.region, target.base_url);
        println!("    User-Agent: {}", target.user_agent());
        match &target.proxy_url {
            Some(proxy) => println!("    Proxy: {}", proxy),
            None => println!("    Proxy: none"),
        }
    }

    println!(
        "\nPurge API: {}",
        if config.purge.is_some() {
            "configured"
        } else {
            "not configured (purging disabled)"
        }
    );
    println!(
        "Log sink: {}",
        if config.log_sink.is_some() {
            "configured"
        } else {
            "not configured (remote logging disabled)"
        }
    );

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
    println!("✓ Would warm {} targets", config.targets.len());
}

/// Handles the main warm operation
async fn handle_warm(config: stoker::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Warming {} targets", config.targets.len());

    match warm(config).await {
        Ok(()) => {
            tracing::info!("Warm run completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Warm run failed to start: {}", e);
            Err(e.into())
        }
    }
}
