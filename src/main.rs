use clap::Parser;
use yt_points::cli::{Cli, Commands};
use yt_points::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    yt_points::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Simulate(args) => args.execute(&config).await?,
        Commands::Market(args) => args.execute(&config).await?,
        Commands::Markets(args) => args.execute(&config).await?,
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  API: {} (timeout {}s)",
                config.api.base_url, config.api.timeout_secs
            );
            println!(
                "  Fetch: {} pages x {} rows, backoff {}-{}ms",
                config.fetch.max_pages,
                config.fetch.page_size,
                config.fetch.backoff_min_ms,
                config.fetch.backoff_max_ms
            );
            println!(
                "  Cache: enabled={}, ttl={}s",
                config.cache.enabled, config.cache.ttl_secs
            );
            println!(
                "  Points: underlying={}, per day={}, multiplier={}",
                config.points.underlying_amount,
                config.points.points_per_day,
                config.points.multiplier
            );
            println!(
                "  Telemetry: level={}, format={:?}",
                config.telemetry.log_level, config.telemetry.log_format
            );
        }
    }

    Ok(())
}
