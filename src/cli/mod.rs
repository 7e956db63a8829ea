//! CLI interface for yt-points
//!
//! Provides subcommands for:
//! - `simulate`: Simulate a YT given market and YT addresses
//! - `market`: Simulate a market picked from the active listing
//! - `markets`: List active markets on a chain
//! - `config`: Show effective configuration

mod market;
mod markets;
pub mod report;
mod simulate;

pub use market::MarketArgs;
pub use markets::MarketsArgs;
pub use simulate::SimulateArgs;

use crate::config::Config;
use crate::market::{PendleClient, TtlCache};
use crate::model::PointsParams;
use crate::pipeline::Simulator;
use clap::{Args, Parser, Subcommand};
use report::OutputFormat;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "yt-points")]
#[command(about = "Estimate points earned by holding Pendle yield tokens to maturity")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate a YT from market and YT addresses
    Simulate(SimulateArgs),
    /// Simulate a market from the active listing
    Market(MarketArgs),
    /// List active markets
    Markets(MarketsArgs),
    /// Show configuration
    Config,
}

/// Position and emission overrides; unset values come from the config file
#[derive(Args, Debug, Clone, Default)]
pub struct PointsArgs {
    /// Underlying amount held
    #[arg(long)]
    pub underlying: Option<f64>,

    /// Points per day per unit of underlying
    #[arg(long)]
    pub points_per_day: Option<f64>,

    /// Points multiplier
    #[arg(long)]
    pub multiplier: Option<f64>,
}

impl PointsArgs {
    pub fn resolve(&self, config: &Config) -> PointsParams {
        let defaults = config.points.params();
        PointsParams {
            underlying_amount: self.underlying.unwrap_or(defaults.underlying_amount),
            points_per_day_per_underlying: self
                .points_per_day
                .unwrap_or(defaults.points_per_day_per_underlying),
            multiplier: self.multiplier.unwrap_or(defaults.multiplier),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Build a simulator against the configured Pendle API
pub fn build_simulator(config: &Config) -> anyhow::Result<Simulator<PendleClient>> {
    let mut client = PendleClient::with_config(config.api.pendle_config())?;
    if config.cache.enabled {
        let ttl = chrono::Duration::seconds(config.cache.ttl_secs as i64);
        client = client.with_cache(Arc::new(TtlCache::new(ttl)));
    }
    Ok(Simulator::new(client, config.fetch.fetcher_config()))
}
