//! Markets command implementation

use super::build_simulator;
use super::report::render_markets;
use crate::config::Config;
use crate::market::Network;
use clap::Args;

#[derive(Args, Debug)]
pub struct MarketsArgs {
    /// Chain id, e.g. 8453
    #[arg(long)]
    pub chain_id: u64,

    /// Print raw JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl MarketsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let network = Network::from_chain_id(self.chain_id)?;
        let simulator = build_simulator(config)?;
        let markets = simulator.active_markets(network).await?;
        tracing::info!(network = %network, count = markets.len(), "Fetched active markets");

        if self.json {
            println!("{}", serde_json::to_string_pretty(&markets)?);
        } else {
            print!("{}", render_markets(&markets, chrono::Utc::now()));
        }
        Ok(())
    }
}
