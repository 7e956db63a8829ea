//! Market command implementation

use super::report::emit_report;
use super::{build_simulator, OutputArgs, PointsArgs};
use crate::config::Config;
use crate::pipeline::MarketRequest;
use clap::Args;

#[derive(Args, Debug)]
pub struct MarketArgs {
    /// Chain id, e.g. 42161
    #[arg(long)]
    pub chain_id: u64,

    /// Market address; defaults to the first active market
    #[arg(long)]
    pub market: Option<String>,

    #[command(flatten)]
    pub points: PointsArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl MarketArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let request = MarketRequest::new(
            self.chain_id,
            self.market.as_deref(),
            self.points.resolve(config),
        )?;
        tracing::info!(network = %request.network, market = ?request.market, "Simulating market");

        let simulator = build_simulator(config)?;
        let report = simulator
            .simulate_market(&request, chrono::Utc::now())
            .await?;
        emit_report(&report, self.output.format, self.output.output.as_deref())
    }
}
