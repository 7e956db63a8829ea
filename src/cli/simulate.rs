//! Simulate command implementation

use super::report::emit_report;
use super::{build_simulator, OutputArgs, PointsArgs};
use crate::config::Config;
use crate::pipeline::YtRequest;
use clap::Args;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Network name, e.g. arbitrum
    #[arg(long, default_value = "ethereum")]
    pub network: String,

    /// Market contract address
    #[arg(long)]
    pub market: String,

    /// YT contract address
    #[arg(long)]
    pub yt: String,

    #[command(flatten)]
    pub points: PointsArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl SimulateArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let request = YtRequest::new(
            &self.network,
            &self.market,
            &self.yt,
            self.points.resolve(config),
        )?;
        tracing::info!(network = %request.network, market = %request.market, yt = %request.yt, "Simulating YT");

        let simulator = build_simulator(config)?;
        let report = simulator.simulate_yt(&request, chrono::Utc::now()).await?;
        emit_report(&report, self.output.format, self.output.output.as_deref())
    }
}
