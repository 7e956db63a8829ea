//! Simulation pipeline
//!
//! One run: resolve market metadata, fetch the swap history, price it and
//! build the fair-value curve. Two entry points share the same core:
//! - [`Simulator::simulate_yt`]: market and YT addresses given directly
//! - [`Simulator::simulate_market`]: market picked from the active listing

mod inputs;

pub use inputs::{
    clamp_input, is_address, normalize_address, MarketRequest, YtRequest, MAX_MULTIPLIER,
    MAX_POINTS_PER_DAY, MAX_UNDERLYING,
};

use crate::error::PendleError;
use crate::fetch::{FetcherConfig, TransactionFetcher, TransactionSource};
use crate::market::{Market, MarketResolver, Network};
use crate::model::{
    build_fair_curve, compute, points_if_bought_now, unique_transaction_count, AggregateSeries,
    FairValueCurve, PointsParams,
};
use crate::telemetry::{record_latency, LatencyMetric};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Everything a presentation layer needs from one run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub symbol: String,
    pub network: Network,
    pub market: String,
    pub maturity: DateTime<Utc>,
    /// Volume-weighted implied APY; NaN when there was no volume
    pub weighted_implied_apy: f64,
    pub unique_transactions: usize,
    pub pages_fetched: usize,
    /// Whether the page cap cut the history short
    pub truncated: bool,
    /// Points available to a buyer at report time
    pub now_points: f64,
    pub params: PointsParams,
    pub series: AggregateSeries,
    pub fair_curve: FairValueCurve,
}

/// Runs simulations against a Pendle API client
pub struct Simulator<C> {
    client: Arc<C>,
    fetcher: TransactionFetcher<Arc<C>>,
}

impl<C> Simulator<C>
where
    C: MarketResolver + TransactionSource,
{
    pub fn new(client: C, config: FetcherConfig) -> Self {
        let client = Arc::new(client);
        Self {
            fetcher: TransactionFetcher::with_config(Arc::clone(&client), config),
            client,
        }
    }

    /// List active markets for the chain of `network`
    pub async fn active_markets(&self, network: Network) -> Result<Vec<Market>, PendleError> {
        self.client.resolve_active_markets(network.chain_id()).await
    }

    /// Simulate from explicit market and YT addresses
    pub async fn simulate_yt(
        &self,
        request: &YtRequest,
        now: DateTime<Utc>,
    ) -> Result<SimulationReport, PendleError> {
        let asset = self
            .client
            .resolve_yt_asset(request.network, &request.yt)
            .await?;

        self.run(
            request.network,
            &request.market,
            asset.symbol,
            asset.maturity,
            request.params,
            now,
        )
        .await
    }

    /// Simulate a market chosen from the active listing
    pub async fn simulate_market(
        &self,
        request: &MarketRequest,
        now: DateTime<Utc>,
    ) -> Result<SimulationReport, PendleError> {
        let markets = self.active_markets(request.network).await?;
        let market = select_market(markets, request.market.as_deref())?;
        let maturity = market.maturity()?;

        self.run(
            request.network,
            &market.address,
            market.name,
            maturity,
            request.params,
            now,
        )
        .await
    }

    async fn run(
        &self,
        network: Network,
        market: &str,
        symbol: String,
        maturity: DateTime<Utc>,
        params: PointsParams,
        now: DateTime<Utc>,
    ) -> Result<SimulationReport, PendleError> {
        let started = Instant::now();

        let fetched = self.fetcher.fetch_all(network, market).await?;
        let series = compute(&fetched.transactions, maturity, &params);
        let fair_curve = build_fair_curve(series.weighted_implied_apy, &series.times, maturity);
        let now_points = points_if_bought_now(
            &fetched.transactions,
            series.weighted_implied_apy,
            maturity,
            now,
            &params,
        );

        record_latency(LatencyMetric::Simulation, started.elapsed());
        tracing::info!(
            symbol = %symbol,
            network = %network,
            transactions = fetched.transactions.len(),
            weighted_implied_apy = series.weighted_implied_apy,
            now_points,
            "Simulation complete"
        );

        Ok(SimulationReport {
            symbol,
            network,
            market: market.to_string(),
            maturity,
            weighted_implied_apy: series.weighted_implied_apy,
            unique_transactions: unique_transaction_count(&fetched.transactions),
            pages_fetched: fetched.pages,
            truncated: fetched.truncated,
            now_points,
            params,
            series,
            fair_curve,
        })
    }
}

/// Pick `wanted` from the listing, or the first market when `None`
fn select_market(markets: Vec<Market>, wanted: Option<&str>) -> Result<Market, PendleError> {
    match wanted {
        Some(address) => markets
            .into_iter()
            .find(|m| m.address.eq_ignore_ascii_case(address))
            .ok_or_else(|| PendleError::NotFound(format!("No active market with address {address}"))),
        None => markets
            .into_iter()
            .next()
            .ok_or_else(|| PendleError::NotFound("No active markets on this chain".to_string())),
    }
}
