//! Pendle core API client
//!
//! Serves the three listings the simulator needs: assets, active markets and
//! market transactions. Responses go through an injected [`ResponseCache`].

use super::cache::{NoCache, ResponseCache};
use super::expiry::resolve_expiry;
use super::{AssetEntry, Market, MarketResolver, Network, YtAsset};
use crate::error::{HttpError, PendleError};
use crate::fetch::{PageCursor, PageRequest, TransactionPage, TransactionSource};
use crate::fetch::{SWAP_ACTIONS, SWAP_ORIGINS};
use crate::telemetry::{increment, record_latency, CounterMetric, LatencyMetric};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Pendle core API base URL
pub const PENDLE_API_URL: &str = "https://api-v2.pendle.finance/core";

/// Configuration for the Pendle client
#[derive(Debug, Clone)]
pub struct PendleConfig {
    /// Base URL for the Pendle core API
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for PendleConfig {
    fn default() -> Self {
        Self {
            base_url: PENDLE_API_URL.to_string(),
            timeout: Duration::from_secs(12),
        }
    }
}

/// Client for the Pendle core API
pub struct PendleClient {
    config: PendleConfig,
    client: Client,
    cache: Arc<dyn ResponseCache>,
}

impl PendleClient {
    /// Create a client with default configuration and no caching
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(PendleConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: PendleConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(HttpError::Transport)?;

        Ok(Self {
            config,
            client,
            cache: Arc::new(NoCache),
        })
    }

    /// Route responses through `cache`
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &PendleConfig {
        &self.config
    }

    /// Fetch the full asset listing for a network
    pub async fn fetch_assets(&self, network: Network) -> Result<Vec<AssetEntry>, HttpError> {
        let url = format!("{}/v3{}/assets/all", self.config.base_url, network.path());
        let response: AssetsResponse = self.get(&url, &[]).await?;
        Ok(response.assets)
    }

    /// Fetch the active market listing for a chain
    pub async fn fetch_active_markets(&self, chain_id: u64) -> Result<Vec<Market>, HttpError> {
        let url = format!("{}/v1/{}/markets/active", self.config.base_url, chain_id);
        let response: MarketsResponse = self.get(&url, &[]).await?;
        Ok(response.markets)
    }

    /// GET `url` and decode the JSON body, consulting the cache first
    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, HttpError> {
        let request = self.client.get(url).query(query).build()?;
        let key = request.url().to_string();

        let body = match self.cache.get(&key).await {
            Some(body) => {
                increment(CounterMetric::CacheHits);
                tracing::debug!(url = %key, "Cache hit");
                body
            }
            None => {
                let body = self.execute(request).await?;
                self.cache.put(&key, body.clone()).await;
                body
            }
        };

        serde_json::from_value(body).map_err(|e| HttpError::Decode(e.to_string()))
    }

    async fn execute(&self, request: reqwest::Request) -> Result<Value, HttpError> {
        let url = request.url().to_string();
        tracing::debug!(url = %url, "Requesting Pendle API");

        let started = Instant::now();
        increment(CounterMetric::HttpRequests);
        let response = self.client.execute(request).await?;
        record_latency(LatencyMetric::HttpRequest, started.elapsed());

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status { status, url });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl MarketResolver for PendleClient {
    async fn resolve_yt_asset(
        &self,
        network: Network,
        yt_address: &str,
    ) -> Result<YtAsset, PendleError> {
        let assets = self
            .fetch_assets(network)
            .await
            .map_err(|e| PendleError::network("fetching assets", e))?;

        let entry = assets
            .into_iter()
            .find(|a| a.is_yt_match(yt_address))
            .ok_or_else(|| {
                PendleError::NotFound(
                    "No matching YT asset/expiry found. Please check YT address and network."
                        .to_string(),
                )
            })?;

        let maturity = resolve_expiry(&entry.expiry)?;
        let symbol = entry
            .symbol
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "YT".to_string());

        tracing::info!(symbol = %symbol, maturity = %maturity, "Resolved YT asset");

        Ok(YtAsset {
            symbol,
            address: entry.address,
            maturity,
        })
    }

    async fn resolve_active_markets(&self, chain_id: u64) -> Result<Vec<Market>, PendleError> {
        let markets = self
            .fetch_active_markets(chain_id)
            .await
            .map_err(|e| PendleError::network("fetching active markets", e))?;

        tracing::debug!(chain_id, count = markets.len(), "Fetched active markets");
        Ok(markets)
    }
}

#[async_trait]
impl TransactionSource for PendleClient {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<TransactionPage, HttpError> {
        let url = format!(
            "{}/v4/{}/transactions",
            self.config.base_url, request.chain_id
        );

        let mut query = vec![
            ("market", request.market.to_string()),
            ("action", SWAP_ACTIONS.to_string()),
            ("origin", SWAP_ORIGINS.to_string()),
            ("limit", request.limit.to_string()),
            ("minValue", "0".to_string()),
        ];
        match &request.cursor {
            PageCursor::Resume(token) => query.push(("resumeToken", token.clone())),
            PageCursor::Skip(skip) => query.push(("skip", skip.to_string())),
        }

        self.get(&url, &query).await
    }
}

/// Assets listing response
#[derive(Debug, Deserialize)]
struct AssetsResponse {
    #[serde(default)]
    assets: Vec<AssetEntry>,
}

/// Active markets response
#[derive(Debug, Deserialize)]
struct MarketsResponse {
    #[serde(default)]
    markets: Vec<Market>,
}
