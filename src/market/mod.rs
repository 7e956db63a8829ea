//! Market discovery module
//!
//! Resolves YT assets and active Pendle markets via the Pendle core API

mod cache;
pub mod expiry;
mod network;
mod pendle;

pub use cache::{Clock, NoCache, ResponseCache, SystemClock, TtlCache};
pub use network::Network;
pub use pendle::{PendleClient, PendleConfig, PENDLE_API_URL};

use crate::error::PendleError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An active Pendle market, as listed by the markets endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    /// Display name, e.g. "sUSDf"
    #[serde(default)]
    pub name: String,
    /// Market contract address
    pub address: String,
    /// Maturity in any of the encodings accepted by [`expiry::parse_expiry`]
    #[serde(default)]
    pub expiry: Value,
    #[serde(default)]
    pub pt: String,
    #[serde(default)]
    pub yt: String,
    #[serde(default)]
    pub sy: String,
    #[serde(default)]
    pub underlying_asset: String,
}

impl Market {
    /// Resolved maturity instant
    pub fn maturity(&self) -> Result<DateTime<Utc>, PendleError> {
        expiry::resolve_expiry(&self.expiry)
    }
}

/// Entry of the assets listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetEntry {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub expiry: Value,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl AssetEntry {
    /// Whether this entry is a YT with the given address and some expiry
    pub fn is_yt_match(&self, yt_address: &str) -> bool {
        self.tags.iter().any(|t| t == "YT")
            && self.address.eq_ignore_ascii_case(yt_address)
            && has_expiry(&self.expiry)
    }
}

fn has_expiry(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Bool(b) => *b,
        _ => true,
    }
}

/// A yield token with resolved maturity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YtAsset {
    pub symbol: String,
    pub address: String,
    pub maturity: DateTime<Utc>,
}

/// Trait for market metadata lookups
#[async_trait]
pub trait MarketResolver: Send + Sync {
    /// Resolve a YT contract address to its symbol and maturity
    async fn resolve_yt_asset(
        &self,
        network: Network,
        yt_address: &str,
    ) -> Result<YtAsset, PendleError>;

    /// List active markets on a chain
    async fn resolve_active_markets(&self, chain_id: u64) -> Result<Vec<Market>, PendleError>;
}

#[async_trait]
impl<T: MarketResolver + ?Sized> MarketResolver for std::sync::Arc<T> {
    async fn resolve_yt_asset(
        &self,
        network: Network,
        yt_address: &str,
    ) -> Result<YtAsset, PendleError> {
        (**self).resolve_yt_asset(network, yt_address).await
    }

    async fn resolve_active_markets(&self, chain_id: u64) -> Result<Vec<Market>, PendleError> {
        (**self).resolve_active_markets(chain_id).await
    }
}
