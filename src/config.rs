//! Configuration types for yt-points

use crate::fetch::{Backoff, FetcherConfig, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
use crate::market::{PendleConfig, PENDLE_API_URL};
use crate::model::PointsParams;
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub points: PointsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Pendle API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Pendle core API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    PENDLE_API_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    12
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn pendle_config(&self) -> PendleConfig {
        PendleConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Transaction paging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Pages per run, at most 8
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Rows per page, at most 1000
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Lower bound of the pause between pages (inclusive)
    #[serde(default = "default_backoff_min_ms")]
    pub backoff_min_ms: u64,
    /// Upper bound of the pause between pages (exclusive)
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}
fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
fn default_backoff_min_ms() -> u64 {
    160
}
fn default_backoff_max_ms() -> u64 {
    260
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            page_size: default_page_size(),
            backoff_min_ms: default_backoff_min_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

impl FetchConfig {
    /// Paging settings; the page cap and page size can be lowered but never
    /// raised above their defaults
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            max_pages: self.max_pages.min(DEFAULT_MAX_PAGES),
            page_size: self.page_size.clamp(1, DEFAULT_PAGE_SIZE),
            backoff: Backoff {
                min: Duration::from_millis(self.backoff_min_ms),
                max: Duration::from_millis(self.backoff_max_ms),
            },
        }
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Entry time-to-live
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Default position and emission parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PointsConfig {
    #[serde(default = "default_underlying_amount")]
    pub underlying_amount: f64,
    #[serde(default = "default_points_per_day")]
    pub points_per_day: f64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_underlying_amount() -> f64 {
    1500.0
}
fn default_points_per_day() -> f64 {
    1.0
}
fn default_multiplier() -> f64 {
    36.0
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            underlying_amount: default_underlying_amount(),
            points_per_day: default_points_per_day(),
            multiplier: default_multiplier(),
        }
    }
}

impl PointsConfig {
    pub fn params(&self) -> PointsParams {
        PointsParams {
            underlying_amount: self.underlying_amount,
            points_per_day_per_underlying: self.points_per_day,
            multiplier: self.multiplier,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
