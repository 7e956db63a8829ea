//! Input validation for simulation requests

use crate::error::PendleError;
use crate::market::Network;
use crate::model::PointsParams;

/// Upper bound on the underlying amount
pub const MAX_UNDERLYING: f64 = 1e9;
/// Upper bound on points per day per underlying
pub const MAX_POINTS_PER_DAY: f64 = 1e6;
/// Upper bound on the points multiplier
pub const MAX_MULTIPLIER: f64 = 1e4;

/// Whether `s` is `0x` followed by 40 hex digits
pub fn is_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Trim, lower-case and validate a contract address
pub fn normalize_address(raw: &str, label: &str) -> Result<String, PendleError> {
    let addr = raw.trim().to_lowercase();
    if !is_address(&addr) {
        return Err(PendleError::InvalidInput(format!("Invalid {label} address")));
    }
    Ok(addr)
}

/// Clamp into `[min, max]`; non-finite values become `min`
pub fn clamp_input(value: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    }
}

impl PointsParams {
    /// Clamp every parameter into its accepted range
    pub fn sanitized(self) -> Self {
        Self {
            underlying_amount: clamp_input(self.underlying_amount, 0.0, MAX_UNDERLYING),
            points_per_day_per_underlying: clamp_input(
                self.points_per_day_per_underlying,
                0.0,
                MAX_POINTS_PER_DAY,
            ),
            multiplier: clamp_input(self.multiplier, 0.0, MAX_MULTIPLIER),
        }
    }
}

/// Simulation keyed by a YT contract address
#[derive(Debug, Clone)]
pub struct YtRequest {
    pub network: Network,
    pub market: String,
    pub yt: String,
    pub params: PointsParams,
}

impl YtRequest {
    /// Validate raw user input
    pub fn new(
        network: &str,
        market: &str,
        yt: &str,
        params: PointsParams,
    ) -> Result<Self, PendleError> {
        Ok(Self {
            network: network.parse()?,
            market: normalize_address(market, "market")?,
            yt: normalize_address(yt, "YT")?,
            params: params.sanitized(),
        })
    }
}

/// Simulation keyed by a market from the active listing
#[derive(Debug, Clone)]
pub struct MarketRequest {
    pub network: Network,
    /// Market to pick; the first listed market when `None`
    pub market: Option<String>,
    pub params: PointsParams,
}

impl MarketRequest {
    /// Validate raw user input
    pub fn new(
        chain_id: u64,
        market: Option<&str>,
        params: PointsParams,
    ) -> Result<Self, PendleError> {
        Ok(Self {
            network: Network::from_chain_id(chain_id)?,
            market: market
                .map(|m| normalize_address(m, "market"))
                .transpose()?,
            params: params.sanitized(),
        })
    }
}
