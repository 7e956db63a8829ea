//! Pricing model module
//!
//! Turns a market's swap history into implied YT prices, projected points
//! and a fair-value curve

mod fair_value;
mod pricer;

pub use fair_value::{build_fair_curve, fair_value, truncate_to_hour};
pub use pricer::{
    compute, hours_between, points_for, points_if_bought_now, unique_transaction_count,
    weighted_implied_apy, yt_price,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed hours-per-year divisor (365 * 24)
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Points emission parameters for a position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointsParams {
    /// Units of the underlying asset held through the YT
    pub underlying_amount: f64,
    /// Points earned per underlying unit per day
    pub points_per_day_per_underlying: f64,
    /// Pendle points multiplier
    pub multiplier: f64,
}

impl Default for PointsParams {
    fn default() -> Self {
        Self {
            underlying_amount: 1500.0,
            points_per_day_per_underlying: 1.0,
            multiplier: 36.0,
        }
    }
}

/// Implied price and points series, one entry per retained transaction.
///
/// Entries follow fetch order, not time order.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateSeries {
    pub times: Vec<DateTime<Utc>>,
    pub yt_price: Vec<f64>,
    pub points: Vec<f64>,
    /// Volume-weighted implied APY; NaN when total volume is zero
    pub weighted_implied_apy: f64,
    pub maturity: DateTime<Utc>,
}

impl AggregateSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Theoretical YT price curve
#[derive(Debug, Clone, Default, Serialize)]
pub struct FairValueCurve {
    pub x: Vec<DateTime<Utc>>,
    pub y: Vec<f64>,
}

impl FairValueCurve {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
