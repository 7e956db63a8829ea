//! Implied YT price and points projection
//!
//! YT price from implied APY over the remaining life:
//! price = (1 + apy)^(hours / 8760) - 1
//!
//! Points earned by buying at that price and holding to maturity:
//! points = (1 / price) * hours * (points_per_day / 24) * underlying * multiplier

use super::{AggregateSeries, PointsParams, HOURS_PER_YEAR};
use crate::fetch::Transaction;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Signed hours from `from` until `to`
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// Implied YT price; NaN if either input is non-finite
pub fn yt_price(implied_apy: f64, hours_to_maturity: f64) -> f64 {
    if !implied_apy.is_finite() || !hours_to_maturity.is_finite() {
        return f64::NAN;
    }
    (1.0 + implied_apy).powf(hours_to_maturity / HOURS_PER_YEAR) - 1.0
}

/// Points for buying at `price` with `hours_to_maturity` left.
///
/// A zero price is not guarded: the infinity (or NaN at maturity) is passed
/// through to the caller.
pub fn points_for(price: f64, hours_to_maturity: f64, params: &PointsParams) -> f64 {
    let pph = params.points_per_day_per_underlying / 24.0;
    (1.0 / price) * hours_to_maturity * pph * params.underlying_amount * params.multiplier
}

/// Σ(apy·usd over finite apy) / Σ usd; NaN when total volume is not positive
pub fn weighted_implied_apy(implied: &[f64], usd: &[f64]) -> f64 {
    let total: f64 = usd.iter().filter(|v| v.is_finite()).sum();
    if total <= 0.0 {
        return f64::NAN;
    }
    let weighted: f64 = implied
        .iter()
        .zip(usd)
        .filter(|(apy, v)| apy.is_finite() && v.is_finite())
        .map(|(apy, v)| apy * v)
        .sum();
    weighted / total
}

/// Build the price and points series for a market.
///
/// Transactions with an unparseable timestamp are dropped; everything else
/// keeps its slot, in input order.
pub fn compute(
    transactions: &[Transaction],
    maturity: DateTime<Utc>,
    params: &PointsParams,
) -> AggregateSeries {
    let mut times = Vec::with_capacity(transactions.len());
    let mut implied = Vec::with_capacity(transactions.len());
    let mut usd = Vec::with_capacity(transactions.len());

    for tx in transactions {
        let Some(t) = tx.time() else {
            continue;
        };
        times.push(t);
        implied.push(tx.implied_apy());
        usd.push(tx.usd_valuation());
    }

    let weighted = weighted_implied_apy(&implied, &usd);

    let mut yt_prices = Vec::with_capacity(times.len());
    let mut points = Vec::with_capacity(times.len());
    for (t, apy) in times.iter().zip(&implied) {
        let hours = hours_between(*t, maturity);
        // NaN price (missing APY) carries through to NaN points
        let price = yt_price(*apy, hours);
        yt_prices.push(price);
        points.push(points_for(price, hours, params));
    }

    tracing::debug!(
        retained = times.len(),
        dropped = transactions.len() - times.len(),
        weighted_implied_apy = weighted,
        "Computed implied price series"
    );

    AggregateSeries {
        times,
        yt_price: yt_prices,
        points,
        weighted_implied_apy: weighted,
        maturity,
    }
}

/// Points available to a buyer at `now`.
///
/// Prices off the latest transaction's implied APY, falling back to the
/// weighted APY when that is missing. Zero once maturity has passed.
pub fn points_if_bought_now(
    transactions: &[Transaction],
    weighted_implied_apy: f64,
    maturity: DateTime<Utc>,
    now: DateTime<Utc>,
    params: &PointsParams,
) -> f64 {
    let latest = transactions
        .iter()
        .filter_map(|tx| tx.time().map(|t| (t, tx)))
        .fold(None, |best: Option<(DateTime<Utc>, &Transaction)>, cur| match best {
            Some(b) if cur.0 <= b.0 => Some(b),
            _ => Some(cur),
        });

    let apy = latest
        .map(|(_, tx)| tx.implied_apy())
        .filter(|v| v.is_finite())
        .unwrap_or(weighted_implied_apy);

    let hours = hours_between(now, maturity);
    if hours <= 0.0 {
        return 0.0;
    }
    if !apy.is_finite() {
        return f64::NAN;
    }
    points_for(yt_price(apy, hours), hours, params)
}

/// Number of distinct transaction ids
pub fn unique_transaction_count(transactions: &[Transaction]) -> usize {
    transactions
        .iter()
        .map(|tx| tx.id.as_deref())
        .collect::<HashSet<_>>()
        .len()
}
