//! Transaction feed types

use crate::market::expiry::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A swap event on a Pendle market, as returned by the transactions endpoint.
///
/// Numeric fields are kept as raw JSON because the API mixes numbers and
/// numeric strings; use the accessor methods to read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction identifier; numeric ids are read as strings
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    /// ISO-8601 string or epoch milliseconds
    #[serde(default)]
    pub timestamp: Value,
    /// Annualised yield implied by the swap price
    #[serde(default)]
    pub implied_apy: Option<Value>,
    /// Nested USD valuation; anything but an object reads as absent
    #[serde(default, deserialize_with = "lenient_valuation")]
    pub valuation: Option<Valuation>,
    /// Flat USD valuation, used when `valuation.usd` is absent
    #[serde(default, rename = "valuation_usd")]
    pub valuation_usd: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub market: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub origin: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Nested valuation object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    #[serde(default)]
    pub usd: Option<Value>,
}

impl Transaction {
    /// Swap time, or `None` if the timestamp does not parse
    pub fn time(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// Implied APY as a number; NaN when absent or non-finite
    pub fn implied_apy(&self) -> f64 {
        self.implied_apy
            .as_ref()
            .map(coerce_number)
            .filter(|v| v.is_finite())
            .unwrap_or(f64::NAN)
    }

    /// USD notional; nested field wins over the flat one, non-finite reads as 0
    pub fn usd_valuation(&self) -> f64 {
        let raw = self
            .valuation
            .as_ref()
            .and_then(|v| v.usd.as_ref())
            .or(self.valuation_usd.as_ref());
        raw.map(coerce_number)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}

/// Read a JSON number or numeric string as `f64`
pub fn coerce_number(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// One page of the transactions endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    /// Decodable rows; a missing or non-array `results` reads as empty
    #[serde(default, deserialize_with = "lenient_rows")]
    pub results: Vec<Transaction>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub resume_token: Option<String>,
}

impl TransactionPage {
    /// Resume token, ignoring empty strings
    pub fn next_token(&self) -> Option<&str> {
        self.resume_token.as_deref().filter(|t| !t.is_empty())
    }
}

fn lenient_rows<'de, D>(deserializer: D) -> Result<Vec<Transaction>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    let total = items.len();
    let rows: Vec<Transaction> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(tx) => Some(tx),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable transaction");
                None
            }
        })
        .collect();
    if rows.len() < total {
        tracing::warn!(dropped = total - rows.len(), "Dropped malformed transactions");
    }
    Ok(rows)
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_valuation<'de, D>(deserializer: D) -> Result<Option<Valuation>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        raw @ Value::Object(_) => Ok(serde_json::from_value(raw).ok()),
        _ => Ok(None),
    }
}

/// Pagination position for the next request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// Numeric offset
    Skip(u64),
    /// Server-issued continuation token
    Resume(String),
}

/// Result of a bounded, deduplicated fetch
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Unique transactions in first-seen order
    pub transactions: Vec<Transaction>,
    /// Number of non-empty pages retrieved
    pub pages: usize,
    /// Whether the page cap stopped the fetch
    pub truncated: bool,
}
