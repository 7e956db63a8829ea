//! Report rendering for the terminal

use crate::market::Market;
use crate::pipeline::SimulationReport;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::fmt::Write as _;
use std::path::Path;

/// Number of most recent observations shown in table output
const TABLE_ROWS: usize = 10;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Percentage with two decimals, `-` when non-finite
pub fn fmt_pct(x: f64) -> String {
    if x.is_finite() {
        format!("{:.2}%", x * 100.0)
    } else {
        "-".to_string()
    }
}

/// Number rounded to two decimals with thousands separators, `-` when non-finite
pub fn fmt_num(x: f64) -> String {
    if !x.is_finite() {
        return "-".to_string();
    }
    let rounded = format!("{:.2}", (x * 100.0).round() / 100.0);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// `2025-11-20 00:00:00Z`
pub fn fmt_maturity(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%SZ").to_string()
}

/// `20 Nov 2025 (12 days)`, `(Today)` or `(Expired)`
pub fn fmt_expiry(market: &Market, now: DateTime<Utc>) -> String {
    let Ok(expiry) = market.maturity() else {
        return market.expiry.to_string();
    };
    let millis = (expiry - now).num_milliseconds() as f64;
    let days = (millis / 86_400_000.0).ceil() as i64;
    let date = expiry.format("%-d %b %Y");
    match days {
        d if d > 0 => format!("{date} ({d} days)"),
        0 => format!("{date} (Today)"),
        _ => format!("{date} (Expired)"),
    }
}

/// Human-readable summary of a run
pub fn render_table(report: &SimulationReport) -> String {
    let mut out = String::new();
    let pages = if report.truncated {
        format!("{} (truncated)", report.pages_fetched)
    } else {
        report.pages_fetched.to_string()
    };

    let _ = writeln!(out, "Symbol:                 {}", report.symbol);
    let _ = writeln!(out, "Network:                {}", report.network);
    let _ = writeln!(out, "Market:                 {}", report.market);
    let _ = writeln!(out, "Maturity (UTC):         {}", fmt_maturity(report.maturity));
    let _ = writeln!(out, "Weighted Implied APY:   {}", fmt_pct(report.weighted_implied_apy));
    let _ = writeln!(out, "Transactions (unique):  {}", fmt_num(report.unique_transactions as f64));
    let _ = writeln!(out, "Pages fetched:          {pages}");
    let _ = writeln!(
        out,
        "Underlying / Pts/day / Multiplier: {} / {} / {}",
        fmt_num(report.params.underlying_amount),
        fmt_num(report.params.points_per_day_per_underlying),
        fmt_num(report.params.multiplier)
    );
    let _ = writeln!(out, "Points (buy now):       {}", fmt_num(report.now_points));

    let series = &report.series;
    let mut rows: Vec<usize> = (0..series.len()).collect();
    rows.sort_by_key(|&i| series.times[i]);
    let start = rows.len().saturating_sub(TABLE_ROWS);

    if !rows.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<22} {:>12} {:>18}", "Time (UTC)", "YT price", "Points to maturity");
        for &i in &rows[start..] {
            let _ = writeln!(
                out,
                "{:<22} {:>12} {:>18}",
                series.times[i].format("%Y-%m-%d %H:%M").to_string(),
                fmt_price(series.yt_price[i]),
                fmt_num(series.points[i])
            );
        }
    }

    if let (Some(first), Some(last)) = (report.fair_curve.y.first(), report.fair_curve.y.last()) {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Fair value curve: {} points, {} -> {}",
            report.fair_curve.len(),
            fmt_price(*first),
            fmt_price(*last)
        );
    }

    out
}

fn fmt_price(x: f64) -> String {
    if x.is_finite() {
        format!("{x:.6}")
    } else {
        "-".to_string()
    }
}

/// Listing of active markets
pub fn render_markets(markets: &[Market], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for m in markets {
        let _ = writeln!(out, "{:<24} {}  {}", m.name, m.address, fmt_expiry(m, now));
    }
    out
}

/// Print or save a report in the requested format
pub fn emit_report(
    report: &SimulationReport,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let rendered = match format {
        OutputFormat::Table => render_table(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    #[test]
    fn test_fmt_pct() {
        assert_eq!(fmt_pct(0.1234), "12.34%");
        assert_eq!(fmt_pct(f64::NAN), "-");
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(1234567.891), "1,234,567.89");
        assert_eq!(fmt_num(1234.5), "1,234.5");
        assert_eq!(fmt_num(999.0), "999");
        assert_eq!(fmt_num(-12345.0), "-12,345");
        assert_eq!(fmt_num(0.004), "0");
        assert_eq!(fmt_num(f64::INFINITY), "-");
    }

    #[test]
    fn test_fmt_maturity() {
        let t = Utc.with_ymd_and_hms(2025, 11, 20, 8, 0, 0).unwrap();
        assert_eq!(fmt_maturity(t), "2025-11-20 08:00:00Z");
    }

    #[test]
    fn test_fmt_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap();
        let market = Market {
            expiry: json!("2025-11-20T00:00:00.000Z"),
            ..Default::default()
        };
        assert_eq!(fmt_expiry(&market, now), "20 Nov 2025 (19 days)");

        let expired = now + Duration::days(30);
        assert_eq!(fmt_expiry(&market, expired), "20 Nov 2025 (Expired)");

        let same_instant = Utc.with_ymd_and_hms(2025, 11, 20, 0, 0, 0).unwrap();
        assert_eq!(fmt_expiry(&market, same_instant), "20 Nov 2025 (Today)");
    }
}
