//! Fair-value curve for a YT held at a constant implied rate
//!
//! fv = 1 - (1 + apy)^(-hours / 8760)
//!
//! Sampled at every observed transaction time, then hourly from the last
//! observation up to maturity.

use super::{hours_between, FairValueCurve, HOURS_PER_YEAR};
use chrono::{DateTime, Duration, Utc};

/// Fair YT value with `hours_to_maturity` left at `implied_apy`
pub fn fair_value(implied_apy: f64, hours_to_maturity: f64) -> f64 {
    1.0 - (1.0 + implied_apy).powf(-hours_to_maturity / HOURS_PER_YEAR)
}

/// Truncate to the top of the UTC hour
pub fn truncate_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp().div_euclid(3600) * 3600;
    DateTime::from_timestamp(secs, 0).unwrap_or(t)
}

/// Build the fair-value curve for `weighted_implied_apy`.
///
/// Empty when the rate is non-finite or there are no observations.
pub fn build_fair_curve(
    weighted_implied_apy: f64,
    times: &[DateTime<Utc>],
    maturity: DateTime<Utc>,
) -> FairValueCurve {
    if !weighted_implied_apy.is_finite() || times.is_empty() {
        return FairValueCurve::default();
    }

    let mut sorted = times.to_vec();
    sorted.sort();

    let mut curve = FairValueCurve::default();
    for t in &sorted {
        curve.x.push(*t);
        curve
            .y
            .push(fair_value(weighted_implied_apy, hours_between(*t, maturity)));
    }

    let historical = curve.len();
    if let Some(last) = sorted.last() {
        let mut cursor = truncate_to_hour(*last);
        while cursor <= maturity {
            curve.x.push(cursor);
            curve
                .y
                .push(fair_value(weighted_implied_apy, hours_between(cursor, maturity)));
            cursor += Duration::hours(1);
        }
    }

    tracing::debug!(
        historical,
        projected = curve.len() - historical,
        "Built fair-value curve"
    );

    curve
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn maturity() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 20, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_nan_rate_gives_empty_curve() {
        let curve = build_fair_curve(f64::NAN, &[maturity() - Duration::hours(5)], maturity());
        assert!(curve.x.is_empty());
        assert!(curve.y.is_empty());
    }

    #[test]
    fn test_no_times_gives_empty_curve() {
        let curve = build_fair_curve(0.05, &[], maturity());
        assert!(curve.is_empty());
        assert!(curve.y.is_empty());
    }

    #[test]
    fn test_two_days_out_scenario() {
        let t = maturity();
        let times = [t - Duration::hours(48), t - Duration::hours(24)];

        let curve = build_fair_curve(0.05, &times, t);

        assert_eq!(curve.len(), 2 + 25);
        assert_eq!(curve.y.len(), curve.x.len());
        assert_eq!(curve.x[0], t - Duration::hours(48));
        assert_eq!(curve.x[1], t - Duration::hours(24));
        assert_eq!(curve.x[2], t - Duration::hours(24));
        assert_eq!(*curve.x.last().unwrap(), t);

        for (x, y) in curve.x.iter().zip(&curve.y) {
            let hours = hours_between(*x, t);
            assert_eq!(*y, 1.0 - 1.05f64.powf(-hours / 8760.0));
        }
        assert_eq!(*curve.y.last().unwrap(), 0.0);
    }

    #[test]
    fn test_historical_segment_sorted() {
        let t = maturity();
        let times = [t - Duration::hours(2), t - Duration::hours(30), t - Duration::hours(10)];

        let curve = build_fair_curve(0.1, &times, t);

        assert_eq!(
            &curve.x[..3],
            &[t - Duration::hours(30), t - Duration::hours(10), t - Duration::hours(2)]
        );
        // Hourly projection from T-2h through T
        assert_eq!(curve.len(), 3 + 3);
    }

    #[test]
    fn test_projection_starts_at_truncated_hour() {
        let t = maturity();
        let last = t - Duration::hours(3) + Duration::minutes(42) + Duration::seconds(7);

        let curve = build_fair_curve(0.1, &[last], t);

        assert_eq!(curve.x[0], last);
        assert_eq!(curve.x[1], t - Duration::hours(3));
        assert_eq!(curve.len(), 1 + 4);
    }

    #[test]
    fn test_observation_after_maturity_has_no_projection() {
        let t = maturity();
        let curve = build_fair_curve(0.1, &[t + Duration::hours(5)], t);

        assert_eq!(curve.len(), 1);
        assert!(curve.y[0] < 0.0);
    }

    #[test]
    fn test_truncate_to_hour() {
        let t = Utc.with_ymd_and_hms(2025, 3, 4, 17, 59, 59).unwrap()
            + Duration::milliseconds(999);
        assert_eq!(
            truncate_to_hour(t),
            Utc.with_ymd_and_hms(2025, 3, 4, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_fair_value_one_year() {
        let fv = fair_value(0.25, 8760.0);
        assert!((fv - 0.2).abs() < 1e-12);
    }
}
