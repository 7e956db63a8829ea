//! Configuration integration tests

use yt_points::config::Config;
use yt_points::telemetry::LogFormat;

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();

    assert_eq!(config.api.base_url, "https://api-v2.pendle.finance/core");
    assert_eq!(config.api.timeout_secs, 12);
    assert_eq!(config.fetch.max_pages, 8);
    assert_eq!(config.fetch.page_size, 1000);
    assert!(!config.cache.enabled);
    assert_eq!(config.points.underlying_amount, 1500.0);
    assert_eq!(config.points.multiplier, 36.0);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
}

#[test]
fn test_config_example_matches_defaults() {
    let example: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    let defaults = Config::default();

    assert_eq!(example.api.base_url, defaults.api.base_url);
    assert_eq!(example.fetch.backoff_min_ms, defaults.fetch.backoff_min_ms);
    assert_eq!(example.fetch.backoff_max_ms, defaults.fetch.backoff_max_ms);
    assert_eq!(example.cache.ttl_secs, defaults.cache.ttl_secs);
    assert_eq!(example.points.params(), defaults.points.params());
}
