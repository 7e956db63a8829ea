//! End-to-end simulation against a mocked Pendle API

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};
use yt_points::config::Config;
use yt_points::error::ErrorKind;
use yt_points::fetch::{Backoff, FetcherConfig};
use yt_points::market::{PendleClient, PendleConfig};
use yt_points::model::PointsParams;
use yt_points::pipeline::{MarketRequest, Simulator, YtRequest};

const MARKET: &str = "0x1111111111111111111111111111111111111111";
const YT: &str = "0x2222222222222222222222222222222222222222";

fn maturity() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 20, 0, 0, 0).unwrap()
}

fn tx(id: &str, hours_before: i64, apy: f64, usd: f64) -> Value {
    json!({
        "id": id,
        "timestamp": (maturity() - Duration::hours(hours_before)).to_rfc3339(),
        "impliedApy": apy,
        "valuation": {"usd": usd}
    })
}

fn simulator_for(server: &MockServer) -> Simulator<PendleClient> {
    let client = PendleClient::with_config(PendleConfig {
        base_url: server.uri(),
        timeout: std::time::Duration::from_secs(2),
    })
    .unwrap();
    Simulator::new(
        client,
        FetcherConfig {
            backoff: Backoff::NONE,
            ..Default::default()
        },
    )
}

async fn mount_assets(server: &MockServer, chain_id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v3/{chain_id}/assets/all")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [{
                "address": YT,
                "tags": ["YT"],
                "expiry": "2025-11-20T00:00:00.000Z",
                "symbol": "YT-sUSDf"
            }]
        })))
        .mount(server)
        .await;
}

/// Serves full pages forever, keyed by the `skip` parameter
struct EndlessPages {
    page_size: usize,
}

impl Respond for EndlessPages {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let skip: usize = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "skip")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        let results: Vec<Value> = (0..self.page_size)
            .map(|i| {
                let n = skip + i;
                tx(&format!("tx-{n}"), 1 + (n as i64 % 500), 0.1, 10.0)
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "results": results }))
    }
}

#[tokio::test]
async fn test_simulate_yt_end_to_end() {
    let server = MockServer::start().await;
    mount_assets(&server, 42161).await;
    Mock::given(method("GET"))
        .and(path("/v4/42161/transactions"))
        .and(query_param("skip", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                tx("a", 72, 0.10, 100.0),
                tx("b", 48, 0.20, 300.0),
                tx("a", 72, 0.10, 100.0)
            ],
            "resumeToken": "next"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/42161/transactions"))
        .and(query_param("resumeToken", "next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [tx("c", 24, 0.30, 0.0)]
        })))
        .mount(&server)
        .await;

    let simulator = simulator_for(&server);
    let request = YtRequest::new("arbitrum", MARKET, YT, PointsParams::default()).unwrap();
    let report = simulator
        .simulate_yt(&request, maturity() - Duration::hours(12))
        .await
        .unwrap();

    assert_eq!(report.symbol, "YT-sUSDf");
    assert_eq!(report.pages_fetched, 2);
    assert!(!report.truncated);
    assert_eq!(report.unique_transactions, 3);
    assert_eq!(report.series.len(), 3);
    // (0.1 * 100 + 0.2 * 300 + 0.3 * 0) / 400
    assert!((report.weighted_implied_apy - 0.175).abs() < 1e-12);
    assert!(report.series.yt_price.iter().all(|p| *p > 0.0 && *p < 1.0));
    assert!(report.now_points.is_finite());
}

#[tokio::test]
async fn test_page_cap_truncates() {
    let server = MockServer::start().await;
    mount_assets(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v4/1/transactions"))
        .respond_with(EndlessPages { page_size: 1000 })
        .expect(8)
        .mount(&server)
        .await;

    let simulator = simulator_for(&server);
    let request = YtRequest::new("ethereum", MARKET, YT, PointsParams::default()).unwrap();
    let report = simulator
        .simulate_yt(&request, maturity() - Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(report.pages_fetched, 8);
    assert!(report.truncated);
    assert_eq!(report.unique_transactions, 8000);
}

#[tokio::test]
async fn test_transaction_error_aborts_run() {
    let server = MockServer::start().await;
    mount_assets(&server, 8453).await;
    Mock::given(method("GET"))
        .and(path("/v4/8453/transactions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let simulator = simulator_for(&server);
    let request = YtRequest::new("base", MARKET, YT, PointsParams::default()).unwrap();
    let err = simulator
        .simulate_yt(&request, maturity())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_simulate_market_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/999/markets/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "markets": [{
                "name": "kHYPE",
                "address": MARKET,
                "expiry": 1763596800,
                "pt": "0xpt",
                "yt": YT,
                "sy": "0xsy",
                "underlyingAsset": "0xu"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/999/transactions"))
        .and(query_param("market", MARKET))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let simulator = simulator_for(&server);
    let request = MarketRequest::new(999, None, PointsParams::default()).unwrap();
    let report = simulator
        .simulate_market(&request, maturity() - Duration::days(2))
        .await
        .unwrap();

    assert_eq!(report.symbol, "kHYPE");
    assert_eq!(report.maturity, maturity());
    assert!(report.series.is_empty());
    assert!(report.weighted_implied_apy.is_nan());
    assert!(report.fair_curve.is_empty());
}

#[tokio::test]
async fn test_cached_simulator_reuses_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/1/markets/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "markets": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.cache.enabled = true;
    let simulator = yt_points::cli::build_simulator(&config).unwrap();

    let network = yt_points::market::Network::Ethereum;
    assert!(simulator.active_markets(network).await.unwrap().is_empty());
    assert!(simulator.active_markets(network).await.unwrap().is_empty());
}
