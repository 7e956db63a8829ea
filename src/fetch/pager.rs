//! Bounded transaction pager
//!
//! Walks the transactions endpoint page by page, preferring the server's
//! resume token over numeric offsets, and stops at a fixed page cap.

use super::types::{FetchOutcome, PageCursor, Transaction};
use super::{PageRequest, TransactionSource};
use crate::error::PendleError;
use crate::market::Network;
use crate::telemetry::{increment, CounterMetric};
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;

/// Default maximum number of pages per run (~8000 rows)
pub const DEFAULT_MAX_PAGES: usize = 8;

/// Rows requested per page
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Randomised pause between pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Inclusive lower bound
    pub min: Duration,
    /// Exclusive upper bound
    pub max: Duration,
}

impl Backoff {
    /// No pause at all
    pub const NONE: Backoff = Backoff {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    /// Draw a delay uniformly from `[min, max)`
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::rng().random_range(self.min..self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(160),
            max: Duration::from_millis(260),
        }
    }
}

/// Configuration for the pager
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub max_pages: usize,
    pub page_size: u64,
    pub backoff: Backoff,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            page_size: DEFAULT_PAGE_SIZE,
            backoff: Backoff::default(),
        }
    }
}

/// Fetches every swap transaction for a market, up to the page cap
pub struct TransactionFetcher<S> {
    source: S,
    config: FetcherConfig,
}

impl<S: TransactionSource> TransactionFetcher<S> {
    /// Create a fetcher with default configuration
    pub fn new(source: S) -> Self {
        Self::with_config(source, FetcherConfig::default())
    }

    pub fn with_config(source: S, config: FetcherConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetch and deduplicate all transactions for `market` on `network`.
    ///
    /// Any failed page aborts the whole fetch; rows from earlier pages are
    /// discarded.
    pub async fn fetch_all(
        &self,
        network: Network,
        market: &str,
    ) -> Result<FetchOutcome, PendleError> {
        let mut rows: Vec<Transaction> = Vec::new();
        let mut skip = 0u64;
        let mut resume_token: Option<String> = None;
        let mut pages = 0usize;
        let mut truncated = false;

        tracing::info!(
            network = %network,
            market,
            max_pages = self.config.max_pages,
            "Fetching transactions"
        );

        while pages < self.config.max_pages {
            let cursor = match &resume_token {
                Some(token) => PageCursor::Resume(token.clone()),
                None => PageCursor::Skip(skip),
            };
            let request = PageRequest {
                chain_id: network.chain_id(),
                market,
                limit: self.config.page_size,
                cursor,
            };

            let page = self
                .source
                .fetch_page(&request)
                .await
                .map_err(|e| PendleError::network("fetching transactions", e))?;

            if page.results.is_empty() {
                break;
            }

            let next_token = page.next_token().map(str::to_owned);
            let page_len = page.results.len();
            rows.extend(page.results);
            pages += 1;
            increment(CounterMetric::PagesFetched);

            tracing::debug!(page = pages, rows = page_len, total = rows.len(), "Fetched page");

            if let Some(token) = next_token {
                resume_token = Some(token);
            } else if resume_token.is_none() {
                skip += self.config.page_size;
            }

            if pages >= self.config.max_pages {
                tracing::warn!(pages, rows = rows.len(), "Truncated transactions due to page cap");
                increment(CounterMetric::FetchTruncated);
                truncated = true;
                break;
            }

            tokio::time::sleep(self.config.backoff.sample()).await;
        }

        let fetched = rows.len();
        let transactions = dedup_by_id(rows);
        tracing::info!(
            fetched,
            unique = transactions.len(),
            pages,
            "Deduplicated transactions"
        );

        Ok(FetchOutcome {
            transactions,
            pages,
            truncated,
        })
    }
}

/// Keep the first transaction for each id, dropping rows without one
pub fn dedup_by_id(rows: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|tx| match tx.id.as_deref() {
            Some(id) if !id.is_empty() => seen.insert(id.to_owned()),
            _ => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, HttpError};
    use crate::fetch::types::TransactionPage;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    fn tx(id: &str) -> Transaction {
        Transaction {
            id: Some(id.to_string()),
            timestamp: json!("2025-01-01T00:00:00Z"),
            ..Default::default()
        }
    }

    fn full_page(prefix: &str, n: usize) -> Vec<Transaction> {
        (0..n).map(|i| tx(&format!("{prefix}-{i}"))).collect()
    }

    /// Serves scripted pages and records the cursors it was asked for
    struct ScriptedSource {
        pages: Mutex<Vec<Result<TransactionPage, HttpError>>>,
        cursors: Mutex<Vec<PageCursor>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<TransactionPage, HttpError>>) -> Self {
            let mut pages = pages;
            pages.reverse();
            Self {
                pages: Mutex::new(pages),
                cursors: Mutex::new(Vec::new()),
            }
        }

        fn cursors(&self) -> Vec<PageCursor> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TransactionSource for ScriptedSource {
        async fn fetch_page(
            &self,
            request: &PageRequest<'_>,
        ) -> Result<TransactionPage, HttpError> {
            self.cursors.lock().unwrap().push(request.cursor.clone());
            self.pages
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(TransactionPage::default()))
        }
    }

    fn page(results: Vec<Transaction>, token: Option<&str>) -> Result<TransactionPage, HttpError> {
        Ok(TransactionPage {
            results,
            resume_token: token.map(str::to_string),
        })
    }

    fn fetcher(source: ScriptedSource) -> TransactionFetcher<ScriptedSource> {
        TransactionFetcher::with_config(
            source,
            FetcherConfig {
                backoff: Backoff::NONE,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_dedup_preserves_first_occurrence() {
        let mut second_a = tx("a");
        second_a.market = Some("dup".into());
        let rows = vec![tx("a"), tx("b"), second_a, tx("c"), tx("b")];

        let out = dedup_by_id(rows);
        let ids: Vec<_> = out.iter().map(|t| t.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(out[0].market.is_none());
    }

    #[test]
    fn test_dedup_drops_missing_ids() {
        let mut no_id = tx("x");
        no_id.id = None;
        let mut empty_id = tx("y");
        empty_id.id = Some(String::new());

        let out = dedup_by_id(vec![no_id, tx("a"), empty_id]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_backoff_range() {
        let backoff = Backoff::default();
        for _ in 0..200 {
            let d = backoff.sample();
            assert!(d >= Duration::from_millis(160));
            assert!(d < Duration::from_millis(260));
        }
        assert_eq!(Backoff::NONE.sample(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_skip_pagination_until_empty() {
        let source = ScriptedSource::new(vec![
            page(full_page("p1", 1000), None),
            page(full_page("p2", 10), None),
            page(vec![], None),
        ]);
        let f = fetcher(source);

        let out = f.fetch_all(Network::Arbitrum, "0xm").await.unwrap();

        assert_eq!(out.transactions.len(), 1010);
        assert_eq!(out.pages, 2);
        assert!(!out.truncated);
        assert_eq!(
            f.source.cursors(),
            vec![PageCursor::Skip(0), PageCursor::Skip(1000), PageCursor::Skip(2000)]
        );
    }

    #[tokio::test]
    async fn test_resume_token_preferred_once_seen() {
        let source = ScriptedSource::new(vec![
            page(full_page("p1", 3), Some("t1")),
            page(full_page("p2", 3), None),
            page(full_page("p3", 3), Some("t2")),
            page(vec![], None),
        ]);
        let f = fetcher(source);

        let out = f.fetch_all(Network::Ethereum, "0xm").await.unwrap();

        assert_eq!(out.transactions.len(), 9);
        assert_eq!(
            f.source.cursors(),
            vec![
                PageCursor::Skip(0),
                PageCursor::Resume("t1".into()),
                PageCursor::Resume("t1".into()),
                PageCursor::Resume("t2".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_page_cap_truncates_without_error() {
        let pages = (0..9)
            .map(|p| page(full_page(&format!("p{p}"), 1000), None))
            .collect();
        let f = fetcher(ScriptedSource::new(pages));

        let out = f.fetch_all(Network::Base, "0xm").await.unwrap();

        assert_eq!(out.pages, 8);
        assert!(out.truncated);
        assert_eq!(out.transactions.len(), 8000);
        assert_eq!(f.source.cursors().len(), 8);
    }

    #[tokio::test]
    async fn test_overlapping_pages_deduplicated() {
        let source = ScriptedSource::new(vec![
            page(vec![tx("a"), tx("b")], None),
            page(vec![tx("b"), tx("c")], None),
        ]);
        let f = fetcher(source);

        let out = f.fetch_all(Network::Mantle, "0xm").await.unwrap();
        let ids: Vec<_> = out
            .transactions
            .iter()
            .map(|t| t.id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failure_discards_partial_results() {
        let source = ScriptedSource::new(vec![
            page(full_page("p1", 1000), None),
            Err(HttpError::Timeout),
        ]);
        let f = fetcher(source);

        let err = f.fetch_all(Network::Arbitrum, "0xm").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(
            err.to_string(),
            "Network error while fetching transactions: request timed out"
        );
    }

    #[tokio::test]
    async fn test_zero_page_cap_makes_no_requests() {
        let f = TransactionFetcher::with_config(
            ScriptedSource::new(vec![page(full_page("p", 5), None)]),
            FetcherConfig {
                max_pages: 0,
                backoff: Backoff::NONE,
                ..Default::default()
            },
        );
        let out = f.fetch_all(Network::Arbitrum, "0xm").await.unwrap();
        assert!(out.transactions.is_empty());
        assert!(f.source.cursors().is_empty());
    }

    fn paced_fetcher(
        source: ScriptedSource,
        max_pages: usize,
    ) -> TransactionFetcher<ScriptedSource> {
        let pause = Duration::from_millis(100);
        TransactionFetcher::with_config(
            source,
            FetcherConfig {
                max_pages,
                backoff: Backoff {
                    min: pause,
                    max: pause,
                },
                ..Default::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_between_pages_not_after_cap() {
        let f = paced_fetcher(
            ScriptedSource::new(vec![
                page(full_page("p1", 1000), None),
                page(full_page("p2", 1000), None),
                page(full_page("p3", 1000), None),
            ]),
            3,
        );

        let started = tokio::time::Instant::now();
        let out = f.fetch_all(Network::Arbitrum, "0xm").await.unwrap();
        let elapsed = started.elapsed();

        assert!(out.truncated);
        assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(300), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_pause_after_empty_page() {
        let f = paced_fetcher(
            ScriptedSource::new(vec![page(full_page("p1", 10), None), page(vec![], None)]),
            DEFAULT_MAX_PAGES,
        );

        let started = tokio::time::Instant::now();
        let out = f.fetch_all(Network::Arbitrum, "0xm").await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(out.pages, 1);
        assert!(elapsed >= Duration::from_millis(100), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(200), "elapsed {elapsed:?}");
    }
}
