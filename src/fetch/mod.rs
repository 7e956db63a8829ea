//! Transaction fetcher
//!
//! Retrieves swap history for a single Pendle market, paged and deduplicated

mod pager;
mod types;

pub use pager::{
    dedup_by_id, Backoff, FetcherConfig, TransactionFetcher, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE,
};
pub use types::{coerce_number, FetchOutcome, PageCursor, Transaction, TransactionPage, Valuation};

use crate::error::HttpError;
use async_trait::async_trait;

/// Swap actions included in a fetch
pub const SWAP_ACTIONS: &str = "SWAP_PT,SWAP_PY,SWAP_YT";

/// Transaction origins included in a fetch
pub const SWAP_ORIGINS: &str = "PENDLE_MARKET,YT";

/// Parameters for one page request
#[derive(Debug, Clone)]
pub struct PageRequest<'a> {
    pub chain_id: u64,
    pub market: &'a str,
    pub limit: u64,
    pub cursor: PageCursor,
}

/// Trait for anything that can serve pages of market transactions
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Fetch a single page
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<TransactionPage, HttpError>;
}

#[async_trait]
impl<T: TransactionSource + ?Sized> TransactionSource for std::sync::Arc<T> {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<TransactionPage, HttpError> {
        (**self).fetch_page(request).await
    }
}
