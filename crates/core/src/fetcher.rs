//! Paginated fetch-all over a bounded-page remote listing.
//!
//! The remote never reports a total up front. A page shorter than the
//! requested limit (including an empty page) is the only exhaustion signal,
//! so a listing whose size is an exact multiple of the page size costs one
//! trailing empty request.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::cursor::{CursorError, CursorStrategy, FetchCursor};
use crate::record::Record;

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A remote listing that can be read one bounded page at a time.
pub trait PageSource {
    type Item: Record;
    type Error: std::error::Error;

    /// Whether the endpoint accepts this cursor kind.
    fn supports(&self, strategy: CursorStrategy) -> bool;

    /// Strategy used when the caller does not pick one.
    fn preferred_strategy(&self) -> CursorStrategy {
        CursorStrategy::Offset
    }

    /// Fetch at most `limit` records starting at `cursor`, in server order.
    fn fetch_page(
        &self,
        cursor: &FetchCursor,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Self::Item>, Self::Error>>;
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub page_size: u32,
    /// `None` = the source's preferred strategy.
    pub strategy: Option<CursorStrategy>,
    /// Pause between consecutive page requests.
    pub inter_page_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            strategy: None,
            inter_page_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug)]
pub enum FetchError<E> {
    /// Page size of zero can never signal exhaustion.
    InvalidPageSize,
    /// The source cannot page with the requested cursor kind.
    UnsupportedCursor(CursorStrategy),
    /// A page request failed. Records accumulated so far are discarded.
    Page { page: u32, fetched: usize, source: E },
    /// The cursor could not be advanced past a full page.
    Cursor { page: u32, fetched: usize, source: CursorError },
}

impl<E: fmt::Display> fmt::Display for FetchError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPageSize => write!(f, "page size must be at least 1"),
            Self::UnsupportedCursor(s) => write!(f, "endpoint does not support {s} pagination"),
            Self::Page { page, fetched, source } => write!(
                f,
                "page {page} failed after {fetched} records (incomplete, discarded): {source}"
            ),
            Self::Cursor { page, fetched, source } => {
                write!(f, "page {page} after {fetched} records: {source}")
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for FetchError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Page { source, .. } => Some(source),
            Self::Cursor { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Complete, exhaustive result of one fetch-all run.
#[derive(Debug, Clone)]
pub struct FetchOutcome<R> {
    /// Records in server order (page order, then in-page order).
    pub records: Vec<R>,
    /// Length of each page received, in request order.
    pub page_sizes: Vec<usize>,
    pub strategy: CursorStrategy,
}

impl<R> FetchOutcome<R> {
    /// Number of page requests issued.
    pub fn requests(&self) -> usize {
        self.page_sizes.len()
    }

    /// Records regrouped into the pages they arrived in.
    pub fn pages(&self) -> impl Iterator<Item = &[R]> {
        let mut start = 0;
        self.page_sizes.iter().map(move |&len| {
            let page = &self.records[start..start + len];
            start += len;
            page
        })
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    options: FetchOptions,
}

impl Fetcher {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }

    /// Pull every page from `source` until a short page arrives.
    pub async fn fetch_all<S: PageSource>(
        &self,
        source: &S,
    ) -> Result<FetchOutcome<S::Item>, FetchError<S::Error>> {
        let page_size = self.options.page_size;
        if page_size == 0 {
            return Err(FetchError::InvalidPageSize);
        }

        let strategy = self.options.strategy.unwrap_or_else(|| source.preferred_strategy());
        if !source.supports(strategy) {
            return Err(FetchError::UnsupportedCursor(strategy));
        }

        let mut cursor = FetchCursor::start(strategy);
        let mut records = Vec::new();
        let mut page_sizes = Vec::new();

        loop {
            let page_no = page_sizes.len() as u32 + 1;
            debug!(page = page_no, %cursor, limit = page_size, "fetching page");

            let page = source
                .fetch_page(&cursor, page_size)
                .await
                .map_err(|source| FetchError::Page { page: page_no, fetched: records.len(), source })?;

            let len = page.len();
            debug!(page = page_no, records = len, total = records.len() + len, "page received");

            let exhausted = len < page_size as usize;
            if !exhausted {
                cursor = cursor.advance(&page).map_err(|source| FetchError::Cursor {
                    page: page_no,
                    fetched: records.len(),
                    source,
                })?;
            }

            records.extend(page);
            page_sizes.push(len);

            if exhausted {
                break;
            }

            if !self.options.inter_page_delay.is_zero() {
                tokio::time::sleep(self.options.inter_page_delay).await;
            }
        }

        debug!(pages = page_sizes.len(), records = records.len(), "fetch complete");

        Ok(FetchOutcome { records, page_sizes, strategy })
    }
}
