//! `nftledger-core`: the reusable fetch / enrich pipeline.
//!
//! Pure library crate: no HTTP, no filesystem. Remote collaborators plug in
//! through [`PageSource`] and through the async enrichment closures handed
//! to [`Executor::run`].

pub mod cursor;
pub mod executor;
pub mod fallback;
pub mod fetcher;
pub mod record;

pub use cursor::{CursorError, CursorStrategy, FetchCursor};
pub use executor::{Enriched, EnrichmentResult, Executor, ExecutorError};
pub use fallback::{FallbackChain, FallbackError};
pub use fetcher::{FetchError, FetchOptions, FetchOutcome, Fetcher, PageSource, DEFAULT_PAGE_SIZE};
pub use record::{
    AssetData, CollectionData, EventToken, EventTransfer, NormalizeError, OwnedToken, Record,
    SimplifiedTransaction, Transaction, TxEvent, BURN_ADDRESS,
};
