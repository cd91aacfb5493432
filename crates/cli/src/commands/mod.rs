//! Command implementations, grouped by what they read.

pub mod analyze;
pub mod assets;
pub mod supply;
pub mod transactions;

use std::time::Duration;

use clap::ValueEnum;
use nftledger_client::{AccountTransactions, LedgerClient, OwnedTokenFilter, OwnedTokens};
use nftledger_config::Settings;
use nftledger_core::{CursorStrategy, Executor, FetchOptions, FetchOutcome, Fetcher, Transaction};
use nftledger_io::ReportWriter;
use nftledger_recon::WalletAsset;
use tracing::{info, warn};

use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CursorArg {
    /// offset += page length
    Offset,
    /// start after the last version seen
    Version,
}

impl From<CursorArg> for CursorStrategy {
    fn from(arg: CursorArg) -> Self {
        match arg {
            CursorArg::Offset => CursorStrategy::Offset,
            CursorArg::Version => CursorStrategy::AfterVersion,
        }
    }
}

/// Everything a command needs, built once from resolved settings.
pub struct Context {
    pub settings: Settings,
    pub reports: ReportWriter,
}

impl Context {
    pub fn new(settings: Settings) -> Result<Self, CliError> {
        let reports = ReportWriter::new(&settings.output_dir).map_err(CliError::file)?;
        Ok(Self { settings, reports })
    }

    pub fn client(&self) -> Result<LedgerClient, CliError> {
        let client = LedgerClient::new(&self.settings).map_err(CliError::client)?;
        info!(network = %self.settings.network, node = client.node_url(), "connected");
        Ok(client)
    }

    pub fn fetch_options(&self, strategy: Option<CursorStrategy>) -> FetchOptions {
        FetchOptions {
            page_size: self.settings.page_size,
            strategy,
            inter_page_delay: Duration::from_millis(self.settings.inter_page_delay_ms),
        }
    }

    pub fn executor(&self) -> Result<Executor, CliError> {
        executor(self.settings.concurrency)
    }

    /// Executors for scanning many collections: one admitting collections,
    /// one per collection for asset lookups. Together they stay within
    /// `concurrency` lookups in flight.
    pub fn collection_executors(&self) -> Result<(Executor, Executor), CliError> {
        let (outer, inner) =
            split_concurrency(self.settings.concurrency, self.settings.collection_concurrency);
        Ok((executor(outer)?, executor(inner)?))
    }
}

fn executor(limit: usize) -> Result<Executor, CliError> {
    Executor::new(limit).map_err(|e| CliError::general(e.to_string()))
}

/// `(collections at once, lookups per collection)` with a product no larger
/// than `total` (both at least 1).
fn split_concurrency(total: usize, collections: usize) -> (usize, usize) {
    let outer = collections.min(total).max(1);
    (outer, (total / outer).max(1))
}

// ── Shared fetch pipelines ──────────────────────────────────────────

pub async fn fetch_transactions(
    ctx: &Context,
    client: &LedgerClient,
    address: &str,
    strategy: CursorStrategy,
) -> Result<FetchOutcome<Transaction>, CliError> {
    let source = AccountTransactions::new(client, address);
    let outcome = Fetcher::new(ctx.fetch_options(Some(strategy)))
        .fetch_all(&source)
        .await
        .map_err(CliError::fetch)?;
    info!(
        address,
        transactions = outcome.records.len(),
        requests = outcome.requests(),
        "history fetched"
    );
    Ok(outcome)
}

/// Every token `owner` holds (optionally in one collection), each enriched
/// with its asset data under `exec`. Per-asset lookup failures stay on the
/// asset.
pub async fn fetch_wallet_assets(
    ctx: &Context,
    client: &LedgerClient,
    exec: Executor,
    owner: &str,
    collection: Option<&str>,
) -> Result<Vec<WalletAsset>, CliError> {
    let mut filter = OwnedTokenFilter::owner(owner);
    if let Some(c) = collection {
        filter = filter.in_collection(c);
    }

    let source = OwnedTokens::new(client, filter);
    let owned = Fetcher::new(ctx.fetch_options(None))
        .fetch_all(&source)
        .await
        .map_err(CliError::fetch)?
        .into_records();
    info!(owner, tokens = owned.len(), "holdings fetched");

    let enriched = exec
        .run(owned, |token| {
            let id = token.token_id.clone();
            async move { client.digital_asset(&id).await }
        })
        .await;

    let assets: Vec<WalletAsset> = enriched.into_iter().map(WalletAsset::from).collect();
    let failed = assets.iter().filter(|a| a.error.is_some()).count();
    if failed > 0 {
        warn!(owner, failed, "asset data lookups failed");
    }
    Ok(assets)
}

/// First `n` characters of an address or hash, for file names and output.
pub fn short(id: &str, n: usize) -> &str {
    let end = id.char_indices().nth(n).map(|(i, _)| i).unwrap_or(id.len());
    &id[..end]
}
