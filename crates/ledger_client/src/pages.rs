//! `PageSource` adapters for the paginated endpoints.

use nftledger_core::{CursorStrategy, FetchCursor, OwnedToken, PageSource, Transaction};

use crate::client::LedgerClient;
use crate::error::ClientError;
use crate::indexer::OwnedTokenFilter;

/// An account's transaction history. Accepts both cursor kinds; both map
/// onto the node's `start` parameter.
pub struct AccountTransactions<'a> {
    client: &'a LedgerClient,
    address: String,
}

impl<'a> AccountTransactions<'a> {
    pub fn new(client: &'a LedgerClient, address: impl Into<String>) -> Self {
        Self { client, address: address.into() }
    }
}

impl PageSource for AccountTransactions<'_> {
    type Item = Transaction;
    type Error = ClientError;

    fn supports(&self, _strategy: CursorStrategy) -> bool {
        true
    }

    async fn fetch_page(&self, cursor: &FetchCursor, limit: u32) -> Result<Vec<Transaction>, ClientError> {
        self.client
            .account_transactions(&self.address, cursor.position(), limit)
            .await
    }
}

/// Current holdings of one owner. Offset-only.
pub struct OwnedTokens<'a> {
    client: &'a LedgerClient,
    filter: OwnedTokenFilter,
}

impl<'a> OwnedTokens<'a> {
    pub fn new(client: &'a LedgerClient, filter: OwnedTokenFilter) -> Self {
        Self { client, filter }
    }
}

impl PageSource for OwnedTokens<'_> {
    type Item = OwnedToken;
    type Error = ClientError;

    fn supports(&self, strategy: CursorStrategy) -> bool {
        strategy == CursorStrategy::Offset
    }

    async fn fetch_page(&self, cursor: &FetchCursor, limit: u32) -> Result<Vec<OwnedToken>, ClientError> {
        let offset = cursor.position().unwrap_or(0);
        self.client.owned_tokens(&self.filter, limit, offset).await
    }
}
