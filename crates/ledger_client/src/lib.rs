//! Ledger API client: the remote side of every fetch.
//!
//! This crate owns the wire contract with the node REST API and the indexer
//! GraphQL API. Every payload is normalized into `nftledger_core` records
//! before it leaves here.
//!
//! Async (tokio), one `reqwest::Client` per process. Retries only when
//! `max_retries` is configured above zero.

mod client;
mod error;
mod indexer;
mod node;
mod pages;

pub use client::{LedgerClient, USER_AGENT};
pub use error::ClientError;
pub use indexer::OwnedTokenFilter;
pub use node::{AccountBalance, APT_COIN, OCTAS_PER_APT};
pub use pages::{AccountTransactions, OwnedTokens};
