//! `nftledger-recon`: reconciliation and report derivations.
//!
//! Pure engine crate: receives already-fetched, already-normalized records
//! and returns derived reports. No network, no filesystem.
//!
//! Callers must tell "fetch failed" apart from "fetch returned nothing"
//! before reconciling. An empty input set here is taken at face value.

pub mod grouping;
pub mod join;
pub mod model;
pub mod serials;
pub mod sets;
pub mod summary;
pub mod supply;

pub use grouping::{group_transfers, top_by_count};
pub use join::{ipfs_hash, join_metadata, MetadataIndex};
pub use model::{
    AddressTokens, MetadataJoin, MetadataRow, ReconciliationReport, SerialCheck,
    SerialCheckSummary, SerialRequest, SerialStatus, SupplyReport, TransactionAnalysis,
    TransactionSummary, WalletAsset,
};
pub use serials::{check_serials, holdings_keys, sorted_serials, summarize_checks, Holdings, HoldingsKey};
pub use sets::reconcile;
pub use summary::{analyze_transaction, summarize_transactions};
