use std::collections::BTreeMap;

use nftledger_core::{AssetData, Enriched, EnrichmentResult, EventToken, EventTransfer, OwnedToken};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Set reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Distinct identifiers in the first input.
    pub first_count: usize,
    /// Distinct identifiers in the second input.
    pub second_count: usize,
    pub in_both: usize,
    pub only_in_first: Vec<String>,
    pub only_in_second: Vec<String>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Supply accounting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyReport {
    pub total_supply: u64,
    /// Distinct token ids held by the burn address.
    pub burned_tokens: u64,
    /// `total_supply - burned_tokens`. Negative when upstream data is
    /// inconsistent; reported as-is.
    pub circulating_supply: i64,
    /// `None` when nothing was minted.
    pub burn_percentage: Option<f64>,
}

// ---------------------------------------------------------------------------
// Wallet assets
// ---------------------------------------------------------------------------

/// An owned token with its detail lookup outcome attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAsset {
    pub token_id: String,
    pub token_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_asset_data: Option<AssetData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WalletAsset {
    pub fn new(token: &OwnedToken) -> Self {
        Self {
            token_id: token.token_id.clone(),
            token_name: token.token_name.clone(),
            collection_address: token.collection_id.clone(),
            token_uri: token.token_uri.clone(),
            digital_asset_data: None,
            error: None,
        }
    }

    /// URI from the detail lookup when present, else from the ownership row.
    pub fn uri(&self) -> Option<&str> {
        self.digital_asset_data
            .as_ref()
            .and_then(|d| d.token_uri.as_deref())
            .or(self.token_uri.as_deref())
    }

    pub fn serial_number(&self) -> Option<u64> {
        self.digital_asset_data.as_ref().and_then(AssetData::serial_number)
    }
}

impl From<Enriched<OwnedToken, AssetData>> for WalletAsset {
    fn from(e: Enriched<OwnedToken, AssetData>) -> Self {
        let mut asset = WalletAsset::new(&e.record);
        match e.outcome {
            EnrichmentResult::Enriched(data) => asset.digital_asset_data = Some(data),
            EnrichmentResult::Failed { error } => asset.error = Some(error),
        }
        asset
    }
}

// ---------------------------------------------------------------------------
// Serial checks
// ---------------------------------------------------------------------------

/// One row of a serials-to-check list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialRequest {
    pub user_address: String,
    pub collection_name: String,
    pub collection_address: String,
    pub serial_number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialStatus {
    Found,
    NotFound,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialCheck {
    #[serde(flatten)]
    pub request: SerialRequest,
    pub has_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SerialCheck {
    pub fn status(&self) -> SerialStatus {
        if self.error.is_some() {
            SerialStatus::Error
        } else if self.has_token {
            SerialStatus::Found
        } else {
            SerialStatus::NotFound
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialCheckSummary {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    pub errors: usize,
}

// ---------------------------------------------------------------------------
// Metadata join
// ---------------------------------------------------------------------------

/// One metadata table row, column name -> value.
pub type MetadataRow = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataJoin {
    pub total_assets: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Matched assets are metadata columns overlaid with token properties;
    /// unmatched ones are the plain asset. Both carry `_matched`.
    pub assets: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Transfer grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressTokens {
    pub address: String,
    pub token_count: usize,
    /// Distinct, in first-seen order.
    pub tokens: Vec<String>,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Percent; `None` for an empty history.
    pub success_rate: Option<f64>,
    pub by_type: BTreeMap<String, usize>,
    pub by_function: BTreeMap<String, usize>,
    pub first_versions: Vec<u64>,
    pub last_versions: Vec<u64>,
}

/// What a single transaction did to tokens, read from its events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAnalysis {
    pub transaction_hash: String,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub success: bool,
    pub event_types: Vec<String>,
    pub tokens: Vec<EventToken>,
    pub transfers: Vec<EventTransfer>,
}
