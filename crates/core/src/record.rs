//! Fixed record shapes and the normalization step that builds them.
//!
//! Upstream payloads are loosely typed: numbers arrive as strings, the same
//! identifier hides under several keys depending on the endpoint. Everything
//! is mapped onto the structs below once, right after fetch, so nothing
//! downstream branches on upstream schema variance.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property key holding the edition serial on minted assets.
pub const SERIAL_PROPERTY: &str = "Serial Number";

/// Canonical burn sink: the all-ones account address.
pub const BURN_ADDRESS: &str = "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

/// A unit of remote data the fetcher can page over.
pub trait Record {
    /// Identifier used for reconciliation (hash, address, token id).
    fn id(&self) -> &str;

    /// Ledger version, when the record carries one.
    fn version(&self) -> Option<u64>;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Payload was not a JSON object.
    NotAnObject { record: &'static str },
    /// Required field absent or null.
    MissingField { record: &'static str, field: &'static str },
    /// Field present but not in the expected shape.
    InvalidField { record: &'static str, field: &'static str, value: String },
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { record } => write!(f, "{record}: payload is not a JSON object"),
            Self::MissingField { record, field } => write!(f, "{record}: missing field '{field}'"),
            Self::InvalidField { record, field, value } => {
                write!(f, "{record}: invalid value for '{field}': {value}")
            }
        }
    }
}

impl std::error::Error for NormalizeError {}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn as_object<'a>(value: &'a Value, record: &'static str) -> Result<&'a Map<String, Value>, NormalizeError> {
    value.as_object().ok_or(NormalizeError::NotAnObject { record })
}

fn opt_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numbers arrive either as JSON numbers or as decimal strings ("12345").
fn opt_u64(
    value: &Value,
    key: &'static str,
    record: &'static str,
) -> Result<Option<u64>, NormalizeError> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| NormalizeError::InvalidField {
            record,
            field: key,
            value: n.to_string(),
        }),
        Some(Value::String(s)) => s.trim().parse::<u64>().map(Some).map_err(|_| {
            NormalizeError::InvalidField { record, field: key, value: s.clone() }
        }),
        Some(other) => Err(NormalizeError::InvalidField { record, field: key, value: other.to_string() }),
    }
}

/// First non-empty string found under `keys`, in order.
fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| opt_str(value, k))
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// One event emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

/// A committed transaction as returned by the node REST API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub version: u64,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_status: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    pub arguments: Vec<Value>,
    pub type_arguments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    pub events: Vec<TxEvent>,
}

impl Transaction {
    pub fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        const R: &str = "transaction";
        as_object(value, R)?;

        let version = opt_u64(value, "version", R)?
            .ok_or(NormalizeError::MissingField { record: R, field: "version" })?;
        let hash = opt_str(value, "hash").ok_or(NormalizeError::MissingField { record: R, field: "hash" })?;

        let payload = value.get("payload").cloned().unwrap_or(Value::Null);
        let function = opt_str(&payload, "function");
        let arguments = payload
            .get("arguments")
            .or_else(|| payload.get("function_arguments"))
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let type_arguments = payload
            .get("type_arguments")
            .and_then(|v| v.as_array())
            .map(|a| a.iter().filter_map(|t| t.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        let events = value
            .get("events")
            .and_then(|v| v.as_array())
            .map(|evs| {
                evs.iter()
                    .map(|e| TxEvent {
                        kind: opt_str(e, "type").unwrap_or_default(),
                        data: e.get("data").cloned().unwrap_or(Value::Null),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            version,
            hash,
            timestamp: opt_str(value, "timestamp"),
            success: value.get("success").and_then(|v| v.as_bool()).unwrap_or(false),
            vm_status: opt_str(value, "vm_status"),
            kind: opt_str(value, "type").unwrap_or_else(|| "unknown".to_string()),
            function,
            arguments,
            type_arguments,
            gas_used: opt_u64(value, "gas_used", R)?,
            events,
        })
    }

    /// True when the entry function name contains `needle` (e.g. `mint_for`).
    pub fn calls(&self, needle: &str) -> bool {
        self.function.as_deref().is_some_and(|f| f.contains(needle))
    }

    pub fn simplify(&self) -> SimplifiedTransaction {
        SimplifiedTransaction {
            version: self.version.to_string(),
            hash: self.hash.clone(),
            timestamp: self.timestamp.clone(),
            success: self.success,
            function: self.function.clone(),
            arguments: self.arguments.clone(),
            type_arguments: self.type_arguments.clone(),
            gas_used: self.gas_used.map(|g| g.to_string()),
            vm_status: self.vm_status.clone(),
        }
    }
}

impl Record for Transaction {
    fn id(&self) -> &str {
        &self.hash
    }

    fn version(&self) -> Option<u64> {
        Some(self.version)
    }
}

/// Snapshot shape written to `mint-for-page-*.json` files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedTransaction {
    pub version: String,
    pub hash: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub arguments: Vec<Value>,
    #[serde(default)]
    pub type_arguments: Vec<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
    #[serde(default)]
    pub vm_status: Option<String>,
}

// ---------------------------------------------------------------------------
// Event extraction
// ---------------------------------------------------------------------------

/// A token referenced by a mint-like or token-like event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventToken {
    pub token_id: String,
    pub collection: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub event_type: String,
    pub event_data: Value,
}

/// A token moving to a new owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTransfer {
    pub token_id: String,
    pub to: String,
}

impl TxEvent {
    fn type_mentions(&self, word: &str) -> bool {
        let lower = self.kind.to_ascii_lowercase();
        lower.contains(word)
    }

    /// Token minted (or otherwise referenced) by this event.
    pub fn minted_token(&self) -> Option<EventToken> {
        if !(self.type_mentions("mint") || self.type_mentions("token")) {
            return None;
        }
        let token_id = first_str(&self.data, &["token", "token_id", "id"])?;
        Some(EventToken {
            token_id,
            collection: first_str(&self.data, &["collection", "collection_name"])
                .unwrap_or_else(|| "Unknown".to_string()),
            name: first_str(&self.data, &["name", "token_name"]).unwrap_or_else(|| "Unknown".to_string()),
            description: opt_str(&self.data, "description"),
            uri: first_str(&self.data, &["uri", "token_uri"]),
            event_type: self.kind.clone(),
            event_data: self.data.clone(),
        })
    }

    /// Ownership transfer described by this event.
    pub fn transfer(&self) -> Option<EventTransfer> {
        if !self.type_mentions("transfer") {
            return None;
        }
        let token_id = first_str(&self.data, &["token", "object", "token_id", "id"])?;
        let to = opt_str(&self.data, "to")?;
        Some(EventTransfer { token_id, to })
    }
}

// ---------------------------------------------------------------------------
// Owned tokens
// ---------------------------------------------------------------------------

/// One token held by an account, from the indexer ownership table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedToken {
    pub token_id: String,
    pub token_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    pub amount: u64,
}

impl OwnedToken {
    pub fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        const R: &str = "owned token";
        as_object(value, R)?;

        let data = value.get("current_token_data").cloned().unwrap_or(Value::Null);
        let token_id = opt_str(value, "token_data_id")
            .or_else(|| opt_str(&data, "token_data_id"))
            .ok_or(NormalizeError::MissingField { record: R, field: "token_data_id" })?;

        let collection_id = opt_str(&data, "collection_id").or_else(|| {
            data.get("current_collection").and_then(|c| opt_str(c, "collection_id"))
        });

        Ok(Self {
            token_id,
            token_name: opt_str(&data, "token_name").unwrap_or_else(|| "Unknown".to_string()),
            token_uri: opt_str(&data, "token_uri"),
            collection_id,
            amount: opt_u64(value, "amount", R)?.unwrap_or(1),
        })
    }
}

impl Record for OwnedToken {
    fn id(&self) -> &str {
        &self.token_id
    }

    fn version(&self) -> Option<u64> {
        None
    }
}

// ---------------------------------------------------------------------------
// Asset + collection metadata
// ---------------------------------------------------------------------------

/// Descriptive data for a single digital asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetData {
    pub token_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_standard: Option<String>,
    pub token_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_property_version_v1: Option<u64>,
    pub token_properties: Map<String, Value>,
}

impl AssetData {
    pub fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        const R: &str = "digital asset";
        as_object(value, R)?;

        let token_id = opt_str(value, "token_data_id")
            .ok_or(NormalizeError::MissingField { record: R, field: "token_data_id" })?;

        Ok(Self {
            token_id,
            token_standard: opt_str(value, "token_standard"),
            token_name: opt_str(value, "token_name").unwrap_or_else(|| "Unknown".to_string()),
            token_uri: opt_str(value, "token_uri"),
            description: opt_str(value, "description"),
            collection_id: opt_str(value, "collection_id"),
            supply: opt_u64(value, "supply", R)?,
            maximum: opt_u64(value, "maximum", R)?,
            largest_property_version_v1: opt_u64(value, "largest_property_version_v1", R)?,
            token_properties: value
                .get("token_properties")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Edition serial from the token properties, if present and numeric.
    pub fn serial_number(&self) -> Option<u64> {
        match self.token_properties.get(SERIAL_PROPERTY)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Collection-level counters from the indexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
    pub collection_id: String,
    pub collection_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_address: Option<String>,
    pub total_minted: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_supply: Option<u64>,
}

impl CollectionData {
    pub fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        const R: &str = "collection";
        as_object(value, R)?;

        Ok(Self {
            collection_id: opt_str(value, "collection_id")
                .ok_or(NormalizeError::MissingField { record: R, field: "collection_id" })?,
            collection_name: opt_str(value, "collection_name").unwrap_or_default(),
            creator_address: opt_str(value, "creator_address"),
            total_minted: opt_u64(value, "total_minted_v2", R)?.unwrap_or(0),
            current_supply: opt_u64(value, "current_supply", R)?,
        })
    }
}
