// Runtime settings
// Resolved as: defaults -> config.toml -> environment -> command-line flags

use std::fs;
use std::path::{Path, PathBuf};

use nftledger_core::{BURN_ADDRESS, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::network::Network;

pub const ENV_NETWORK: &str = "NETWORK";
pub const ENV_API_KEY: &str = "APTOS_API_KEY";
pub const ENV_NODE_URL: &str = "APTOS_NODE_URL";
pub const ENV_INDEXER_URL: &str = "APTOS_INDEXER_URL";
pub const ENV_OUTPUT_DIR: &str = "NFTLEDGER_OUTPUT_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub network: Network,

    /// Overrides the network's node REST base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_url: Option<String>,

    /// Overrides the network's indexer GraphQL URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexer_url: Option<String>,

    /// Sent as a bearer token. Never written back to disk.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Records per page request.
    pub page_size: u32,

    /// Max enrichment calls in flight.
    pub concurrency: usize,

    /// Collections `bulk-assets` scans at once. Shares the `concurrency`
    /// budget, never widens it.
    pub collection_concurrency: usize,

    /// Pause between page requests, milliseconds.
    pub inter_page_delay_ms: u64,

    /// Retries per HTTP request on 429 / 5xx / network errors. 0 = none.
    pub max_retries: u32,

    pub retry_base_delay_ms: u64,

    /// Per-request timeout, seconds.
    pub timeout_secs: u64,

    pub burn_address: String,

    /// Where reports are written.
    pub output_dir: PathBuf,

    /// Metadata CSV column holding each row's IPFS URI.
    pub metadata_uri_column: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: Network::default(),
            node_url: None,
            indexer_url: None,
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: 10,
            collection_concurrency: 5,
            inter_page_delay_ms: 100,
            max_retries: 0,
            retry_base_delay_ms: 500,
            timeout_secs: 30,
            burn_address: BURN_ADDRESS.to_string(),
            output_dir: PathBuf::from("."),
            metadata_uri_column: "newMetadataIpfsHash".to_string(),
        }
    }
}

impl Settings {
    /// `<config_dir>/nftledger/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("nftledger").join("config.toml"))
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse { path: None, message: e.to_string() })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })
    }

    /// Load from an explicit path (must exist), else from the default path
    /// if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Apply environment overrides. `lookup` is `std::env::var(..).ok()` in
    /// production and a map in tests. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_NETWORK) {
            self.network = v.parse()?;
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = get(ENV_NODE_URL) {
            self.node_url = Some(v);
        }
        if let Some(v) = get(ENV_INDEXER_URL) {
            self.indexer_url = Some(v);
        }
        if let Some(v) = get(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(v);
        }
        Ok(())
    }

    pub fn node_url(&self) -> &str {
        self.node_url.as_deref().unwrap_or_else(|| self.network.node_url())
    }

    pub fn indexer_url(&self) -> &str {
        self.indexer_url.as_deref().unwrap_or_else(|| self.network.indexer_url())
    }

    /// Reject settings no command can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(invalid("page_size", "must be at least 1"));
        }
        if self.concurrency == 0 {
            return Err(invalid("concurrency", "must be at least 1"));
        }
        if self.collection_concurrency == 0 {
            return Err(invalid("collection_concurrency", "must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be at least 1"));
        }
        check_url("node_url", self.node_url())?;
        check_url("indexer_url", self.indexer_url())?;
        if !is_address(&self.burn_address) {
            return Err(invalid("burn_address", "expected a 0x-prefixed hex address"));
        }
        if self.metadata_uri_column.trim().is_empty() {
            return Err(invalid("metadata_uri_column", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::Invalid { field, message: message.to_string() }
}

fn check_url(field: &'static str, url: &str) -> Result<(), ConfigError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| invalid(field, &format!("'{url}' is not an http(s) URL")))?;
    let host = rest.split('/').next().unwrap_or("");
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(invalid(field, &format!("'{url}' has no host")));
    }
    Ok(())
}

fn is_address(s: &str) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|hex| !hex.is_empty() && hex.len() <= 64 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
