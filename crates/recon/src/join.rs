use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::model::{MetadataJoin, MetadataRow, WalletAsset};

/// Bare content hash from an IPFS URI, if the URI is one.
///
/// Accepts `ipfs://<hash>` and any HTTP gateway form `http(s)://<host>/ipfs/<hash>`.
pub fn ipfs_hash(uri: &str) -> Option<&str> {
    let uri = uri.trim();
    let hash = if let Some(rest) = uri.strip_prefix("ipfs://") {
        rest
    } else if uri.starts_with("https://") || uri.starts_with("http://") {
        let at = uri.find("/ipfs/")?;
        &uri[at + "/ipfs/".len()..]
    } else {
        return None;
    };
    (!hash.is_empty()).then_some(hash)
}

/// Metadata table rows keyed by the IPFS hash found in one of their columns.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    by_hash: HashMap<String, MetadataRow>,
}

impl MetadataIndex {
    /// Index rows by the hash in `uri_column`. Rows without a recognizable
    /// hash are skipped; a later row with the same hash replaces an earlier one.
    pub fn build<I>(rows: I, uri_column: &str) -> Self
    where
        I: IntoIterator<Item = MetadataRow>,
    {
        let mut by_hash = HashMap::new();
        for row in rows {
            let Some(hash) = row.get(uri_column).and_then(|u| ipfs_hash(u)) else {
                continue;
            };
            by_hash.insert(hash.to_string(), row);
        }
        Self { by_hash }
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub fn lookup(&self, uri: &str) -> Option<&MetadataRow> {
        self.by_hash.get(ipfs_hash(uri)?)
    }
}

/// Attach metadata rows to assets by the hash of their token URI.
pub fn join_metadata(
    assets: &[WalletAsset],
    index: &MetadataIndex,
) -> Result<MetadataJoin, serde_json::Error> {
    let mut out = Vec::with_capacity(assets.len());
    let mut matched = 0;

    for asset in assets {
        let row = asset.uri().and_then(|u| index.lookup(u));
        let value = match row {
            Some(row) => {
                matched += 1;
                let mut obj: Map<String, Value> =
                    row.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect();
                if let Some(data) = &asset.digital_asset_data {
                    for (k, v) in &data.token_properties {
                        obj.insert(k.clone(), v.clone());
                    }
                }
                obj.insert("tokenId".into(), Value::String(asset.token_id.clone()));
                obj.insert("_matched".into(), Value::Bool(true));
                Value::Object(obj)
            }
            None => {
                let mut value = serde_json::to_value(asset)?;
                if let Value::Object(obj) = &mut value {
                    obj.insert("_matched".into(), Value::Bool(false));
                }
                value
            }
        };
        out.push(value);
    }

    Ok(MetadataJoin {
        total_assets: assets.len(),
        matched,
        unmatched: assets.len() - matched,
        assets: out,
    })
}
