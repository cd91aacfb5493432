// JSON inputs: snapshot pages, collection lists, transfer files

use std::fs;
use std::path::{Path, PathBuf};

use nftledger_core::EventTransfer;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::IoError;

/// Filename prefix of per-page snapshot files.
pub const SNAPSHOT_PREFIX: &str = "mint-for-page-";

/// One entry of a collections list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub address: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotHashes {
    pub files: usize,
    /// In file order, then in-file order. May repeat across files.
    pub hashes: Vec<String>,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let contents = fs::read_to_string(path).map_err(|e| IoError::read(path, e))?;
    serde_json::from_str(&contents).map_err(|e| IoError::parse(path, e))
}

/// `*.json` files in `dir` whose name starts with `prefix`, sorted by name.
pub fn list_json_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, IoError> {
    let entries = fs::read_dir(dir).map_err(|e| IoError::read(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IoError::read(dir, e))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(prefix) && name.ends_with(".json") && entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Hashes from every snapshot page file in `dir`.
///
/// Each file is a JSON array of transaction objects; entries without a
/// `hash` string are ignored. A file that is not an array is a data error.
pub fn read_snapshot_hashes(dir: &Path) -> Result<SnapshotHashes, IoError> {
    let files = list_json_files(dir, SNAPSHOT_PREFIX)?;
    let mut hashes = Vec::new();

    for path in &files {
        let value: Value = read_json(path)?;
        let Value::Array(items) = value else {
            return Err(IoError::schema(path, "expected a JSON array of transactions"));
        };
        let before = hashes.len();
        hashes.extend(
            items
                .iter()
                .filter_map(|tx| tx.get("hash").and_then(Value::as_str))
                .map(str::to_string),
        );
        debug!(file = %path.display(), hashes = hashes.len() - before, "snapshot page read");
    }

    Ok(SnapshotHashes { files: files.len(), hashes })
}

/// Collections list: `[{ "address": "0x..", "name": ".." }, ...]`.
pub fn read_collections(path: &Path) -> Result<Vec<CollectionEntry>, IoError> {
    let entries: Vec<CollectionEntry> = read_json(path)?;
    if let Some(i) = entries.iter().position(|c| c.address.trim().is_empty()) {
        return Err(IoError::schema(path, format!("entry {i} has an empty address")));
    }
    Ok(entries)
}

/// All transfers from the `*.json` files in `dir`, file by file in name order.
pub fn read_transfer_dir(dir: &Path) -> Result<(usize, Vec<EventTransfer>), IoError> {
    let files = list_json_files(dir, "")?;
    let mut transfers = Vec::new();
    for path in &files {
        let batch: Vec<EventTransfer> = read_json(path)?;
        debug!(file = %path.display(), transfers = batch.len(), "transfer file read");
        transfers.extend(batch);
    }
    Ok((files.len(), transfers))
}
