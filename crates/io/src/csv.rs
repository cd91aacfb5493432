// CSV inputs: hash lists, metadata tables, serials-to-check lists

use std::fs::File;
use std::path::Path;

use nftledger_recon::{MetadataRow, SerialRequest};
use tracing::debug;

use crate::error::IoError;

const SERIAL_COLUMNS: [&str; 4] = ["user_address", "collection_name", "collection_address", "serial_number"];

fn reader(path: &Path, flexible: bool) -> Result<csv::Reader<File>, IoError> {
    let file = File::open(path).map_err(|e| IoError::read(path, e))?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(flexible)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn headers(rdr: &mut csv::Reader<File>, path: &Path) -> Result<Vec<String>, IoError> {
    Ok(rdr
        .headers()
        .map_err(|e| IoError::parse(path, e))?
        .iter()
        .map(str::to_string)
        .collect())
}

/// Transaction hashes from the first column of a CSV export.
///
/// The header row is skipped, as is any first-column value that is not a
/// `0x` hash (totals, blank rows).
pub fn read_hash_list(path: &Path) -> Result<Vec<String>, IoError> {
    let mut rdr = reader(path, true)?;
    let mut hashes = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| IoError::parse(path, e))?;
        if let Some(first) = record.get(0) {
            if first.starts_with("0x") {
                hashes.push(first.to_string());
            }
        }
    }
    debug!(path = %path.display(), hashes = hashes.len(), "hash list loaded");
    Ok(hashes)
}

/// Metadata table rows keyed by column name. `uri_column` must be present.
pub fn read_metadata_table(path: &Path, uri_column: &str) -> Result<Vec<MetadataRow>, IoError> {
    let mut rdr = reader(path, false)?;
    let columns = headers(&mut rdr, path)?;
    if !columns.iter().any(|c| c == uri_column) {
        return Err(IoError::schema(path, format!("missing column '{uri_column}'")));
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| IoError::parse(path, e))?;
        let row: MetadataRow = columns
            .iter()
            .zip(record.iter())
            .map(|(c, v)| (c.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }
    debug!(path = %path.display(), rows = rows.len(), "metadata table loaded");
    Ok(rows)
}

/// Rows of `user_address, collection_name, collection_address, serial_number`.
pub fn read_serial_requests(path: &Path) -> Result<Vec<SerialRequest>, IoError> {
    let mut rdr = reader(path, false)?;
    let columns = headers(&mut rdr, path)?;
    for required in SERIAL_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(IoError::schema(path, format!("missing column '{required}'")));
        }
    }

    let mut requests = Vec::new();
    for row in rdr.deserialize::<SerialRequest>() {
        requests.push(row.map_err(|e| IoError::parse(path, e))?);
    }
    Ok(requests)
}
