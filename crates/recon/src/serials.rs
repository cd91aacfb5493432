use std::collections::HashMap;

use crate::model::{SerialCheck, SerialCheckSummary, SerialRequest, SerialStatus, WalletAsset};

/// Key for one holdings lookup: (owner address, collection address).
pub type HoldingsKey = (String, String);

/// Holdings of one owner in one collection, or why they could not be read.
pub type Holdings = Result<Vec<WalletAsset>, String>;

/// Serial numbers carried by `assets`, ascending. Assets without a numeric
/// serial are skipped.
pub fn sorted_serials(assets: &[WalletAsset]) -> Vec<u64> {
    let mut serials: Vec<u64> = assets.iter().filter_map(WalletAsset::serial_number).collect();
    serials.sort_unstable();
    serials
}

/// Distinct holdings lookups needed for `requests`, in first-seen order.
pub fn holdings_keys(requests: &[SerialRequest]) -> Vec<HoldingsKey> {
    let mut keys: Vec<HoldingsKey> = Vec::new();
    for r in requests {
        let key = (r.user_address.clone(), r.collection_address.clone());
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Check every request against the holdings fetched for its owner and
/// collection. Output order follows `requests`.
pub fn check_serials(
    requests: &[SerialRequest],
    holdings: &HashMap<HoldingsKey, Holdings>,
) -> Vec<SerialCheck> {
    requests
        .iter()
        .map(|request| {
            let key = (request.user_address.clone(), request.collection_address.clone());
            match holdings.get(&key) {
                Some(Ok(assets)) => {
                    let hit = assets
                        .iter()
                        .find(|a| a.serial_number() == Some(request.serial_number));
                    SerialCheck {
                        request: request.clone(),
                        has_token: hit.is_some(),
                        token_id: hit.map(|a| a.token_id.clone()),
                        error: None,
                    }
                }
                Some(Err(e)) => failed(request, e.clone()),
                None => failed(request, "holdings were not fetched".to_string()),
            }
        })
        .collect()
}

fn failed(request: &SerialRequest, error: String) -> SerialCheck {
    SerialCheck {
        request: request.clone(),
        has_token: false,
        token_id: None,
        error: Some(error),
    }
}

pub fn summarize_checks(checks: &[SerialCheck]) -> SerialCheckSummary {
    let mut summary = SerialCheckSummary { total: checks.len(), ..Default::default() };
    for c in checks {
        match c.status() {
            SerialStatus::Found => summary.found += 1,
            SerialStatus::NotFound => summary.not_found += 1,
            SerialStatus::Error => summary.errors += 1,
        }
    }
    summary
}
