use std::collections::BTreeMap;

use nftledger_core::Transaction;

use crate::model::{TransactionAnalysis, TransactionSummary};

/// Counts and edges of an account's transaction history.
/// `edge` is how many versions to keep from each end.
pub fn summarize_transactions(transactions: &[Transaction], edge: usize) -> TransactionSummary {
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_function: BTreeMap<String, usize> = BTreeMap::new();
    let mut successful = 0;

    for tx in transactions {
        *by_type.entry(tx.kind.clone()).or_insert(0) += 1;
        if let Some(f) = &tx.function {
            *by_function.entry(f.clone()).or_insert(0) += 1;
        }
        if tx.success {
            successful += 1;
        }
    }

    let total = transactions.len();
    let success_rate = (total > 0).then(|| successful as f64 * 100.0 / total as f64);

    let versions: Vec<u64> = transactions.iter().map(|t| t.version).collect();
    let head = edge.min(total);
    let tail = total.saturating_sub(edge);

    TransactionSummary {
        total,
        successful,
        failed: total - successful,
        success_rate,
        by_type,
        by_function,
        first_versions: versions[..head].to_vec(),
        last_versions: versions[tail..].to_vec(),
    }
}

/// Tokens and transfers referenced by one transaction's events.
pub fn analyze_transaction(tx: &Transaction) -> TransactionAnalysis {
    TransactionAnalysis {
        transaction_hash: tx.hash.clone(),
        version: tx.version,
        timestamp: tx.timestamp.clone(),
        success: tx.success,
        event_types: tx.events.iter().map(|e| e.kind.clone()).collect(),
        tokens: tx.events.iter().filter_map(|e| e.minted_token()).collect(),
        transfers: tx.events.iter().filter_map(|e| e.transfer()).collect(),
    }
}
