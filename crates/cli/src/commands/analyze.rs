// analyze-tx, group-transfers

use std::path::Path;

use nftledger_core::FallbackChain;
use nftledger_io::json::read_transfer_dir;
use nftledger_recon::{analyze_transaction, group_transfers, top_by_count};
use tracing::info;

use super::{short, Context};
use crate::CliError;

/// Committed lookup first; if the transaction is unknown or still pending,
/// wait for it.
pub async fn cmd_analyze_tx(ctx: &Context, hash: &str) -> Result<(), CliError> {
    let client = ctx.client()?;
    let client = &client;

    let (via, tx) = FallbackChain::new()
        .then("by_hash", move || client.transaction_by_hash(hash))
        .then("wait_by_hash", move || client.wait_for_transaction(hash))
        .run()
        .await
        .map_err(CliError::fallback)?;
    info!(strategy = %via, version = tx.version, "transaction resolved");

    let analysis = analyze_transaction(&tx);

    println!("Transaction: {}", analysis.transaction_hash);
    println!("Version:     {}", analysis.version);
    if let Some(ts) = &analysis.timestamp {
        println!("Timestamp:   {}", ts);
    }
    println!("Success:     {}", analysis.success);
    if let Some(function) = &tx.function {
        println!("Function:    {}", function);
    }
    println!("Events:      {}", analysis.event_types.len());
    for kind in &analysis.event_types {
        println!("  {}", kind);
    }
    for token in &analysis.tokens {
        println!("Token:       {}", token.token_id);
    }
    for t in &analysis.transfers {
        println!("Transfer:    {} -> {}", t.token_id, t.to);
    }

    let path = ctx
        .reports
        .write_json(&format!("transaction-analysis-{}", short(hash, 10)), &analysis)
        .map_err(CliError::file)?;
    println!("Saved: {}", path.display());
    Ok(())
}

pub fn cmd_group_transfers(ctx: &Context, dir: &Path, top: usize) -> Result<(), CliError> {
    let (files, transfers) = read_transfer_dir(dir).map_err(CliError::file)?;
    if files == 0 {
        return Err(CliError::args(format!("no *.json files in {}", dir.display())));
    }

    let groups = group_transfers(&transfers);
    let tokens: usize = groups.iter().map(|g| g.token_count).sum();

    println!("Files:      {}", files);
    println!("Transfers:  {}", transfers.len());
    println!("Addresses:  {}", groups.len());
    println!("Tokens:     {}", tokens);
    for (i, g) in top_by_count(&groups, top).iter().enumerate() {
        println!("{:>3}. {} {}", i + 1, g.address, g.token_count);
    }

    let path = ctx
        .reports
        .write_json("transfers-by-address", &groups)
        .map_err(CliError::file)?;
    println!("Saved: {}", path.display());
    Ok(())
}
