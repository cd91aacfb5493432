// assets, bulk-assets, serials, check-serials

use std::collections::HashMap;
use std::path::Path;

use nftledger_core::{Enriched, EnrichmentResult};
use nftledger_io::csv::{read_metadata_table, read_serial_requests};
use nftledger_io::json::read_collections;
use nftledger_recon::{
    check_serials, holdings_keys, join_metadata, sorted_serials, summarize_checks, Holdings,
    HoldingsKey, MetadataIndex, WalletAsset,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{fetch_wallet_assets, short, Context};
use crate::CliError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WalletReport<'a> {
    owner: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    collection: Option<&'a str>,
    total_assets: usize,
    lookup_errors: usize,
    assets: &'a [WalletAsset],
}

pub async fn cmd_assets(
    ctx: &Context,
    owner: &str,
    collection: Option<&str>,
    metadata_csv: Option<&Path>,
) -> Result<(), CliError> {
    // Load the metadata table before any network work.
    let index = match metadata_csv {
        Some(path) => {
            let rows = read_metadata_table(path, &ctx.settings.metadata_uri_column).map_err(CliError::file)?;
            let total = rows.len();
            let index = MetadataIndex::build(rows, &ctx.settings.metadata_uri_column);
            info!(rows = total, keyed = index.len(), "metadata index built");
            Some(index)
        }
        None => None,
    };

    let client = ctx.client()?;
    let assets = fetch_wallet_assets(ctx, &client, ctx.executor()?, owner, collection).await?;
    let lookup_errors = assets.iter().filter(|a| a.error.is_some()).count();

    println!("Wallet:  {}", owner);
    println!("Assets:  {}", assets.len());
    if lookup_errors > 0 {
        println!("Lookup errors: {}", lookup_errors);
    }

    let stem = format!("wallet-assets-{}", short(owner, 10));
    let path = match index {
        Some(index) => {
            let joined = join_metadata(&assets, &index).map_err(|e| CliError::general(e.to_string()))?;
            println!("With metadata:    {}", joined.matched);
            println!("Without metadata: {}", joined.unmatched);
            ctx.reports
                .write_json(&format!("{stem}-with-metadata"), &joined)
                .map_err(CliError::file)?
        }
        None => {
            for (i, a) in assets.iter().enumerate() {
                match a.serial_number() {
                    Some(serial) => println!("{:>4}. {} (#{}) {}", i + 1, a.token_name, serial, a.token_id),
                    None => println!("{:>4}. {} {}", i + 1, a.token_name, a.token_id),
                }
            }
            let report = WalletReport {
                owner,
                collection,
                total_assets: assets.len(),
                lookup_errors,
                assets: &assets,
            };
            ctx.reports.write_json(&stem, &report).map_err(CliError::file)?
        }
    };
    println!("Saved: {}", path.display());
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionAssets {
    collection_address: String,
    collection_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    total_assets: usize,
    assets: Vec<WalletAsset>,
}

/// One section per listed collection, in file order. Collections are
/// scanned concurrently; one that fails to fetch is recorded with its error
/// and the run continues.
pub async fn cmd_bulk_assets(ctx: &Context, owner: &str, collections: &Path) -> Result<(), CliError> {
    let list = read_collections(collections).map_err(CliError::file)?;
    let client = ctx.client()?;
    let client = &client;
    let (scanner, lookups) = ctx.collection_executors()?;
    info!(collections = list.len(), at_once = scanner.limit(), "bulk scan started");

    let scanned = scanner
        .run(list, |entry| {
            let address = entry.address.clone();
            async move { fetch_wallet_assets(ctx, client, lookups, owner, Some(address.as_str())).await }
        })
        .await;

    let mut sections = Vec::with_capacity(scanned.len());
    for Enriched { record: entry, outcome } in scanned {
        let (assets, error) = match outcome {
            EnrichmentResult::Enriched(assets) => (assets, None),
            EnrichmentResult::Failed { error } => {
                warn!(collection = %entry.address, %error, "collection skipped");
                (Vec::new(), Some(error))
            }
        };
        println!("{:<40} {:>6}{}", entry.name, assets.len(), if error.is_some() { "  (error)" } else { "" });
        sections.push(CollectionAssets {
            collection_address: entry.address,
            collection_name: entry.name,
            error,
            total_assets: assets.len(),
            assets,
        });
    }

    let total: usize = sections.iter().map(|s| s.total_assets).sum();
    println!("Total assets: {}", total);

    let path = ctx
        .reports
        .write_json(&format!("bulk-assets-{}", short(owner, 10)), &sections)
        .map_err(CliError::file)?;
    println!("Saved: {}", path.display());
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SerialsReport<'a> {
    owner: &'a str,
    collection: &'a str,
    total_assets: usize,
    without_serial: usize,
    serials: Vec<u64>,
}

pub async fn cmd_serials(ctx: &Context, owner: &str, collection: &str) -> Result<(), CliError> {
    let client = ctx.client()?;
    let assets = fetch_wallet_assets(ctx, &client, ctx.executor()?, owner, Some(collection)).await?;
    let serials = sorted_serials(&assets);

    println!("Assets:  {}", assets.len());
    println!("Serials: {}", serials.len());
    let line: Vec<String> = serials.iter().map(u64::to_string).collect();
    println!("{}", line.join(", "));

    let report = SerialsReport {
        owner,
        collection,
        total_assets: assets.len(),
        without_serial: assets.len() - serials.len(),
        serials,
    };
    let path = ctx
        .reports
        .write_json(&format!("serials-{}", short(owner, 10)), &report)
        .map_err(CliError::file)?;
    println!("Saved: {}", path.display());
    Ok(())
}

pub async fn cmd_check_serials(ctx: &Context, csv: &Path) -> Result<(), CliError> {
    let requests = read_serial_requests(csv).map_err(CliError::file)?;
    let keys = holdings_keys(&requests);
    info!(rows = requests.len(), lookups = keys.len(), "serial checks loaded");

    let client = ctx.client()?;
    let exec = ctx.executor()?;
    let mut holdings: HashMap<HoldingsKey, Holdings> = HashMap::with_capacity(keys.len());
    for (owner, collection) in keys {
        let fetched = fetch_wallet_assets(ctx, &client, exec, &owner, Some(collection.as_str()))
            .await
            .map_err(|e| e.message);
        if let Err(e) = &fetched {
            warn!(%owner, %collection, error = %e, "holdings lookup failed");
        }
        holdings.insert((owner, collection), fetched);
    }

    let checks = check_serials(&requests, &holdings);
    let summary = summarize_checks(&checks);

    println!("Checked:   {}", summary.total);
    println!("Found:     {}", summary.found);
    println!("Not found: {}", summary.not_found);
    println!("Errors:    {}", summary.errors);

    let json = ctx.reports.write_json("serial-check-results", &checks).map_err(CliError::file)?;
    let rows = checks.iter().map(|c| {
        vec![
            c.request.user_address.clone(),
            c.request.collection_name.clone(),
            c.request.collection_address.clone(),
            c.request.serial_number.to_string(),
            c.has_token.to_string(),
            c.token_id.clone().unwrap_or_default(),
            c.error.clone().unwrap_or_default(),
        ]
    });
    let csv_out = ctx
        .reports
        .write_csv(
            "serial-check-results",
            &[
                "user_address",
                "collection_name",
                "collection_address",
                "serial_number",
                "has_token",
                "token_id",
                "error",
            ],
            rows,
        )
        .map_err(CliError::file)?;
    println!("Saved: {}", json.display());
    println!("Saved: {}", csv_out.display());
    Ok(())
}
