// transactions, snapshot, compare-live, compare-hashes

use std::path::{Path, PathBuf};

use nftledger_core::{CursorStrategy, SimplifiedTransaction};
use nftledger_io::csv::read_hash_list;
use nftledger_io::json::{read_snapshot_hashes, SNAPSHOT_PREFIX};
use nftledger_io::ReportWriter;
use nftledger_recon::{reconcile, summarize_transactions, ReconciliationReport};
use serde::Serialize;
use tracing::info;

use super::{fetch_transactions, short, Context, CursorArg};
use crate::CliError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryReport<'a> {
    address: &'a str,
    network: String,
    cursor: CursorStrategy,
    requests: usize,
    summary: nftledger_recon::TransactionSummary,
    transactions: Vec<SimplifiedTransaction>,
}

pub async fn cmd_transactions(
    ctx: &Context,
    address: &str,
    cursor: CursorArg,
    edge: usize,
) -> Result<(), CliError> {
    let client = ctx.client()?;
    let outcome = fetch_transactions(ctx, &client, address, cursor.into()).await?;
    let summary = summarize_transactions(&outcome.records, edge);

    println!("Account:      {}", address);
    println!("Transactions: {}", summary.total);
    println!("Successful:   {}", summary.successful);
    println!("Failed:       {}", summary.failed);
    if let Some(rate) = summary.success_rate {
        println!("Success rate: {:.2}%", rate);
    }
    for (kind, n) in &summary.by_type {
        println!("  {:<24} {}", kind, n);
    }
    if !summary.first_versions.is_empty() {
        println!("First versions: {:?}", summary.first_versions);
        println!("Last versions:  {:?}", summary.last_versions);
    }

    let report = HistoryReport {
        address,
        network: ctx.settings.network.to_string(),
        cursor: outcome.strategy,
        requests: outcome.requests(),
        transactions: outcome.records.iter().map(|tx| tx.simplify()).collect(),
        summary,
    };
    let path = ctx
        .reports
        .write_json(&format!("transactions-{}", short(address, 10)), &report)
        .map_err(CliError::file)?;
    println!("Saved: {}", path.display());
    Ok(())
}

/// One snapshot file per fetched page that had matching calls. Pages are
/// numbered from 1 and zero-padded so name order is page order.
pub async fn cmd_snapshot(
    ctx: &Context,
    address: &str,
    function: &str,
    dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let client = ctx.client()?;
    let outcome = fetch_transactions(ctx, &client, address, CursorStrategy::Offset).await?;

    let writer = match dir {
        Some(dir) => ReportWriter::with_timestamp(dir, ctx.reports.timestamp()).map_err(CliError::file)?,
        None => ctx.reports.clone(),
    };

    let mut files = 0;
    let mut matched = 0;
    for (i, page) in outcome.pages().enumerate() {
        let calls: Vec<SimplifiedTransaction> = page
            .iter()
            .filter(|tx| tx.calls(function))
            .map(|tx| tx.simplify())
            .collect();
        if calls.is_empty() {
            continue;
        }
        let stem = format!("{}{:04}-{}", SNAPSHOT_PREFIX, i + 1, short(address, 10));
        writer.write_json(&stem, &calls).map_err(CliError::file)?;
        info!(page = i + 1, calls = calls.len(), "snapshot page written");
        files += 1;
        matched += calls.len();
    }

    println!("Pages fetched:      {}", outcome.requests());
    println!("Transactions seen:  {}", outcome.records.len());
    println!("{} calls:   {}", function, matched);
    println!("Snapshot files:     {} in {}", files, writer.dir().display());
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashComparison<'a> {
    first_source: &'a str,
    second_source: &'a str,
    #[serde(flatten)]
    report: &'a ReconciliationReport,
}

/// Live hashes of `address` against the snapshot hashes. Every live
/// transaction counts unless `only_function` narrows the live side.
pub async fn cmd_compare_live(
    ctx: &Context,
    address: &str,
    snapshots: &Path,
    only_function: Option<&str>,
) -> Result<(), CliError> {
    // Local input first: a broken snapshot dir should fail before any fetch.
    let snap = read_snapshot_hashes(snapshots).map_err(CliError::file)?;
    if snap.hashes.is_empty() {
        return Err(no_snapshot_hashes(snapshots, snap.files));
    }
    info!(files = snap.files, hashes = snap.hashes.len(), "snapshots loaded");

    let client = ctx.client()?;
    let outcome = fetch_transactions(ctx, &client, address, CursorStrategy::Offset).await?;
    let live: Vec<String> = outcome
        .records
        .into_iter()
        .filter(|tx| only_function.map_or(true, |f| tx.calls(f)))
        .map(|tx| tx.hash)
        .collect();
    if live.is_empty() {
        let what = match only_function {
            Some(f) => format!("no live {f} transactions for {address}"),
            None => format!("no live transactions for {address}"),
        };
        return Err(CliError::empty_side(what));
    }

    let report = reconcile(live, snap.hashes);
    print_report("live", "snapshot", &report);

    let stem = format!("hash-comparison-{}", short(address, 10));
    write_comparison(ctx, &stem, "live", "snapshot", &report)?;
    Ok(())
}

pub fn cmd_compare_hashes(ctx: &Context, snapshots: &Path, csv: &Path) -> Result<(), CliError> {
    let snap = read_snapshot_hashes(snapshots).map_err(CliError::file)?;
    if snap.hashes.is_empty() {
        return Err(no_snapshot_hashes(snapshots, snap.files));
    }
    let exported = read_hash_list(csv).map_err(CliError::file)?;
    if exported.is_empty() {
        return Err(CliError::empty_side(format!("no 0x hashes in the first column of {}", csv.display())));
    }

    let report = reconcile(snap.hashes, exported);
    print_report("snapshot", "csv", &report);
    write_comparison(ctx, "hash-comparison-json-csv", "snapshot", "csv", &report)?;

    // Per-side lists, only when non-empty.
    if !report.only_in_first.is_empty() {
        let rows = report.only_in_first.iter().map(|h| [h.as_str()]);
        let path = ctx.reports.write_csv("missing-from-csv", &["hash"], rows).map_err(CliError::file)?;
        println!("Missing from CSV:      {}", path.display());
    }
    if !report.only_in_second.is_empty() {
        let rows = report.only_in_second.iter().map(|h| [h.as_str()]);
        let path = ctx.reports.write_csv("missing-from-mint-for", &["hash"], rows).map_err(CliError::file)?;
        println!("Missing from snapshot: {}", path.display());
    }
    Ok(())
}

fn no_snapshot_hashes(dir: &Path, files: usize) -> CliError {
    if files == 0 {
        CliError::args(format!("no {}*.json files in {}", SNAPSHOT_PREFIX, dir.display()))
            .with_hint("run `nftl snapshot <address> --dir <dir>` first")
    } else {
        CliError::empty_side(format!("{} snapshot file(s) in {} hold no hashes", files, dir.display()))
    }
}

fn print_report(first: &str, second: &str, report: &ReconciliationReport) {
    println!("{:<10} {} unique hashes", first, report.first_count);
    println!("{:<10} {} unique hashes", second, report.second_count);
    println!("in both    {}", report.in_both);
    println!("only in {:<8} {}", first, report.only_in_first.len());
    println!("only in {:<8} {}", second, report.only_in_second.len());
    if report.is_clean() {
        println!("All hashes match.");
    }
}

/// `<stem>.json` with the full report, `<stem>.csv` with one row per
/// mismatched hash.
fn write_comparison(
    ctx: &Context,
    stem: &str,
    first: &str,
    second: &str,
    report: &ReconciliationReport,
) -> Result<(), CliError> {
    let doc = HashComparison { first_source: first, second_source: second, report };
    let json = ctx.reports.write_json(stem, &doc).map_err(CliError::file)?;

    let missing_from_second = format!("missing_from_{second}");
    let missing_from_first = format!("missing_from_{first}");
    let rows = report
        .only_in_first
        .iter()
        .map(|h| [h.as_str(), missing_from_second.as_str()])
        .chain(report.only_in_second.iter().map(|h| [h.as_str(), missing_from_first.as_str()]));
    let csv = ctx.reports.write_csv(stem, &["hash", "status"], rows).map_err(CliError::file)?;

    println!("Saved: {}", json.display());
    println!("Saved: {}", csv.display());
    Ok(())
}
