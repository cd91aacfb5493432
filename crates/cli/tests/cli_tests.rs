//! End-to-end tests of the `nftl` binary.
//!
//! Offline commands run against temp files; network commands run against
//! an httpmock server passed in through the endpoint environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::{json, Value};

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.toml"), "").unwrap();
        fs::create_dir(dir.path().join("out")).unwrap();
        Self { dir }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    fn nftl(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_nftl"));
        cmd.arg("--config")
            .arg(self.path("config.toml"))
            .arg("--output-dir")
            .arg(self.path("out"))
            .arg("-q")
            .env_remove("NETWORK")
            .env_remove("APTOS_API_KEY")
            .env_remove("APTOS_NODE_URL")
            .env_remove("APTOS_INDEXER_URL")
            .env_remove("NFTLEDGER_OUTPUT_DIR")
            .env_remove("RUST_LOG");
        cmd
    }

    fn nftl_against(&self, server: &MockServer) -> Command {
        let mut cmd = self.nftl();
        cmd.env("APTOS_NODE_URL", server.url("/v1"))
            .env("APTOS_INDEXER_URL", server.url("/v1/graphql"));
        cmd
    }

    /// The single output file whose name starts with `prefix` and ends with `ext`.
    fn output(&self, prefix: &str, ext: &str) -> PathBuf {
        let matches: Vec<PathBuf> = fs::read_dir(self.path("out"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                let name = p.file_name().unwrap().to_string_lossy().to_string();
                name.starts_with(prefix) && name.ends_with(ext)
            })
            .collect();
        assert_eq!(matches.len(), 1, "expected one {prefix}*{ext}, got {matches:?}");
        matches.into_iter().next().unwrap()
    }
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run nftl")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ── Usage and config ────────────────────────────────────────────────

#[test]
fn missing_positional_is_usage_error() {
    let ws = Workspace::new();
    let out = run(ws.nftl().arg("analyze-tx"));
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn unknown_network_is_config_error() {
    let ws = Workspace::new();
    let out = run(ws.nftl().args(["--network", "moonnet", "balance", "0x1"]));
    assert_eq!(out.status.code(), Some(10));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown network"));
}

#[test]
fn zero_concurrency_is_config_error() {
    let ws = Workspace::new();
    let out = run(ws.nftl().args(["--concurrency", "0", "serials", "0xa", "0xc"]));
    assert_eq!(out.status.code(), Some(10));
}

// ── compare-hashes (offline) ────────────────────────────────────────

#[test]
fn compare_hashes_reports_both_sides() {
    let ws = Workspace::new();
    ws.write("snap/mint-for-page-0001-0xabc.json", r#"[{"hash":"0x01"},{"hash":"0x02"}]"#);
    ws.write("snap/mint-for-page-0002-0xabc.json", r#"[{"hash":"0x03"},{"hash":"0x02"}]"#);
    let csv = ws.write("export.csv", "\"Txn Hash\",\"Block\"\n\"0x02\",\"1\"\n\"0x03\",\"2\"\n\"0x04\",\"3\"\n");

    let out = run(ws
        .nftl()
        .arg("compare-hashes")
        .arg("--snapshots")
        .arg(ws.path("snap"))
        .arg("--csv")
        .arg(&csv));
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let report = read_json(&ws.output("hash-comparison-json-csv", ".json"));
    assert_eq!(report["firstCount"], 3);
    assert_eq!(report["secondCount"], 3);
    assert_eq!(report["inBoth"], 2);
    assert_eq!(report["onlyInFirst"], json!(["0x01"]));
    assert_eq!(report["onlyInSecond"], json!(["0x04"]));

    let diff = fs::read_to_string(ws.output("hash-comparison-json-csv", ".csv")).unwrap();
    assert_eq!(diff, "hash,status\n0x01,missing_from_csv\n0x04,missing_from_snapshot\n");

    let missing_csv = fs::read_to_string(ws.output("missing-from-csv", ".csv")).unwrap();
    assert_eq!(missing_csv, "hash\n0x01\n");
}

#[test]
fn compare_hashes_clean_run() {
    let ws = Workspace::new();
    ws.write("snap/mint-for-page-0001.json", r#"[{"hash":"0xaa"}]"#);
    let csv = ws.write("export.csv", "hash\n0xaa\n");

    let out = run(ws
        .nftl()
        .arg("compare-hashes")
        .arg("--snapshots")
        .arg(ws.path("snap"))
        .arg("--csv")
        .arg(&csv));
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("All hashes match."));
    assert!(fs::read_dir(ws.path("out"))
        .unwrap()
        .all(|e| !e.unwrap().file_name().to_string_lossy().starts_with("missing-from")));
}

#[test]
fn compare_hashes_bad_snapshot_is_data_error() {
    let ws = Workspace::new();
    ws.write("snap/mint-for-page-0001.json", r#"{"hash":"0xaa"}"#);
    let csv = ws.write("export.csv", "hash\n0xaa\n");

    let out = run(ws
        .nftl()
        .arg("compare-hashes")
        .arg("--snapshots")
        .arg(ws.path("snap"))
        .arg("--csv")
        .arg(&csv));
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn compare_hashes_missing_csv_is_io_error() {
    let ws = Workspace::new();
    ws.write("snap/mint-for-page-0001.json", r#"[{"hash":"0xaa"}]"#);

    let out = run(ws
        .nftl()
        .arg("compare-hashes")
        .arg("--snapshots")
        .arg(ws.path("snap"))
        .arg("--csv")
        .arg(ws.path("nope.csv")));
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn compare_hashes_csv_without_hashes_is_rejected() {
    let ws = Workspace::new();
    ws.write("snap/mint-for-page-0001.json", r#"[{"hash":"0xaa"},{"hash":"0xbb"}]"#);
    let csv = ws.write("export.csv", "hash\nnot-a-hash\n12345\n");

    let out = run(ws
        .nftl()
        .arg("compare-hashes")
        .arg("--snapshots")
        .arg(ws.path("snap"))
        .arg("--csv")
        .arg(&csv));
    assert_eq!(out.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no 0x hashes"));
    assert_eq!(fs::read_dir(ws.path("out")).unwrap().count(), 0);
}

#[test]
fn compare_hashes_snapshots_without_hashes_are_rejected() {
    let ws = Workspace::new();
    ws.write("snap/mint-for-page-0001.json", r#"[{"version":"5"}]"#);
    let csv = ws.write("export.csv", "hash\n0xaa\n");

    let out = run(ws
        .nftl()
        .arg("compare-hashes")
        .arg("--snapshots")
        .arg(ws.path("snap"))
        .arg("--csv")
        .arg(&csv));
    assert_eq!(out.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&out.stderr).contains("hold no hashes"));
    assert_eq!(fs::read_dir(ws.path("out")).unwrap().count(), 0);
}

// ── compare-live ────────────────────────────────────────────────────

fn live_tx(version: u64, hash: &str, function: Option<&str>) -> Value {
    let mut tx = json!({
        "version": version.to_string(),
        "hash": hash,
        "success": true,
        "type": "user_transaction",
        "events": []
    });
    if let Some(f) = function {
        tx["payload"] = json!({ "function": f, "arguments": [] });
    }
    tx
}

fn history_server(txs: Vec<Value>) -> MockServer {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/accounts/0xabc/transactions");
        then.status(200).json_body(Value::Array(txs));
    });
    server
}

fn compare_live(ws: &Workspace, server: &MockServer, extra: &[&str]) -> Output {
    run(ws
        .nftl_against(server)
        .args(["compare-live", "0xabc", "--snapshots"])
        .arg(ws.path("snap"))
        .args(extra))
}

#[test]
fn compare_live_counts_every_live_transaction() {
    let server = history_server(vec![
        live_tx(10, "0x01", Some("0xc::minter::mint_for")),
        live_tx(11, "0x02", None),
        live_tx(12, "0x03", Some("0x1::aptos_account::transfer")),
    ]);
    let ws = Workspace::new();
    ws.write("snap/mint-for-page-0001-0xabc.json", r#"[{"hash":"0x01"}]"#);

    let out = compare_live(&ws, &server, &[]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let report = read_json(&ws.output("hash-comparison-0xabc", ".json"));
    assert_eq!(report["firstCount"], 3);
    assert_eq!(report["onlyInFirst"], json!(["0x02", "0x03"]));
    assert_eq!(report["onlyInSecond"], json!([]));
}

#[test]
fn compare_live_can_narrow_to_one_function() {
    let server = history_server(vec![
        live_tx(10, "0x01", Some("0xc::minter::mint_for")),
        live_tx(11, "0x02", None),
    ]);
    let ws = Workspace::new();
    ws.write("snap/mint-for-page-0001-0xabc.json", r#"[{"hash":"0x01"}]"#);

    let out = compare_live(&ws, &server, &["--only-function", "mint_for"]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("All hashes match."));
}

#[test]
fn compare_live_empty_snapshot_dir_fails_before_fetch() {
    let server = MockServer::start();
    let history = server.mock(|when, then| {
        when.method(GET).path("/v1/accounts/0xabc/transactions");
        then.status(200).json_body(json!([]));
    });
    let ws = Workspace::new();
    fs::create_dir(ws.path("snap")).unwrap();

    let out = compare_live(&ws, &server, &[]);
    assert_eq!(out.status.code(), Some(2));
    history.assert_calls(0);
    assert_eq!(fs::read_dir(ws.path("out")).unwrap().count(), 0);
}

#[test]
fn compare_live_without_live_transactions_is_rejected() {
    let server = history_server(vec![live_tx(11, "0x02", None)]);
    let ws = Workspace::new();
    ws.write("snap/mint-for-page-0001-0xabc.json", r#"[{"hash":"0x01"}]"#);

    let out = compare_live(&ws, &server, &["--only-function", "mint_for"]);
    assert_eq!(out.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no live mint_for transactions"));
    assert_eq!(fs::read_dir(ws.path("out")).unwrap().count(), 0);
}

// ── group-transfers (offline) ───────────────────────────────────────

#[test]
fn group_transfers_by_recipient() {
    let ws = Workspace::new();
    ws.write(
        "transfers/a.json",
        r#"[{"tokenId":"0xt1","to":"0xbob"},{"tokenId":"0xt2","to":"0xann"}]"#,
    );
    ws.write(
        "transfers/b.json",
        r#"[{"tokenId":"0xt3","to":"0xbob"},{"tokenId":"0xt1","to":"0xbob"}]"#,
    );

    let out = run(ws.nftl().arg("group-transfers").arg(ws.path("transfers")));
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("Addresses:  2"));

    let groups = read_json(&ws.output("transfers-by-address", ".json"));
    assert_eq!(
        groups,
        json!([
            { "address": "0xbob", "tokenCount": 2, "tokens": ["0xt1", "0xt3"] },
            { "address": "0xann", "tokenCount": 1, "tokens": ["0xt2"] }
        ])
    );
}

// ── Network commands (httpmock) ─────────────────────────────────────

#[test]
fn supply_subtracts_burned_tokens() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/graphql").body_includes("current_collections_v2");
        then.status(200).json_body(json!({ "data": { "current_collections_v2": [{
            "collection_id": "0xc",
            "collection_name": "Moments",
            "creator_address": "0xcreator",
            "total_minted_v2": "100"
        }] } }));
    });
    let burned: Vec<Value> = (1..=7).map(|i| json!({ "token_data_id": format!("0xb{i}"), "amount": 1 })).collect();
    let ownership = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/graphql")
            .body_includes("current_token_ownerships_v2")
            .body_includes("0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff");
        then.status(200).json_body(json!({ "data": { "current_token_ownerships_v2": burned } }));
    });

    let ws = Workspace::new();
    let out = run(ws.nftl_against(&server).args(["supply", "0xcreator", "Moments"]));
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    ownership.assert_calls(1);

    let text = stdout(&out);
    assert!(text.contains("Burned:      7"));
    assert!(text.contains("Circulating: 93"));

    let report = read_json(&ws.output("collection-supply", ".json"));
    assert_eq!(report["totalSupply"], 100);
    assert_eq!(report["circulatingSupply"], 93);
    assert_eq!(report["burnPercentage"], 7.0);
    assert_eq!(report["burnedTokenIds"].as_array().unwrap().len(), 7);
}

#[test]
fn supply_unknown_collection_is_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/graphql");
        then.status(200).json_body(json!({ "data": { "current_collections_v2": [] } }));
    });

    let ws = Workspace::new();
    let out = run(ws.nftl_against(&server).args(["supply", "0xcreator", "Nope"]));
    assert_eq!(out.status.code(), Some(55));
}

#[test]
fn analyze_tx_falls_back_to_wait() {
    let server = MockServer::start();
    let by_hash = server.mock(|when, then| {
        when.method(GET).path("/v1/transactions/by_hash/0xfeed");
        then.status(404).json_body(json!({
            "message": "Transaction not found by Transaction hash(0xfeed)",
            "error_code": "transaction_not_found"
        }));
    });
    let wait = server.mock(|when, then| {
        when.method(GET).path("/v1/transactions/wait_by_hash/0xfeed");
        then.status(200).json_body(json!({
            "version": "4242",
            "hash": "0xfeed",
            "success": true,
            "type": "user_transaction",
            "timestamp": "1700000000000000",
            "payload": { "function": "0xc::minter::mint_for", "arguments": [] },
            "events": [
                { "type": "0x4::collection::Mint", "data": { "token": "0xt9", "collection": "0xc" } },
                { "type": "0x1::object::Transfer", "data": { "object": "0xt9", "to": "0xbob" } }
            ]
        }));
    });

    let ws = Workspace::new();
    let out = run(ws.nftl_against(&server).args(["analyze-tx", "0xfeed"]));
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    by_hash.assert_calls(1);
    wait.assert_calls(1);

    let analysis = read_json(&ws.output("transaction-analysis", ".json"));
    assert_eq!(analysis["version"], 4242);
    assert_eq!(analysis["tokens"][0]["tokenId"], "0xt9");
    assert_eq!(analysis["transfers"], json!([{ "tokenId": "0xt9", "to": "0xbob" }]));
}

#[test]
fn transactions_auth_failure_exit_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/accounts/0xa/transactions");
        then.status(401).json_body(json!({ "message": "invalid api key" }));
    });

    let ws = Workspace::new();
    let out = run(ws.nftl_against(&server).args(["transactions", "0xa"]));
    assert_eq!(out.status.code(), Some(51));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid api key"));
}

#[test]
fn serials_sorted_with_failed_lookup_kept() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/graphql").body_includes("current_token_ownerships_v2");
        then.status(200).json_body(json!({ "data": { "current_token_ownerships_v2": [
            { "token_data_id": "0xt1", "amount": 1 },
            { "token_data_id": "0xt2", "amount": 1 },
            { "token_data_id": "0xt3", "amount": 1 }
        ] } }));
    });
    for (id, serial) in [("0xt1", "12"), ("0xt2", "3")] {
        server.mock(|when, then| {
            when.method(POST)
                .path("/v1/graphql")
                .body_includes("current_token_datas_v2")
                .body_includes(format!("\"id\":\"{id}\""));
            then.status(200).json_body(json!({ "data": { "current_token_datas_v2": [{
                "token_data_id": id,
                "token_properties": { "Serial Number": serial }
            }] } }));
        });
    }
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/graphql")
            .body_includes("current_token_datas_v2")
            .body_includes("\"id\":\"0xt3\"");
        then.status(500).body("indexer down");
    });

    let ws = Workspace::new();
    let out = run(ws.nftl_against(&server).args(["serials", "0xowner", "0xc"]));
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("3, 12"));

    let report = read_json(&ws.output("serials", ".json"));
    assert_eq!(report["serials"], json!([3, 12]));
    assert_eq!(report["totalAssets"], 3);
    assert_eq!(report["withoutSerial"], 1);
}

#[test]
fn bulk_assets_keeps_file_order_and_failed_collections() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/graphql")
            .body_includes("current_token_ownerships_v2")
            .body_includes("\"_eq\":\"0xc1\"");
        then.status(200).json_body(json!({ "data": { "current_token_ownerships_v2": [
            { "token_data_id": "0xt1", "amount": 1 }
        ] } }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/graphql")
            .body_includes("current_token_ownerships_v2")
            .body_includes("\"_eq\":\"0xc2\"");
        then.status(500).body("indexer down");
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/graphql").body_includes("current_token_datas_v2");
        then.status(200).json_body(json!({ "data": { "current_token_datas_v2": [{
            "token_data_id": "0xt1",
            "token_name": "First"
        }] } }));
    });

    let ws = Workspace::new();
    let list = ws.write(
        "collections.json",
        r#"[{"address":"0xc1","name":"One"},{"address":"0xc2","name":"Two"}]"#,
    );
    let out = run(ws
        .nftl_against(&server)
        .args(["--concurrency", "4", "bulk-assets", "0xowner", "--collections"])
        .arg(&list));
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("Total assets: 1"));

    let sections = read_json(&ws.output("bulk-assets-0xowner", ".json"));
    assert_eq!(sections[0]["collectionAddress"], "0xc1");
    assert_eq!(sections[0]["totalAssets"], 1);
    assert!(sections[0].get("error").is_none());
    assert_eq!(sections[1]["collectionAddress"], "0xc2");
    assert_eq!(sections[1]["totalAssets"], 0);
    assert!(sections[1]["error"].as_str().unwrap().contains("500"));
}
