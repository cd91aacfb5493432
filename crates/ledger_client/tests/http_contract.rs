//! Wire-level tests against a local mock of the node and indexer APIs.

use httpmock::prelude::*;
use nftledger_client::{
    AccountTransactions, ClientError, LedgerClient, OwnedTokenFilter, OwnedTokens, APT_COIN,
};
use nftledger_config::Settings;
use nftledger_core::{CursorStrategy, FetchError, FetchOptions, Fetcher};
use serde_json::{json, Value};

fn client(server: &MockServer) -> LedgerClient {
    let settings = Settings {
        node_url: Some(server.url("/v1")),
        indexer_url: Some(server.url("/v1/graphql")),
        retry_base_delay_ms: 1,
        ..Settings::default()
    };
    LedgerClient::new(&settings).unwrap()
}

fn client_with_retries(server: &MockServer, retries: u32) -> LedgerClient {
    let settings = Settings {
        node_url: Some(server.url("/v1")),
        indexer_url: Some(server.url("/v1/graphql")),
        max_retries: retries,
        retry_base_delay_ms: 1,
        ..Settings::default()
    };
    LedgerClient::new(&settings).unwrap()
}

fn tx(version: u64) -> Value {
    json!({
        "version": version.to_string(),
        "hash": format!("0x{version:04x}"),
        "success": true,
        "type": "user_transaction",
        "payload": {
            "function": "0xc::minter::mint_for",
            "type_arguments": [],
            "arguments": ["0xb0b"]
        },
        "events": []
    })
}

fn options(page_size: u32, strategy: CursorStrategy) -> FetchOptions {
    FetchOptions { page_size, strategy: Some(strategy), ..FetchOptions::default() }
}

// ── Node: account transactions ──────────────────────────────────────

#[tokio::test]
async fn offset_pagination_stops_on_short_page() {
    let server = MockServer::start_async().await;

    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/accounts/0xa/transactions")
                .query_param("limit", "2")
                .query_param("start", "0");
            then.status(200).json_body(json!([tx(10), tx(11)]));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/accounts/0xa/transactions")
                .query_param("limit", "2")
                .query_param("start", "2");
            then.status(200).json_body(json!([tx(12)]));
        })
        .await;

    let client = client(&server);
    let source = AccountTransactions::new(&client, "0xa");
    let outcome = Fetcher::new(options(2, CursorStrategy::Offset))
        .fetch_all(&source)
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(outcome.requests(), 2);
    let versions: Vec<u64> = outcome.records.iter().map(|t| t.version).collect();
    assert_eq!(versions, vec![10, 11, 12]);
}

#[tokio::test]
async fn version_pagination_starts_after_last_version() {
    let server = MockServer::start_async().await;

    // Registered first so it wins once `start` is present.
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/accounts/0xa/transactions")
                .query_param("start", "21");
            then.status(200).json_body(json!([]));
        })
        .await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/accounts/0xa/transactions")
                .query_param("limit", "2");
            then.status(200).json_body(json!([tx(7), tx(20)]));
        })
        .await;

    let client = client(&server);
    let source = AccountTransactions::new(&client, "0xa");
    let outcome = Fetcher::new(options(2, CursorStrategy::AfterVersion))
        .fetch_all(&source)
        .await
        .unwrap();

    first.assert_calls_async(1).await;
    second.assert_calls_async(1).await;
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.page_sizes, vec![2, 0]);
}

#[tokio::test]
async fn failed_page_discards_partial_results() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/accounts/0xa/transactions").query_param("start", "2");
            then.status(400).json_body(json!({ "message": "invalid start", "error_code": "invalid_input" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/accounts/0xa/transactions").query_param("start", "0");
            then.status(200).json_body(json!([tx(1), tx(2)]));
        })
        .await;

    let client = client(&server);
    let source = AccountTransactions::new(&client, "0xa");
    let err = Fetcher::new(options(2, CursorStrategy::Offset))
        .fetch_all(&source)
        .await
        .unwrap_err();

    match err {
        FetchError::Page { page, fetched, source } => {
            assert_eq!(page, 2);
            assert_eq!(fetched, 2);
            assert!(matches!(source, ClientError::Validation { status: 400, ref message } if message == "invalid start"));
        }
        other => panic!("expected page error, got {other}"),
    }
}

// ── Node: status classification and retry ───────────────────────────

#[tokio::test]
async fn not_found_is_classified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/transactions/by_hash/0xdead");
            then.status(404).json_body(json!({
                "message": "Transaction not found by Transaction hash(0xdead)",
                "error_code": "transaction_not_found"
            }));
        })
        .await;

    let err = client(&server).transaction_by_hash("0xdead").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(ref m) if m.contains("0xdead")));
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/transactions/by_hash/0x1");
            then.status(401).body("unauthorized");
        })
        .await;

    let err = client_with_retries(&server, 3).transaction_by_hash("0x1").await.unwrap_err();
    assert!(matches!(err, ClientError::Auth { status: 401, .. }));
    m.assert_calls_async(1).await;
}

#[tokio::test]
async fn server_errors_retry_then_fail() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/transactions/by_hash/0x1");
            then.status(503).body("busy");
        })
        .await;

    let err = client_with_retries(&server, 2).transaction_by_hash("0x1").await.unwrap_err();
    assert!(matches!(err, ClientError::Upstream { status: 503, ref message } if message == "busy"));
    m.assert_calls_async(3).await;
}

#[tokio::test]
async fn no_retries_by_default() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/transactions/by_hash/0x1");
            then.status(429);
        })
        .await;

    let err = client(&server).transaction_by_hash("0x1").await.unwrap_err();
    assert!(matches!(err, ClientError::RateLimited { attempts: 1 }));
    m.assert_calls_async(1).await;
}

#[tokio::test]
async fn api_key_sent_as_bearer() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/transactions/wait_by_hash/0x9")
                .header("authorization", "Bearer k-123");
            then.status(200).json_body(tx(9));
        })
        .await;

    let settings = Settings {
        node_url: Some(server.url("/v1")),
        api_key: Some("k-123".into()),
        ..Settings::default()
    };
    let tx = LedgerClient::new(&settings).unwrap().wait_for_transaction("0x9").await.unwrap();
    assert_eq!(tx.version, 9);
    m.assert_async().await;
}

#[tokio::test]
async fn balance_from_view_function() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/view").json_body(json!({
                "function": "0x1::coin::balance",
                "type_arguments": [APT_COIN],
                "arguments": ["0xa"]
            }));
            then.status(200).json_body(json!(["250000000"]));
        })
        .await;

    let balance = client(&server).account_balance("0xa", APT_COIN).await.unwrap();
    assert_eq!(balance.octas, 250_000_000);
    assert!((balance.apt - 2.5).abs() < f64::EPSILON);
}

// ── Indexer ─────────────────────────────────────────────────────────

fn ownership(id: &str) -> Value {
    json!({
        "token_data_id": id,
        "amount": 1,
        "current_token_data": {
            "token_name": format!("Token {id}"),
            "token_uri": format!("ipfs://Qm{id}"),
            "collection_id": "0xc",
            "current_collection": { "collection_id": "0xc", "collection_name": "Moments" }
        }
    })
}

#[tokio::test]
async fn owned_tokens_page_by_offset() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/graphql")
                .body_includes("current_token_ownerships_v2")
                .body_includes("\"offset\":0");
            then.status(200).json_body(json!({
                "data": { "current_token_ownerships_v2": [ownership("0xt1"), ownership("0xt2")] }
            }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/graphql")
                .body_includes("current_token_ownerships_v2")
                .body_includes("\"offset\":2");
            then.status(200).json_body(json!({ "data": { "current_token_ownerships_v2": [] } }));
        })
        .await;

    let client = client(&server);
    let source = OwnedTokens::new(&client, OwnedTokenFilter::owner("0xa"));
    let outcome = Fetcher::new(FetchOptions { page_size: 2, ..FetchOptions::default() })
        .fetch_all(&source)
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[1].token_id, "0xt2");
    assert_eq!(outcome.records[0].collection_id.as_deref(), Some("0xc"));
}

#[tokio::test]
async fn owned_tokens_reject_version_cursor() {
    let server = MockServer::start_async().await;
    let client = client(&server);
    let source = OwnedTokens::new(&client, OwnedTokenFilter::owner("0xa"));
    let err = Fetcher::new(options(10, CursorStrategy::AfterVersion))
        .fetch_all(&source)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::UnsupportedCursor(CursorStrategy::AfterVersion)));
}

#[tokio::test]
async fn graphql_errors_surface() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/graphql");
            then.status(200).json_body(json!({
                "errors": [{ "message": "field 'nope' not found" }]
            }));
        })
        .await;

    let err = client(&server).digital_asset("0xt1").await.unwrap_err();
    assert!(matches!(err, ClientError::GraphQl(ref m) if m.contains("nope")));
}

#[tokio::test]
async fn unknown_asset_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/graphql").body_includes("current_token_datas_v2");
            then.status(200).json_body(json!({ "data": { "current_token_datas_v2": [] } }));
        })
        .await;

    let err = client(&server).digital_asset("0xt404").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(ref m) if m.contains("0xt404")));
}

#[tokio::test]
async fn asset_serial_from_properties() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/graphql").body_includes("current_token_datas_v2");
            then.status(200).json_body(json!({ "data": { "current_token_datas_v2": [{
                "token_data_id": "0xt1",
                "token_name": "Moment #42",
                "collection_id": "0xc",
                "supply": "1",
                "token_properties": { "Serial Number": "42" }
            }] } }));
        })
        .await;

    let asset = client(&server).digital_asset("0xt1").await.unwrap();
    assert_eq!(asset.serial_number(), Some(42));
    assert_eq!(asset.supply, Some(1));
}

#[tokio::test]
async fn collection_counters() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/graphql").body_includes("current_collections_v2");
            then.status(200).json_body(json!({ "data": { "current_collections_v2": [{
                "collection_id": "0xc",
                "collection_name": "Moments",
                "creator_address": "0xcreator",
                "total_minted_v2": 100,
                "current_supply": 93
            }] } }));
        })
        .await;

    let data = client(&server).collection_data("0xcreator", "Moments").await.unwrap();
    assert_eq!(data.total_minted, 100);
    assert_eq!(data.current_supply, Some(93));
}
