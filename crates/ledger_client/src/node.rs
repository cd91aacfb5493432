//! Node REST endpoints.

use nftledger_core::Transaction;
use serde::Serialize;
use serde_json::{json, Value};

use crate::client::LedgerClient;
use crate::error::ClientError;

pub const APT_COIN: &str = "0x1::aptos_coin::AptosCoin";
pub const OCTAS_PER_APT: u64 = 100_000_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub address: String,
    pub coin_type: String,
    /// Smallest unit.
    pub octas: u64,
    pub apt: f64,
}

impl LedgerClient {
    /// One page of an account's committed transactions, oldest first.
    /// `start` is omitted on the first page.
    pub async fn account_transactions(
        &self,
        address: &str,
        start: Option<u64>,
        limit: u32,
    ) -> Result<Vec<Transaction>, ClientError> {
        let url = self.node(&format!("/accounts/{address}/transactions"));
        let body = self
            .send_json(|http| {
                let req = http.get(&url).query(&[("limit", limit.to_string())]);
                match start {
                    Some(s) => req.query(&[("start", s.to_string())]),
                    None => req,
                }
            })
            .await?;

        let items = body
            .as_array()
            .ok_or_else(|| ClientError::Decode("expected a JSON array of transactions".into()))?;
        items
            .iter()
            .map(|v| Transaction::from_json(v).map_err(ClientError::from))
            .collect()
    }

    /// Committed transaction by hash. A still-pending transaction has no
    /// version and fails normalization.
    pub async fn transaction_by_hash(&self, hash: &str) -> Result<Transaction, ClientError> {
        let url = self.node(&format!("/transactions/by_hash/{hash}"));
        let body = self.send_json(|http| http.get(&url)).await?;
        Ok(Transaction::from_json(&body)?)
    }

    /// Long-polls until the transaction is committed (server-side timeout).
    pub async fn wait_for_transaction(&self, hash: &str) -> Result<Transaction, ClientError> {
        let url = self.node(&format!("/transactions/wait_by_hash/{hash}"));
        let body = self.send_json(|http| http.get(&url)).await?;
        Ok(Transaction::from_json(&body)?)
    }

    /// Coin balance via the `0x1::coin::balance` view function.
    pub async fn account_balance(
        &self,
        address: &str,
        coin_type: &str,
    ) -> Result<AccountBalance, ClientError> {
        let url = self.node("/view");
        let payload = json!({
            "function": "0x1::coin::balance",
            "type_arguments": [coin_type],
            "arguments": [address],
        });
        let body = self.send_json(|http| http.post(&url).json(&payload)).await?;

        let raw = body
            .as_array()
            .and_then(|a| a.first())
            .ok_or_else(|| ClientError::Decode("view returned no values".into()))?;
        let octas = match raw {
            Value::String(s) => s.parse::<u64>().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
        .ok_or_else(|| ClientError::Decode(format!("balance is not an integer: {raw}")))?;

        Ok(AccountBalance {
            address: address.to_string(),
            coin_type: coin_type.to_string(),
            octas,
            apt: octas as f64 / OCTAS_PER_APT as f64,
        })
    }
}
