//! Indexer GraphQL queries.

use nftledger_core::{AssetData, CollectionData, OwnedToken};
use serde_json::{json, Value};
use tracing::debug;

use crate::client::LedgerClient;
use crate::error::ClientError;

const OWNED_TOKENS: &str = r#"
query OwnedTokens($where: current_token_ownerships_v2_bool_exp!, $limit: Int!, $offset: Int!) {
  current_token_ownerships_v2(where: $where, limit: $limit, offset: $offset) {
    token_data_id
    amount
    current_token_data {
      token_name
      token_uri
      collection_id
      current_collection { collection_id collection_name }
    }
  }
}"#;

const DIGITAL_ASSET: &str = r#"
query DigitalAsset($id: String!) {
  current_token_datas_v2(where: { token_data_id: { _eq: $id } }) {
    token_data_id
    token_standard
    token_name
    token_uri
    description
    collection_id
    supply
    maximum
    largest_property_version_v1
    token_properties
  }
}"#;

const COLLECTION: &str = r#"
query Collection($creator: String!, $name: String!) {
  current_collections_v2(
    where: { creator_address: { _eq: $creator }, collection_name: { _eq: $name } }
  ) {
    collection_id
    collection_name
    creator_address
    total_minted_v2
    current_supply
  }
}"#;

/// Which ownership rows to list: non-zero holdings of `owner`, optionally
/// restricted to one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTokenFilter {
    pub owner: String,
    pub collection_id: Option<String>,
}

impl OwnedTokenFilter {
    pub fn owner(owner: impl Into<String>) -> Self {
        Self { owner: owner.into(), collection_id: None }
    }

    pub fn in_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    fn to_where(&self) -> Value {
        let mut clause = json!({
            "owner_address": { "_eq": self.owner },
            "amount": { "_gt": 0 },
        });
        if let Some(id) = &self.collection_id {
            clause["current_token_data"] = json!({ "collection_id": { "_eq": id } });
        }
        clause
    }
}

impl LedgerClient {
    /// POST a GraphQL query; returns the `data` object.
    pub async fn graphql(&self, query: &str, variables: Value) -> Result<Value, ClientError> {
        let body = json!({ "query": query, "variables": variables });
        let url = self.indexer_url().to_string();
        let mut response = self.send_json(|http| http.post(&url).json(&body)).await?;

        if let Some(errors) = response.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let messages: Vec<&str> = errors
                    .iter()
                    .map(|e| e.get("message").and_then(Value::as_str).unwrap_or("unknown error"))
                    .collect();
                return Err(ClientError::GraphQl(messages.join("; ")));
            }
        }

        match response.get_mut("data").map(Value::take) {
            Some(Value::Null) | None => Err(ClientError::Decode("GraphQL response has no data".into())),
            Some(data) => Ok(data),
        }
    }

    /// One page of ownership rows.
    pub async fn owned_tokens(
        &self,
        filter: &OwnedTokenFilter,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<OwnedToken>, ClientError> {
        let vars = json!({ "where": filter.to_where(), "limit": limit, "offset": offset });
        let data = self.graphql(OWNED_TOKENS, vars).await?;
        let rows = rows(&data, "current_token_ownerships_v2")?;
        debug!(owner = %filter.owner, offset, rows = rows.len(), "ownership page");
        rows.iter().map(|v| OwnedToken::from_json(v).map_err(ClientError::from)).collect()
    }

    /// Full descriptive data for one asset. Unknown id is `NotFound`.
    pub async fn digital_asset(&self, token_id: &str) -> Result<AssetData, ClientError> {
        let data = self.graphql(DIGITAL_ASSET, json!({ "id": token_id })).await?;
        let first = rows(&data, "current_token_datas_v2")?
            .first()
            .ok_or_else(|| ClientError::NotFound(format!("digital asset {token_id}")))?;
        Ok(AssetData::from_json(first)?)
    }

    /// Collection counters by creator + name. Unknown collection is `NotFound`.
    pub async fn collection_data(&self, creator: &str, name: &str) -> Result<CollectionData, ClientError> {
        let data = self
            .graphql(COLLECTION, json!({ "creator": creator, "name": name }))
            .await?;
        let first = rows(&data, "current_collections_v2")?
            .first()
            .ok_or_else(|| ClientError::NotFound(format!("collection '{name}' by {creator}")))?;
        Ok(CollectionData::from_json(first)?)
    }
}

fn rows<'a>(data: &'a Value, table: &str) -> Result<&'a Vec<Value>, ClientError> {
    data.get(table)
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::Decode(format!("missing '{table}' in GraphQL data")))
}
