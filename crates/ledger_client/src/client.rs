//! Shared HTTP plumbing: auth header, status classification, retry.

use std::time::Duration;

use nftledger_config::Settings;
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClientError;

pub const USER_AGENT: &str = concat!("nftl/", env!("CARGO_PKG_VERSION"));

/// Node REST + indexer GraphQL client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    node_url: String,
    indexer_url: String,
    api_key: Option<String>,
    max_retries: u32,
    retry_base: Duration,
}

impl LedgerClient {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            node_url: settings.node_url().trim_end_matches('/').to_string(),
            indexer_url: settings.indexer_url().to_string(),
            api_key: settings.api_key.clone(),
            max_retries: settings.max_retries,
            retry_base: Duration::from_millis(settings.retry_base_delay_ms),
        })
    }

    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    pub fn indexer_url(&self) -> &str {
        &self.indexer_url
    }

    pub(crate) fn node(&self, path: &str) -> String {
        format!("{}{}", self.node_url, path)
    }

    /// Send the request built by `build`, retrying 429 / 5xx / network
    /// failures up to `max_retries` times with exponential backoff.
    ///
    /// `build` is called once per attempt.
    pub(crate) async fn send_json(
        &self,
        build: impl Fn(&reqwest::Client) -> RequestBuilder,
    ) -> Result<Value, ClientError> {
        let attempts = self.max_retries + 1;
        let mut backoff = self.retry_base;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let last = attempt >= attempts;

            let mut req = build(&self.http);
            if let Some(key) = &self.api_key {
                req = req.bearer_auth(key);
            }

            match req.send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    debug!(status, url = %resp.url(), "response");

                    if resp.status().is_success() {
                        return read_json(resp).await;
                    }

                    // Retryable: 429, 5xx
                    if status == 429 || status >= 500 {
                        if last {
                            if status == 429 {
                                return Err(ClientError::RateLimited { attempts });
                            }
                            let message = error_message(resp).await;
                            return Err(ClientError::Upstream { status, message });
                        }
                        let wait = if status == 429 { retry_after(&resp).unwrap_or(backoff) } else { backoff };
                        warn!(attempt, of = attempts, wait_ms = wait.as_millis() as u64, status, "retrying");
                        tokio::time::sleep(wait).await;
                        backoff *= 2;
                        continue;
                    }

                    let message = error_message(resp).await;
                    return Err(match status {
                        401 | 403 => ClientError::Auth { status, message },
                        400 => ClientError::Validation { status, message },
                        404 => ClientError::NotFound(message),
                        _ => ClientError::Upstream { status, message },
                    });
                }
                Err(e) => {
                    if last {
                        return Err(ClientError::Network(e.to_string()));
                    }
                    warn!(attempt, of = attempts, wait_ms = backoff.as_millis() as u64, error = %e, "retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }
}

async fn read_json(resp: Response) -> Result<Value, ClientError> {
    let text = resp.text().await.map_err(|e| ClientError::Decode(e.to_string()))?;
    serde_json::from_str(&text)
        .map_err(|e| ClientError::Decode(format!("{e} (body: {})", snippet(&text))))
}

/// `message` from an API error body, else the start of the raw body.
async fn error_message(resp: Response) -> String {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("no body").to_string()
            } else {
                snippet(&text).to_string()
            }
        })
}

fn retry_after(resp: &Response) -> Option<Duration> {
    resp.headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn snippet(text: &str) -> &str {
    let end = text.char_indices().nth(200).map(|(i, _)| i).unwrap_or(text.len());
    &text[..end]
}
