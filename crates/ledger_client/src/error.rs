use std::fmt;

use nftledger_core::NormalizeError;

/// Error type for ledger API calls.
#[derive(Debug)]
pub enum ClientError {
    /// Client could not be constructed (bad URL, TLS setup).
    Build(String),
    /// Connection / timeout, after any retries
    Network(String),
    /// Rejected credentials (401/403)
    Auth { status: u16, message: String },
    /// Request rejected as malformed (400)
    Validation { status: u16, message: String },
    /// The requested entity does not exist (404, or an empty GraphQL lookup)
    NotFound(String),
    /// Still rate limited (429) after retries
    RateLimited { attempts: u32 },
    /// Other 4xx, or 5xx after retries
    Upstream { status: u16, message: String },
    /// Body is not the JSON shape we expect
    Decode(String),
    /// GraphQL `errors` array in a 200 response
    GraphQl(String),
    /// Response record failed boundary normalization
    Normalize(NormalizeError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build(msg) => write!(f, "cannot build HTTP client: {msg}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Auth { status, message } => write!(f, "auth failed ({status}): {message}"),
            Self::Validation { status, message } => write!(f, "request rejected ({status}): {message}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::RateLimited { attempts } => write!(f, "rate limited after {attempts} attempt(s)"),
            Self::Upstream { status, message } => write!(f, "upstream error ({status}): {message}"),
            Self::Decode(msg) => write!(f, "unexpected response: {msg}"),
            Self::GraphQl(msg) => write!(f, "indexer query failed: {msg}"),
            Self::Normalize(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Normalize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NormalizeError> for ClientError {
    fn from(e: NormalizeError) -> Self {
        Self::Normalize(e)
    }
}
