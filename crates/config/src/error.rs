use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file exists but could not be read.
    Read { path: PathBuf, message: String },
    /// TOML parse / deserialization error.
    Parse { path: Option<PathBuf>, message: String },
    /// `NETWORK` (or `network =`) names no known network.
    UnknownNetwork(String),
    /// An environment override that does not parse.
    Env { var: &'static str, value: String },
    /// A setting with an unusable value.
    Invalid { field: &'static str, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "cannot read config {}: {message}", path.display())
            }
            Self::Parse { path: Some(path), message } => {
                write!(f, "config parse error in {}: {message}", path.display())
            }
            Self::Parse { path: None, message } => write!(f, "config parse error: {message}"),
            Self::UnknownNetwork(name) => {
                write!(f, "unknown network '{name}' (expected mainnet, testnet, devnet, local)")
            }
            Self::Env { var, value } => write!(f, "{var}: invalid value '{value}'"),
            Self::Invalid { field, message } => write!(f, "{field}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}
