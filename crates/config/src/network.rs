use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
    Local,
}

impl Network {
    pub fn node_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.mainnet.aptoslabs.com/v1",
            Self::Testnet => "https://api.testnet.aptoslabs.com/v1",
            Self::Devnet => "https://api.devnet.aptoslabs.com/v1",
            Self::Local => "http://127.0.0.1:8080/v1",
        }
    }

    pub fn indexer_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.mainnet.aptoslabs.com/v1/graphql",
            Self::Testnet => "https://api.testnet.aptoslabs.com/v1/graphql",
            Self::Devnet => "https://api.devnet.aptoslabs.com/v1/graphql",
            Self::Local => "http://127.0.0.1:8090/v1/graphql",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::Devnet => write!(f, "devnet"),
            Self::Local => write!(f, "local"),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    /// Case-insensitive; `NETWORK=MAINNET` and `mainnet` are the same.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "local" | "localnet" => Ok(Self::Local),
            _ => Err(ConfigError::UnknownNetwork(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("MAINNET".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!(" devnet ".parse::<Network>().unwrap(), Network::Devnet);
        assert_eq!("localnet".parse::<Network>().unwrap(), Network::Local);
    }

    #[test]
    fn unknown_network_rejected() {
        assert_eq!(
            "moonnet".parse::<Network>().unwrap_err(),
            ConfigError::UnknownNetwork("moonnet".into())
        );
    }

    #[test]
    fn display_round_trips() {
        for n in [Network::Mainnet, Network::Testnet, Network::Devnet, Network::Local] {
            assert_eq!(n.to_string().parse::<Network>().unwrap(), n);
        }
    }
}
