//! Runtime configuration, resolved once at startup and passed down
//! explicitly. Nothing here reads global state after `Settings` is built.

pub mod error;
pub mod network;
pub mod settings;

pub use error::ConfigError;
pub use network::Network;
pub use settings::Settings;
