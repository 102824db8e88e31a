#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::{AppConfig, LoggingConfig, QueryConfig, StoreConfig};

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
