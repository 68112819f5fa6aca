use std::path::PathBuf;

use thiserror::Error;

/// Startup configuration problems. All of these are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    MissingToken(&'static str),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Failure of an outbound gateway call. Never retried here; the caller decides.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),

    #[error("Gateway error: {0}")]
    Gateway(String),
}
