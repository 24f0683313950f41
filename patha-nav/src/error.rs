//! Error types for PathaNav

use thiserror::Error;

/// PathaNav error type
#[derive(Error, Debug)]
pub enum NavError {
    #[error("Connection failed: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Navigation fault: {0}")]
    Fault(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
