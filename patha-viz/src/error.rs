//! Error types for PathaViz

use thiserror::Error;

/// PathaViz error type
#[derive(Error, Debug)]
pub enum VizError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for VizError {
    fn from(e: toml::de::Error) -> Self {
        VizError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VizError>;
