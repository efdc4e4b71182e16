//! Error types for Chatscope core functionality.

use thiserror::Error;

/// Main error type for Chatscope core.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Reading or writing the configuration file failed.
    #[error("File system error: {0}")]
    FileSystem(String),
    /// TOML could not be decoded or encoded.
    #[error("Data parsing error: {0}")]
    Parse(String),
    /// A loaded value is out of range.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for Chatscope core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
