//! Error types for Spiralkeep

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("storage error: {key} - {message}")]
    Storage { key: String, message: String },

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("invalid consensus threshold: {0} (expected 0 < t <= 1)")]
    InvalidThreshold(f64),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }
}
