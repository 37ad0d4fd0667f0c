//! Error types for persistence.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing saved data.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage failed.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A logical key cannot be mapped onto the backing storage.
    #[error("invalid key: \"{0}\"")]
    InvalidKey(String),

    /// A settings value could not be parsed.
    #[error("invalid value for {key}: \"{value}\"")]
    InvalidValue {
        /// Settings key.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// A settings key is not recognized.
    #[error("unknown setting: {0}")]
    UnknownSetting(String),
}
