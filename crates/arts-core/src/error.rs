//! # Error Types
//!
//! Typed error handling for the fine-arts API.
//! Store, token and payment operations all return `Result<T, ArtsError>`.

use thiserror::Error;

/// Core error type for all fine-arts operations
#[derive(Debug, Error)]
pub enum ArtsError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A path segment that should hold a store id does not parse as one
    #[error("Invalid document id: {id}")]
    InvalidId { id: String },

    /// Missing, malformed or expired bearer token
    #[error("Unauthorized access")]
    Unauthorized,

    /// Document store rejected the operation or was unreachable
    #[error("Store error [{collection}]: {message}")]
    Store { collection: String, message: String },

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArtsError {
    /// Shorthand for a store failure on a named collection
    pub fn store(collection: impl Into<String>, message: impl ToString) -> Self {
        ArtsError::Store {
            collection: collection.into(),
            message: message.to_string(),
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ArtsError::Configuration(_) => 500,
            ArtsError::InvalidRequest(_) => 400,
            ArtsError::InvalidId { .. } => 400,
            ArtsError::Unauthorized => 401,
            ArtsError::Store { .. } => 500,
            ArtsError::ProviderError { .. } => 502,
            ArtsError::NetworkError(_) => 503,
            ArtsError::Serialization(_) => 500,
            ArtsError::Internal(_) => 500,
        }
    }
}

impl From<bson::ser::Error> for ArtsError {
    fn from(err: bson::ser::Error) -> Self {
        ArtsError::Serialization(err.to_string())
    }
}

/// Result type alias for fine-arts operations
pub type ArtsResult<T> = Result<T, ArtsError>;
