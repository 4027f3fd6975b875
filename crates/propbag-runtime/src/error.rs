//! Runtime error types.

use propbag_stock::StockError;
use propbag_store::StoreError;
use propbag_text::TextError;
use thiserror::Error;

/// Errors that can occur in a session.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Property, alias, or command error.
    #[error(transparent)]
    StoreError(#[from] StoreError),

    /// Stock query error.
    #[error(transparent)]
    StockError(#[from] StockError),

    /// Macro resolver error.
    #[error(transparent)]
    TextError(#[from] TextError),

    /// Configuration could not be turned into session options.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Reading or writing a snapshot file failed.
    #[error("Failed to access session file at {path}: {source}")]
    IoError {
        /// The snapshot path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A snapshot could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
