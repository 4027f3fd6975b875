//! Boundary validation errors.

use thiserror::Error;

use crate::id::{MAX_ENTRY_ID, MIN_ENTRY_ID};

/// Errors raised when host-supplied input fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The entry id lies outside the addressable range.
    #[error("invalid entry id {id}: must be between {MIN_ENTRY_ID} and {MAX_ENTRY_ID}")]
    InvalidId {
        /// The rejected id.
        id: i64,
    },

    /// A token that had to be an integer was not one.
    #[error("not an integer: '{token}'")]
    NotAnInteger {
        /// The offending token.
        token: String,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
