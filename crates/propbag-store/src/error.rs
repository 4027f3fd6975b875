//! Store error types.

use propbag_core::{CoreError, EntryId};

/// Errors from property, alias, and command operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The entry id lies outside the addressable range.
    #[error("invalid entry id {id}")]
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

    /// A sequence-only operation hit a value that is not a sequence.
    #[error("property '{key}' of entry {id} is not a sequence (found {found})")]
    NotASequence {
        /// Entry holding the property.
        id: EntryId,
        /// Normalized property key.
        key: String,
        /// Type name of the value actually stored.
        found: &'static str,
    },

    /// Arithmetic was requested on a value that is not a number.
    #[error("property '{key}' of entry {id} is not a number (found {found})")]
    NotANumber {
        /// Entry holding the property.
        id: EntryId,
        /// Normalized property key.
        key: String,
        /// Type name of the value actually stored.
        found: &'static str,
    },

    /// The arithmetic operand is not a number.
    #[error("arithmetic operand is not a number (found {found})")]
    InvalidOperand {
        /// Type name of the operand.
        found: &'static str,
    },

    /// The arithmetic operation name is not recognised.
    #[error("unknown operation '{0}'; expected one of: add, sub, mul, div, mod")]
    UnknownOperation(String),

    /// The slot holds the alias table and may not be used for data.
    #[error("entry {id} is reserved for alias names")]
    ReservedSlot {
        /// The reserved id.
        id: EntryId,
    },

    /// A name did not resolve to any entry.
    #[error("no entry named '{0}'")]
    UnknownEntry(String),

    /// A positional command was malformed.
    #[error("command '{command}': {message}")]
    Command {
        /// Command name as given.
        command: String,
        /// What was wrong.
        message: String,
    },
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidId { id } => Self::InvalidId { id },
            CoreError::NotAnInteger { token } => Self::NotAnInteger { token },
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
