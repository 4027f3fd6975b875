//! Text error types.

/// Errors from building a macro resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The macro code is empty or contains characters other than ASCII
    /// letters and digits.
    #[error("invalid macro code '{0}': expected ASCII letters and digits")]
    InvalidCode(String),

    /// The generated pattern failed to compile.
    #[error("macro pattern error: {0}")]
    Pattern(String),
}

/// Result type for text operations.
pub type TextResult<T> = Result<T, TextError>;
