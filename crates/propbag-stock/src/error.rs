//! Stock error types.

use propbag_core::ItemId;

/// Errors from the restricted capacity formula language.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    /// The source does not parse.
    #[error("syntax error at {position}: {message}")]
    Syntax {
        /// Byte offset of the offending token.
        position: usize,
        /// What the parser expected.
        message: String,
    },

    /// The source exceeds the accepted length.
    #[error("formula is {len} bytes long; the limit is {max}")]
    TooLong {
        /// Actual length.
        len: usize,
        /// Accepted maximum.
        max: usize,
    },

    /// Parentheses or operators nest too deeply.
    #[error("formula nests deeper than {0} levels")]
    TooDeep(usize),

    /// A call names a function the language does not have.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// A function got the wrong number of arguments.
    #[error("{function} takes {expected} argument(s), got {found}")]
    Arity {
        /// Function name.
        function: String,
        /// Human-readable expected count.
        expected: &'static str,
        /// Arguments supplied.
        found: usize,
    },

    /// `v[N]` addressed an id outside the variable range.
    #[error("variable id {0} is out of range")]
    InvalidVariable(i64),

    /// A read produced something that is not a number or boolean.
    #[error("{source_ref} is not a number (found {found})")]
    NotNumeric {
        /// The reference that was read, as written.
        source_ref: String,
        /// Type name of the value found.
        found: &'static str,
    },

    /// The result is infinite or `NaN`.
    #[error("formula result is not a finite number")]
    NotFinite,
}

/// Errors from stock queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StockError {
    /// An item note carries a stock marker whose argument is unusable.
    #[error("item {item}: {message}")]
    InvalidAnnotation {
        /// The item whose note is malformed.
        item: ItemId,
        /// What was wrong.
        message: String,
    },

    /// The item's capacity formula failed.
    #[error("item {item}: {source}")]
    Formula {
        /// The item whose formula failed.
        item: ItemId,
        /// Underlying formula error.
        #[source]
        source: FormulaError,
    },
}

/// Result type for formula evaluation.
pub type FormulaResult<T> = Result<T, FormulaError>;

/// Result type for stock operations.
pub type StockResult<T> = Result<T, StockError>;
