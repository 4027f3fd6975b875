//! Prelude module - commonly used types for convenient import.
//!
//! Use `use propbag_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{CoreError, CoreResult};

// Identifiers
pub use crate::{EntryId, IntoEntryId, ItemId, MAX_ENTRY_ID, MIN_ENTRY_ID};

// Keys and values
pub use crate::{CREATE_SEQUENCE, KeyPolicy, Value};
