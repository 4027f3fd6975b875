//! Prelude module - commonly used types for convenient import.
//!
//! Use `use propbag_store::prelude::*;` to import all essential types.

// Errors
pub use crate::{StoreError, StoreResult};

// Host storage
pub use crate::{PropertyBag, Slot, VariableStore, Variables};

// Bags, aliases and mutation
pub use crate::{AliasIndex, AliasRecord, ArithOp, Command, PropertyStore, StoreView, VariableNames};
