//! Prelude module - commonly used types for convenient import.
//!
//! Use `use propbag_runtime::prelude::*;` to import all essential types.

pub use crate::{RuntimeError, RuntimeResult, Session, SessionOptions, SessionSnapshot};

// Types that appear in session signatures.
pub use propbag_core::{EntryId, ItemId, Value};
pub use propbag_stock::{ItemNotes, ShopGood};
pub use propbag_store::ArithOp;
