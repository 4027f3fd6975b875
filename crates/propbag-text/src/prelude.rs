//! Prelude module - commonly used types for convenient import.
//!
//! Use `use propbag_text::prelude::*;` to import all essential types.

pub use crate::{DEFAULT_MACRO_CODE, MacroRef, MacroResolver, PropertySource, TextError, TextResult};
