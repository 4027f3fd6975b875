//! Prelude module - commonly used types for convenient import.
//!
//! Use `use propbag_stock::prelude::*;` to import all essential types.

// Errors
pub use crate::{FormulaError, StockError, StockResult};

// Host seams
pub use crate::{EvalContext, ItemCatalog, ItemNotes};

// Ledger and shops
pub use crate::{Formula, Shop, ShopConfig, ShopGood, StockKeyed, StockLedger, StockRule};
