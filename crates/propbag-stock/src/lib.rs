//! Propbag Stock - Global purchase limits for shop items.
//!
//! Items opt in through a marker in their note: a literal capacity, a host
//! variable holding the capacity, or a small formula computing it. The
//! [`StockLedger`] counts purchases and answers whether an item is sold out;
//! [`Shop`] wraps the ledger with the questions a shop screen asks.
//!
//! # Example
//!
//! ```
//! use propbag_core::{ItemId, KeyPolicy};
//! use propbag_stock::{ItemNotes, Shop, ShopConfig, StockLedger};
//! use propbag_store::{AliasIndex, PropertyStore, StoreView, Variables};
//!
//! let notes = ItemNotes::new().with(1, "<GStocks: 3>");
//! let store = PropertyStore::new(Variables::new(), KeyPolicy::default());
//! let aliases = AliasIndex::default();
//! let ctx = StoreView::new(&aliases, &store);
//! let config = ShopConfig::default();
//!
//! let mut ledger = StockLedger::new();
//! let mut shop = Shop::new(&mut ledger, &notes, &ctx, &config);
//! let gem = ItemId::new(1);
//! assert_eq!(shop.max_buy(gem, 99, 100, 250).unwrap(), 2);
//! shop.record_purchase(gem, 2);
//! assert_eq!(shop.quantity_label(gem, 1).unwrap(), "1/1");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod annotation;
pub mod catalog;
pub mod error;
pub mod formula;
pub mod ledger;
pub mod shop;

pub use annotation::{MarkerKind, StockRule};
pub use catalog::{ItemCatalog, ItemNotes};
pub use error::{FormulaError, FormulaResult, StockError, StockResult};
pub use formula::{EvalContext, Formula, MAX_FORMULA_DEPTH, MAX_FORMULA_LEN};
pub use ledger::{LedgerSnapshot, StockKeyed, StockLedger};
pub use shop::{GoodKind, Shop, ShopConfig, ShopGood, SoldOutBadge};
