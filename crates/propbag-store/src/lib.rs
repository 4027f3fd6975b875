//! Propbag Store - Property bags layered on a host variable store.
//!
//! This crate provides:
//! - [`VariableStore`], the seam to the host's id-addressed storage, and
//!   [`Variables`], an in-memory implementation
//! - [`PropertyStore`], which promotes slots to bags of named properties
//! - [`AliasIndex`], user-chosen names for entry ids
//! - [`ArithOp`] and [`PropertyStore::change_property`] for in-place arithmetic
//! - [`Command`], positional host commands
//! - [`StoreView`], read-only id-or-alias lookups
//!
//! # Example
//!
//! ```
//! use propbag_core::{EntryId, KeyPolicy, Value};
//! use propbag_store::{AliasIndex, ArithOp, PropertyStore, Variables};
//!
//! let policy = KeyPolicy::case_insensitive();
//! let mut store = PropertyStore::new(Variables::new(), policy);
//! let mut aliases = AliasIndex::new(policy);
//!
//! store.set_property(2, "HP", 30).unwrap();
//! aliases.upsert(EntryId::new(2).unwrap(), "Hero");
//!
//! let hero = aliases.resolve("hero").unwrap();
//! store.change_property(ArithOp::Sub, 5, hero, "hp").unwrap();
//! assert_eq!(store.get_property(hero, "hp").unwrap(), Value::Int(25));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod alias;
pub mod arith;
pub mod bag;
pub mod command;
pub mod error;
pub mod variables;
pub mod view;

pub use alias::{AliasIndex, AliasRecord, VariableNames};
pub use arith::ArithOp;
pub use bag::PropertyStore;
pub use command::Command;
pub use error::{StoreError, StoreResult};
pub use variables::{PropertyBag, Slot, VariableStore, Variables};
pub use view::StoreView;
