//! Propbag Text - Macro substitution in display text.
//!
//! Display text may carry `\VOBJ[LEFT:RIGHT]` tokens. `LEFT` is an entry id
//! or alias, `RIGHT` a property key. [`MacroResolver::render`] replaces each
//! token with the display form of that property, or `undefined` when any
//! step of the lookup comes up empty.
//!
//! # Example
//!
//! ```
//! use propbag_core::KeyPolicy;
//! use propbag_store::{AliasIndex, PropertyStore, StoreView, Variables};
//! use propbag_text::MacroResolver;
//!
//! let policy = KeyPolicy::case_insensitive();
//! let mut store = PropertyStore::new(Variables::new(), policy);
//! store.set_property(1, "a", 4).unwrap();
//! let aliases = AliasIndex::new(policy);
//!
//! let resolver = MacroResolver::default();
//! let source = StoreView::new(&aliases, &store);
//! assert_eq!(resolver.render(r"HP: \VOBJ[1:A]", &source), "HP: 4");
//! assert_eq!(resolver.render(r"\VOBJ[nobody:a]", &source), "undefined");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod error;
pub mod macros;

pub use error::{TextError, TextResult};
pub use macros::{DEFAULT_MACRO_CODE, MacroRef, MacroResolver, PropertySource};
