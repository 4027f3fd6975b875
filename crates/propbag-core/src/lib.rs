//! Propbag Core - Foundation types shared by every propbag crate.
//!
//! This crate provides:
//! - [`EntryId`] and [`ItemId`], the two identifier spaces the host hands us
//! - [`Value`], the closed set of values a property can hold
//! - [`KeyPolicy`], the case-folding rule applied to keys and alias names
//! - The [`CoreError`] type for boundary validation failures
//!
//! # Example
//!
//! ```
//! use propbag_core::{EntryId, KeyPolicy, Value};
//!
//! let id = EntryId::new(12).unwrap();
//! assert_eq!(id.get(), 12);
//! assert!(EntryId::new(10_000).is_err());
//!
//! let policy = KeyPolicy::case_insensitive();
//! assert_eq!(policy.normalize("Salt"), "salt");
//! assert_eq!(policy.normalize("1E5"), "1E5");
//!
//! assert_eq!(Value::from(4).to_string(), "4");
//! assert_eq!(Value::Undefined.to_string(), "undefined");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod error;
pub mod id;
pub mod key;
pub mod value;

pub use error::{CoreError, CoreResult};
pub use id::{EntryId, IntoEntryId, ItemId, MAX_ENTRY_ID, MIN_ENTRY_ID, parse_integer_token};
pub use key::{KeyPolicy, is_numeric_token};
pub use value::{CREATE_SEQUENCE, Value};
