//! Propbag Runtime - The session a host owns.
//!
//! [`Session`] ties the property store, alias index, macro resolver and
//! stock ledger together behind one `&mut` entry point, builds itself from
//! [`propbag_config::Config`] through [`config_bridge`], and saves to JSON
//! through [`SessionSnapshot`].
//!
//! # Example
//!
//! ```
//! use propbag_core::ItemId;
//! use propbag_runtime::Session;
//! use propbag_stock::ItemNotes;
//!
//! let notes = ItemNotes::new().with(3, "<GStocks Eval: v[5] * 2>");
//! let mut session = Session::new().with_notes(notes);
//! let bread = ItemId::new(3);
//!
//! session.set_variable(5, 1).unwrap();
//! assert!(session.record_purchase(bread, 2));
//! assert!(session.has_bought_max(bread).unwrap());
//!
//! session.set_variable(5, 2).unwrap();
//! assert!(!session.has_bought_max(bread).unwrap());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod config_bridge;
mod error;
mod session;
mod snapshot;

pub use error::{RuntimeError, RuntimeResult};
pub use session::{Session, SessionOptions};
pub use snapshot::SessionSnapshot;
