//! Propbag Test - Shared test utilities for propbag.
//!
//! Fixtures, a recording variable store and a small harness, used across
//! the workspace as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! propbag-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use propbag_test::prelude::*;
//!
//! #[test]
//! fn test_gem_sells_out() {
//!     let mut session = test_session();
//!     session.record_purchase(GEM, 3);
//!     assert!(session.has_bought_max(GEM).unwrap());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
