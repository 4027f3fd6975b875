#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Layered configuration for propbag.
//!
//! A single [`Config`] type covers key folding, alias tracking, macro
//! syntax, shop display, and logging.
//!
//! # Usage
//!
//! ```rust,no_run
//! use propbag_config::Config;
//!
//! let resolved = Config::load(None, None).unwrap();
//! println!("macro code: {}", resolved.config.macros.code);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit** file passed on the command line
//! 2. **User** (`~/.propbag/config.toml`)
//! 3. **Environment variables** (`PROPBAG_*`), fallback only
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate has no dependencies on other propbag crates. Conversion into
//! domain types lives in `propbag-runtime`.

pub mod prelude;

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging with precedence.
pub mod merge;
/// Resolved configuration display.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult, TomlOrigin};
pub use merge::{ConfigLayer, FieldSources};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// `propbag_home` replaces `~/.propbag` when given.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any file cannot be read or parsed, or if
    /// validation fails.
    pub fn load(
        explicit: Option<&std::path::Path>,
        propbag_home: Option<&std::path::Path>,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, propbag_home)
    }

    /// Load a single file with no layering.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
