//! Configuration errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Where TOML being parsed came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TomlOrigin {
    /// The embedded defaults.
    Defaults,
    /// All layers merged, checked against the typed config.
    Merged,
    /// A file on disk.
    File(PathBuf),
}

impl std::fmt::Display for TomlOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => f.write_str("built-in defaults"),
            Self::Merged => f.write_str("merged configuration"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Errors loading or checking propbag configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A config file named with `--config` does not exist.
    #[error("config file {} does not exist", .0.display())]
    Missing(PathBuf),

    /// A config file is larger than propbag accepts.
    #[error("config file {} is {len} bytes; the limit is {max}", path.display())]
    TooLarge {
        /// The file.
        path: PathBuf,
        /// Its size.
        len: u64,
        /// Accepted maximum.
        max: u64,
    },

    /// TOML that does not parse, or does not fit the config's shape.
    #[error("invalid TOML in {origin}: {source}")]
    Parse {
        /// Where the TOML came from.
        origin: TomlOrigin,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A setting holds a value propbag cannot use.
    #[error("{field}: {message}")]
    Invalid {
        /// Dotted setting name, e.g. `aliases.name_slot`.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// No home directory to place `~/.propbag` in.
    #[error("cannot locate a home directory; set PROPBAG_HOME or pass --home")]
    NoHomeDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_source() {
        let err = ConfigError::Missing(PathBuf::from("/etc/propbag.toml"));
        assert_eq!(err.to_string(), "config file /etc/propbag.toml does not exist");

        let err = ConfigError::Invalid {
            field: "shop.sold_out_color",
            message: "colour index 40 is out of range 0..=31".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "shop.sold_out_color: colour index 40 is out of range 0..=31"
        );

        let source = toml::from_str::<toml::Value>("a = ").unwrap_err();
        let err = ConfigError::Parse {
            origin: TomlOrigin::Defaults,
            source,
        };
        assert!(err.to_string().starts_with("invalid TOML in built-in defaults: "));
    }
}
