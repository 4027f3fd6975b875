//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Highest entry id a host variable can have.
pub const MAX_ENTRY_ID: u32 = 9999;

/// Highest text colour index.
pub const MAX_COLOR_INDEX: u8 = 31;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a fully merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_aliases(config)?;
    validate_macros(config)?;
    validate_shop(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_aliases(config: &Config) -> ConfigResult<()> {
    if config.aliases.name_slot > MAX_ENTRY_ID {
        return Err(ConfigError::Invalid {
            field: "aliases.name_slot",
            message: format!(
                "name_slot {} is out of range; use 0 to disable or 1..={MAX_ENTRY_ID}",
                config.aliases.name_slot
            ),
        });
    }
    Ok(())
}

fn validate_macros(config: &Config) -> ConfigResult<()> {
    let code = &config.macros.code;
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Invalid {
            field: "macros.code",
            message: format!("macro code '{code}' must be non-empty ASCII letters or digits"),
        });
    }
    Ok(())
}

fn validate_shop(config: &Config) -> ConfigResult<()> {
    if config.shop.sold_out_color > MAX_COLOR_INDEX {
        return Err(ConfigError::Invalid {
            field: "shop.sold_out_color",
            message: format!(
                "colour index {} is out of range 0..={MAX_COLOR_INDEX}",
                config.shop.sold_out_color
            ),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;
    if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
        return Err(ConfigError::Invalid {
            field: "logging.level",
            message: format!(
                "unknown level '{}'; expected one of: {}",
                logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }
    if !LOG_FORMATS.contains(&logging.format.as_str()) {
        return Err(ConfigError::Invalid {
            field: "logging.format",
            message: format!(
                "unknown format '{}'; expected one of: {}",
                logging.format,
                LOG_FORMATS.join(", ")
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> &'static str {
        match result {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        validate(&Config::default()).unwrap();
    }

    #[test]
    fn test_name_slot_bounds() {
        let mut config = Config::default();
        config.aliases.name_slot = MAX_ENTRY_ID;
        validate(&config).unwrap();

        config.aliases.name_slot = 10_000;
        assert_eq!(field_of(validate(&config)), "aliases.name_slot");
    }

    #[test]
    fn test_macro_code() {
        let mut config = Config::default();
        for bad in ["", "V OBJ", "V[", "ÜBER"] {
            config.macros.code = bad.to_owned();
            assert_eq!(field_of(validate(&config)), "macros.code", "{bad:?}");
        }
        config.macros.code = "Note2".to_owned();
        validate(&config).unwrap();
    }

    #[test]
    fn test_sold_out_color() {
        let mut config = Config::default();
        config.shop.sold_out_color = 32;
        assert_eq!(field_of(validate(&config)), "shop.sold_out_color");
    }

    #[test]
    fn test_logging() {
        let mut config = Config::default();
        config.logging.level = "WARN".to_owned();
        validate(&config).unwrap();

        config.logging.level = "loud".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");

        config.logging.level = "info".to_owned();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }
}
