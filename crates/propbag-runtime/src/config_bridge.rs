//! Bridge from `propbag_config::Config` to domain types.
//!
//! The config crate has no dependencies on other propbag crates. Both the
//! CLI and embedding hosts convert through here so it happens in one place.

use propbag_config::Config;
use propbag_core::{EntryId, KeyPolicy};
use propbag_stock::ShopConfig;
use propbag_telemetry::{LogConfig, LogFormat};
use propbag_text::MacroResolver;

use crate::error::{RuntimeError, RuntimeResult};
use crate::session::SessionOptions;

/// Convert config to the key folding policy.
#[must_use]
pub fn to_key_policy(cfg: &Config) -> KeyPolicy {
    KeyPolicy {
        case_sensitive: cfg.keys.case_sensitive,
    }
}

/// The reserved alias name slot, `None` when tracking is off.
///
/// # Errors
///
/// [`RuntimeError::ConfigError`] when the slot is outside the entry range.
pub fn to_name_slot(cfg: &Config) -> RuntimeResult<Option<EntryId>> {
    if !cfg.aliases.enabled() {
        return Ok(None);
    }
    EntryId::new(i64::from(cfg.aliases.name_slot))
        .map(Some)
        .map_err(|e| RuntimeError::ConfigError(format!("aliases.name_slot: {e}")))
}

/// Convert config to a [`MacroResolver`].
///
/// # Errors
///
/// [`RuntimeError::TextError`] when the macro code is unusable.
pub fn to_macro_resolver(cfg: &Config) -> RuntimeResult<MacroResolver> {
    Ok(MacroResolver::with_code(&cfg.macros.code)?)
}

/// Convert config to [`ShopConfig`].
#[must_use]
pub fn to_shop_config(cfg: &Config) -> ShopConfig {
    ShopConfig {
        display_remaining: cfg.shop.display_remaining,
        hide_sold_out: cfg.shop.hide_sold_out,
        sold_out_message: cfg.shop.sold_out_message.clone(),
        sold_out_color: cfg.shop.sold_out_color,
    }
}

/// Convert config to [`SessionOptions`].
///
/// # Errors
///
/// As [`to_name_slot`] and [`to_macro_resolver`].
pub fn to_session_options(cfg: &Config) -> RuntimeResult<SessionOptions> {
    Ok(SessionOptions {
        policy: to_key_policy(cfg),
        name_slot: to_name_slot(cfg)?,
        macros: to_macro_resolver(cfg)?,
        shop: to_shop_config(cfg),
    })
}

/// Convert config to [`LogConfig`].
#[must_use]
pub fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or_default();

    let mut log_config = LogConfig::new(&cfg.logging.level).with_format(format);
    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }
    log_config
}
