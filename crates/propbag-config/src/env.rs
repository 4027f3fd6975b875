//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only fill fields that no
//! config file set.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::{debug, warn};

use crate::merge::{ConfigLayer, FieldSources};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `PROPBAG_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "PROPBAG_CASE_SENSITIVE",
        field_path: "keys.case_sensitive",
    },
    EnvMapping {
        var_name: "PROPBAG_NAME_SLOT",
        field_path: "aliases.name_slot",
    },
    EnvMapping {
        var_name: "PROPBAG_MACRO_CODE",
        field_path: "macros.code",
    },
    EnvMapping {
        var_name: "PROPBAG_SHOP_DISPLAY_REMAINING",
        field_path: "shop.display_remaining",
    },
    EnvMapping {
        var_name: "PROPBAG_SHOP_HIDE_SOLD_OUT",
        field_path: "shop.hide_sold_out",
    },
    EnvMapping {
        var_name: "PROPBAG_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "PROPBAG_LOG_FORMAT",
        field_path: "logging.format",
    },
];

/// Apply environment variable fallbacks to fields that were **not** set by
/// any config file layer.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults)
        {
            continue;
        }
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        if set_field(merged, mapping.field_path, coerce(raw)) {
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        } else {
            warn!(field = mapping.field_path, "env var target is not a table field");
        }
    }

    count
}

/// Booleans and integers keep their type; anything else stays a string.
fn coerce(raw: &str) -> toml::Value {
    let trimmed = raw.trim();
    if let Ok(b) = trimmed.parse::<bool>() {
        return toml::Value::Boolean(b);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return toml::Value::Integer(n);
    }
    toml::Value::String(raw.to_owned())
}

/// Set a dotted field, creating intermediate tables. Returns `false` when
/// the path runs through a non-table value.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) -> bool {
    let (parents, leaf) = path.rsplit_once('.').unwrap_or(("", path));

    let mut current = root;
    for segment in parents.split('.').filter(|s| !s.is_empty()) {
        let Some(table) = current.as_table_mut() else {
            return false;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    match current.as_table_mut() {
        Some(table) => {
            table.insert(leaf.to_owned(), value);
            true
        },
        None => false,
    }
}
