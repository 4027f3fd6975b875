//! Layer tracking and deep merging of TOML trees.

use std::collections::HashMap;
use std::fmt;

/// Where a configuration value came from, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Embedded `defaults.toml`.
    Defaults,
    /// `~/.propbag/config.toml`.
    User,
    /// A file named on the command line.
    Explicit,
    /// A `PROPBAG_*` environment variable.
    Environment,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Defaults => "defaults",
            Self::User => "user",
            Self::Explicit => "explicit",
            Self::Environment => "env",
        };
        f.write_str(name)
    }
}

/// Dotted field path to the layer that last set it.
pub type FieldSources = HashMap<String, ConfigLayer>;

/// Deep-merge `overlay` into `base`, recording which layer set each leaf
/// field. `prefix` is the dotted path prefix of `base`.
///
/// Tables merge per field; scalars and arrays from the overlay replace the
/// base value.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = join_path(prefix, key);
                if let Some(base_val) = base_table.get_mut(key) {
                    if overlay_val.is_table() {
                        deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                    } else {
                        *base_val = overlay_val.clone();
                        sources.insert(path, layer);
                    }
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                    record_leaves(overlay_val, &path, layer, sources);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            sources.insert(prefix.to_owned(), layer);
        },
    }
}

/// Walk a value tree and record every leaf path as set by `layer`.
pub fn record_leaves(
    val: &toml::Value,
    prefix: &str,
    layer: ConfigLayer,
    sources: &mut FieldSources,
) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &join_path(prefix, key), layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer);
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_overlay_replaces_leaves_and_keeps_siblings() {
        let mut base = parse("[shop]\nhide_sold_out = true\nsold_out_color = 18\n");
        let overlay = parse("[shop]\nsold_out_color = 3\n");
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", ConfigLayer::User, &mut sources);

        assert_eq!(base["shop"]["sold_out_color"].as_integer(), Some(3));
        assert_eq!(base["shop"]["hide_sold_out"].as_bool(), Some(true));
        assert_eq!(sources.get("shop.sold_out_color"), Some(&ConfigLayer::User));
        assert!(!sources.contains_key("shop.hide_sold_out"));
    }

    #[test]
    fn test_new_tables_record_all_leaves() {
        let mut base = parse("[keys]\ncase_sensitive = false\n");
        let overlay = parse("[macros]\ncode = \"NOTE\"\n");
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", ConfigLayer::Explicit, &mut sources);

        assert_eq!(base["macros"]["code"].as_str(), Some("NOTE"));
        assert_eq!(sources.get("macros.code"), Some(&ConfigLayer::Explicit));
    }

    #[test]
    fn test_arrays_replace() {
        let mut base = parse("[logging]\ndirectives = [\"a=debug\", \"b=warn\"]\n");
        let overlay = parse("[logging]\ndirectives = [\"c=trace\"]\n");
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", ConfigLayer::User, &mut sources);

        let directives = base["logging"]["directives"].as_array().unwrap();
        assert_eq!(directives.len(), 1);
    }

    #[test]
    fn test_layer_display() {
        assert_eq!(ConfigLayer::Defaults.to_string(), "defaults");
        assert_eq!(ConfigLayer::Environment.to_string(), "env");
    }
}
