//! Configuration types.
//!
//! Every struct implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a bare `[section]` header still yields a working
//! configuration. Conversion into domain types happens in the runtime crate.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key folding.
    pub keys: KeysSection,
    /// Alias tracking.
    pub aliases: AliasesSection,
    /// Macro token syntax.
    pub macros: MacrosSection,
    /// Shop display of limited stock.
    pub shop: ShopSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// KeysSection
// ---------------------------------------------------------------------------

/// How property keys and alias names are compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysSection {
    /// Keep keys as written instead of folding them to lowercase.
    pub case_sensitive: bool,
}

// ---------------------------------------------------------------------------
// AliasesSection
// ---------------------------------------------------------------------------

/// Alias tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasesSection {
    /// Variable whose value names the entry being written. `0` turns alias
    /// tracking off; any other value reserves that variable.
    pub name_slot: u32,
}

impl AliasesSection {
    /// Whether alias tracking is on.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.name_slot != 0
    }
}

// ---------------------------------------------------------------------------
// MacrosSection
// ---------------------------------------------------------------------------

/// Macro token syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacrosSection {
    /// Code between the escape character and the bracket, e.g. `VOBJ` in
    /// `\VOBJ[hero:level]`.
    pub code: String,
}

impl Default for MacrosSection {
    fn default() -> Self {
        Self {
            code: "VOBJ".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// ShopSection
// ---------------------------------------------------------------------------

/// How shops present limited-stock items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSection {
    /// Show `owned/remaining` instead of the plain owned count.
    pub display_remaining: bool,
    /// Drop sold-out items from shop lists.
    pub hide_sold_out: bool,
    /// Text drawn over a sold-out entry.
    pub sold_out_message: String,
    /// Text colour index for the sold-out message.
    pub sold_out_color: u8,
}

impl Default for ShopSection {
    fn default() -> Self {
        Self {
            display_remaining: true,
            hide_sold_out: true,
            sold_out_message: "OUT OF STOCK".to_owned(),
            sold_out_color: 18,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["propbag_stock=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
