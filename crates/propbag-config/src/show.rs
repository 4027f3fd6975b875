//! Source-annotated display for `config show`.
//!
//! Prints the resolved configuration with a comment after each value naming
//! the layer that set it.

use std::fmt::{self, Write as _};

use crate::merge::FieldSources;
use crate::types::Config;

/// A resolved configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config file paths that were loaded (in precedence order).
    pub loaded_files: Vec<String>,
}

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with inline comments showing source.
    Toml,
    /// JSON (for programmatic consumption).
    Json,
}

impl ResolvedConfig {
    /// Format the resolved config, optionally restricted to one section.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the section is unknown.
    pub fn show(&self, format: ShowFormat, section: Option<&str>) -> Result<String, fmt::Error> {
        let value = toml::Value::try_from(&self.config).map_err(|_| fmt::Error)?;
        let value = match section {
            Some(name) => {
                let table = value.as_table().ok_or(fmt::Error)?;
                table.get(name).cloned().ok_or(fmt::Error)?
            },
            None => value,
        };
        match format {
            ShowFormat::Toml => self.show_toml(&value, section),
            ShowFormat::Json => serde_json::to_string_pretty(&value).map_err(|_| fmt::Error),
        }
    }

    fn show_toml(&self, value: &toml::Value, section: Option<&str>) -> Result<String, fmt::Error> {
        let toml_str = toml::to_string_pretty(value).map_err(|_| fmt::Error)?;

        let mut output = String::new();
        output.push_str("# Resolved propbag configuration\n");
        output.push_str("# Source annotations: [defaults] [user] [explicit] [env]\n");
        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files (in precedence order):\n");
            for (i, path) in self.loaded_files.iter().enumerate() {
                writeln!(output, "#   {}. {path}", i.saturating_add(1))?;
            }
        }
        output.push('\n');

        let mut prefix = section.unwrap_or("").to_owned();
        for line in toml_str.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                prefix = header.to_owned();
            }
            match self.annotate_line(trimmed, &prefix) {
                Some(annotation) => writeln!(output, "{line}  # {annotation}")?,
                None => writeln!(output, "{line}")?,
            }
        }

        Ok(output)
    }

    /// Source annotation for a `key = value` line.
    fn annotate_line(&self, trimmed: &str, prefix: &str) -> Option<String> {
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }
        let key = trimmed.split('=').next()?.trim();
        let field_path = if prefix.is_empty() {
            key.to_owned()
        } else {
            format!("{prefix}.{key}")
        };
        self.field_sources
            .get(&field_path)
            .map(|layer| format!("[{layer}]"))
    }
}
