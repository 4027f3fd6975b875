//! CLI handlers for the `propbag config` subcommand.

use anyhow::Result;
use propbag_config::{ConfigResult, ResolvedConfig, ShowFormat};

use crate::theme::Theme;

/// Show the resolved configuration with source annotations.
pub(crate) fn show_config(
    resolved: &ResolvedConfig,
    format: &str,
    section: Option<&str>,
) -> Result<()> {
    let show_format = match format {
        "json" => ShowFormat::Json,
        _ => ShowFormat::Toml,
    };

    let output = resolved
        .show(show_format, section)
        .map_err(|e| anyhow::anyhow!("failed to format config: {e}"))?;

    println!("{output}");
    Ok(())
}

/// Report whether the configuration loads and validates.
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn validate_config(resolved: &ConfigResult<ResolvedConfig>) -> Result<()> {
    match resolved {
        Ok(resolved) => {
            println!("{}", Theme::success("Configuration is valid."));
            if !resolved.loaded_files.is_empty() {
                println!("\nLoaded files:");
                for path in &resolved.loaded_files {
                    println!("  - {path}");
                }
            }
            Ok(())
        },
        Err(e) => {
            eprintln!("{}", Theme::error(&format!("Configuration error: {e}")));
            std::process::exit(1);
        },
    }
}
