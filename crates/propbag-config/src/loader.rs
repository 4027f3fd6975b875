//! Configuration file discovery and loading.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::apply_env_fallbacks;
use crate::error::{ConfigError, ConfigResult, TomlOrigin};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded defaults, the lowest layer.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Directory under the home directory holding the user config.
pub const HOME_DIR_NAME: &str = ".propbag";

/// File name of the user config inside [`HOME_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Load configuration with the full precedence chain, reading the process
/// environment.
///
/// See [`load_with_env`].
///
/// # Errors
///
/// As [`load_with_env`].
pub fn load(explicit: Option<&Path>, propbag_home: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let env_vars: HashMap<String, String> = std::env::vars().collect();
    load_with_env(explicit, propbag_home, &env_vars)
}

/// Load configuration: defaults, then the user file, then `explicit`, then
/// `PROPBAG_*` fallbacks for fields no file set.
///
/// `propbag_home` replaces `~/.propbag` as the directory holding the user
/// file. A missing user file is skipped; a missing explicit file is an error.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file cannot be read or parsed, or if the
/// merged configuration fails validation.
pub fn load_with_env<S: BuildHasher>(
    explicit: Option<&Path>,
    propbag_home: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();

    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::Parse {
            origin: TomlOrigin::Defaults,
            source: e,
        })?;
    record_leaves(&merged, "", ConfigLayer::Defaults, &mut field_sources);

    // 2. User config.
    let user_dir = match propbag_home {
        Some(dir) => dir.to_path_buf(),
        None => default_home()?,
    };
    let user_path = user_dir.join(CONFIG_FILE_NAME);
    if let Some(overlay) = try_load_file(&user_path)? {
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            ConfigLayer::User,
            &mut field_sources,
        );
        loaded_files.push(user_path.display().to_string());
        info!(path = %user_path.display(), "loaded user config");
    }

    // 3. Explicit config.
    if let Some(path) = explicit {
        let overlay =
            try_load_file(path)?.ok_or_else(|| ConfigError::Missing(path.to_path_buf()))?;
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            ConfigLayer::Explicit,
            &mut field_sources,
        );
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded explicit config");
    }

    // 4. Env var fallbacks for unset fields.
    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 5. Deserialize and validate.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                origin: TomlOrigin::Merged,
                source: e,
            })?;
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering).
///
/// Fields the file omits take their defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or
/// validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = try_load_file(path)?.ok_or_else(|| ConfigError::Missing(path.to_path_buf()))?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            origin: TomlOrigin::File(path.to_path_buf()),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        },
    };

    let len = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if len > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::TooLarge {
            path: path.to_path_buf(),
            len,
            max: MAX_CONFIG_FILE_SIZE,
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        origin: TomlOrigin::File(path.to_path_buf()),
        source: e,
    })?;

    Ok(Some(value))
}

/// The default propbag home, `~/.propbag`.
///
/// # Errors
///
/// [`ConfigError::NoHomeDir`] when the user's home cannot be determined.
pub fn default_home() -> ConfigResult<PathBuf> {
    Ok(home_directory()?.join(HOME_DIR_NAME))
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
