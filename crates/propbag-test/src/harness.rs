//! Test harness helpers.

use std::path::PathBuf;

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Create a temporary directory for testing.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
pub fn test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Set up test logging with the given filter.
///
/// Safe to call from every test; only the first call installs a
/// subscriber.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// Set up test logging at warn level.
pub fn setup_test_logging_default() {
    setup_test_logging("warn");
}

/// A temporary directory laid out like a propbag home.
#[derive(Debug)]
pub struct TestHome {
    /// Backing directory, removed on drop.
    pub dir: TempDir,
}

impl TestHome {
    /// Create an empty home.
    #[must_use]
    pub fn new() -> Self {
        Self { dir: test_dir() }
    }

    /// Path of the home directory.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Write `config.toml` into the home.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(self.path().join("config.toml"), toml).expect("Failed to write config");
        self
    }

    /// Write a file under the home, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}
