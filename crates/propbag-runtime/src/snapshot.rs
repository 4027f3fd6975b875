//! Session persistence.
//!
//! The core defines the payload; where it is stored is the host's save
//! boundary. [`Session::save_json`] and [`Session::load_json`] cover hosts
//! that keep one JSON file per session.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use propbag_stock::{LedgerSnapshot, StockLedger};
use propbag_store::{AliasIndex, AliasRecord, PropertyStore, VariableNames, Variables};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RuntimeError, RuntimeResult};
use crate::session::{Session, SessionOptions};

/// Serializable session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Variables and their property bags.
    pub variables: Variables,
    /// Aliases in insertion order.
    #[serde(default)]
    pub aliases: Vec<AliasRecord>,
    /// The host's variable labels.
    #[serde(default)]
    pub names: VariableNames,
    /// Purchase counts.
    pub ledger: LedgerSnapshot,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
}

impl Session {
    /// Capture variables, aliases, labels and counters.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            variables: self.store.store().clone(),
            aliases: self.aliases.records(),
            names: self.names.clone(),
            ledger: self.ledger.snapshot(),
            saved_at: Utc::now(),
        }
    }

    /// Replace this session's state with a snapshot, keeping its options
    /// and item notes.
    ///
    /// Alias names are restored as saved, without refolding.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        let policy = self.store.policy();
        let reserved = self.store.reserved();
        self.store = PropertyStore::new(snapshot.variables, policy).with_reserved(reserved);
        self.aliases = AliasIndex::from_records(policy, snapshot.aliases);
        self.names = snapshot.names;
        self.ledger = StockLedger::restore(snapshot.ledger);
        debug!(saved_at = %snapshot.saved_at, "restored session");
    }

    /// A session with `options` and the state of `snapshot`.
    #[must_use]
    pub fn from_snapshot(options: SessionOptions, snapshot: SessionSnapshot) -> Self {
        let mut session = Self::with_options(options);
        session.restore(snapshot);
        session
    }

    /// Write the session to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::SerializationError`] or [`RuntimeError::IoError`].
    pub fn save_json(&self, path: &Path) -> RuntimeResult<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| RuntimeError::SerializationError(e.to_string()))?;
        std::fs::write(path, json).map_err(|source| RuntimeError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "saved session");
        Ok(())
    }

    /// Read a session written by [`Session::save_json`].
    ///
    /// # Errors
    ///
    /// [`RuntimeError::IoError`] if the file cannot be read,
    /// [`RuntimeError::SerializationError`] if it is not a snapshot.
    pub fn load_json(path: &Path, options: SessionOptions) -> RuntimeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        let snapshot: SessionSnapshot = serde_json::from_str(&content)
            .map_err(|e| RuntimeError::SerializationError(e.to_string()))?;
        info!(path = %path.display(), saved_at = %snapshot.saved_at, "loaded session");
        Ok(Self::from_snapshot(options, snapshot))
    }

    /// Like [`Session::load_json`], but a missing file gives a fresh
    /// session.
    ///
    /// # Errors
    ///
    /// As [`Session::load_json`], except for a missing file.
    pub fn load_json_or_new(path: &Path, options: SessionOptions) -> RuntimeResult<Self> {
        match Self::load_json(path, options.clone()) {
            Err(RuntimeError::IoError { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "session file not found, starting fresh");
                Ok(Self::with_options(options))
            },
            other => other,
        }
    }
}
