//! The session file one invocation works on.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use propbag_config::{Config, loader};
use propbag_runtime::{Session, config_bridge};
use propbag_stock::ItemNotes;
use tracing::debug;

/// Session file name inside the propbag home.
pub(crate) const SESSION_FILE_NAME: &str = "session.json";

/// Item notes file name inside the propbag home.
pub(crate) const NOTES_FILE_NAME: &str = "items.json";

/// Where the session lives and what it holds.
pub(crate) struct SessionFile {
    path: PathBuf,
    pub(crate) session: Session,
}

impl SessionFile {
    /// Load the session, or start a fresh one when the file is missing.
    ///
    /// Item notes come from `notes`, else from `items.json` in the home
    /// when present.
    pub(crate) fn open(
        session_path: Option<&Path>,
        home: Option<&Path>,
        notes: Option<&Path>,
        config: &Config,
    ) -> Result<Self> {
        let home = match home {
            Some(dir) => dir.to_path_buf(),
            None => loader::default_home()?,
        };
        let path = session_path.map_or_else(|| home.join(SESSION_FILE_NAME), Path::to_path_buf);

        let options = config_bridge::to_session_options(config)?;
        let mut session = Session::load_json_or_new(&path, options)
            .with_context(|| format!("failed to load session from {}", path.display()))?;

        let default_notes = home.join(NOTES_FILE_NAME);
        let notes_path = match notes {
            Some(path) => Some(path.to_path_buf()),
            None => default_notes.exists().then_some(default_notes),
        };
        if let Some(notes_path) = notes_path {
            session = session.with_notes(read_notes(&notes_path)?);
        }

        Ok(Self { path, session })
    }

    /// Write the session back, creating its directory if needed.
    pub(crate) fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        self.session
            .save_json(&self.path)
            .with_context(|| format!("failed to save session to {}", self.path.display()))
    }
}

fn read_notes(path: &Path) -> Result<ItemNotes> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read item notes from {}", path.display()))?;
    let notes: ItemNotes = serde_json::from_str(&content)
        .with_context(|| format!("invalid item notes in {}", path.display()))?;
    debug!(path = %path.display(), items = notes.len(), "loaded item notes");
    Ok(notes)
}

#[cfg(test)]
mod tests {
    use propbag_core::{ItemId, Value};

    use super::*;

    #[test]
    fn test_round_trip_in_home() {
        let home = tempfile::tempdir().unwrap();
        fs::write(home.path().join(NOTES_FILE_NAME), r#"{"1": "<GStocks: 2>"}"#).unwrap();
        let config = Config::default();

        let mut file = SessionFile::open(None, Some(home.path()), None, &config).unwrap();
        file.session.set_property(1, "hp", 5).unwrap();
        assert!(file.session.record_purchase(ItemId::new(1), 1));
        file.save().unwrap();

        let reopened = SessionFile::open(None, Some(home.path()), None, &config).unwrap();
        assert_eq!(reopened.session.lookup("1", "hp"), Value::Int(5));
        assert_eq!(reopened.session.remaining(ItemId::new(1)).unwrap(), 1);
    }

    #[test]
    fn test_explicit_paths() {
        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("nested/run.json");
        let notes_path = dir.path().join("notes.json");
        fs::write(&notes_path, r#"{"3": "plain"}"#).unwrap();

        let file = SessionFile::open(
            Some(&session_path),
            Some(dir.path()),
            Some(&notes_path),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(file.session.notes().len(), 1);
        file.save().unwrap();
        assert!(session_path.exists());
    }

    #[test]
    fn test_bad_notes_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let notes_path = dir.path().join("notes.json");
        fs::write(&notes_path, "[1, 2]").unwrap();
        assert!(
            SessionFile::open(None, Some(dir.path()), Some(&notes_path), &Config::default())
                .is_err()
        );
    }
}
