//! Session discovery and persistence
//!
//! A session is any directory containing `.rma/`. It holds the record store
//! between invocations (`.rma/session.yaml`) and session-level configuration
//! (`.rma/config.yaml`).

use miette::Diagnostic;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::RecordStore;

const SESSION_DIR: &str = ".rma";
const STORE_FILE: &str = "session.yaml";
const CONFIG_FILE: &str = "config.yaml";

/// Represents an RMA session directory
#[derive(Debug)]
pub struct Session {
    /// Directory containing `.rma/`
    root: PathBuf,
}

impl Session {
    /// Find the session by walking up from the current directory
    pub fn discover() -> Result<Self, SessionError> {
        let current = std::env::current_dir().map_err(|e| SessionError::Io(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the session by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, SessionError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| SessionError::Io(e.to_string()))?;

        loop {
            if current.join(SESSION_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(SessionError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new session at the given path
    pub fn init(path: &Path) -> Result<Self, SessionError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(SESSION_DIR).exists() {
            return Err(SessionError::AlreadyExists(root));
        }

        Self::create(root)
    }

    /// Initialize even if `.rma/` exists, discarding the stored entries
    pub fn init_force(path: &Path) -> Result<Self, SessionError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create(root)
    }

    fn create(root: PathBuf) -> Result<Self, SessionError> {
        let session = Self { root };
        std::fs::create_dir_all(session.rma_dir()).map_err(|e| SessionError::Io(e.to_string()))?;

        let config_path = session.config_path();
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| SessionError::Io(e.to_string()))?;
        }

        session.save_store(&RecordStore::new())?;
        Ok(session)
    }

    fn default_config() -> &'static str {
        r#"# RMA Session Configuration

# Report title (default: "<today>(Atualizada) Planilha RMA")
# title: ""

# Period shown in the chart title (default: current month and year)
# month: JANEIRO
# year: "2024"

# Directory for exported reports (default: session root)
# export_dir: reports

# Status keywords that select the green / red status styling
# repair_keyword: reparo
# refund_keyword: reembolso

# Default output format (auto, tsv, json, yaml, csv, md, id)
# default_format: auto
"#
    }

    /// Session root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.rma/` directory
    pub fn rma_dir(&self) -> PathBuf {
        self.root.join(SESSION_DIR)
    }

    /// Session-level config file
    pub fn config_path(&self) -> PathBuf {
        self.rma_dir().join(CONFIG_FILE)
    }

    /// Persisted record store
    pub fn store_path(&self) -> PathBuf {
        self.rma_dir().join(STORE_FILE)
    }

    /// Load the record store; a missing file is an empty store
    pub fn load_store(&self) -> Result<RecordStore, SessionError> {
        let path = self.store_path();
        if !path.exists() {
            return Ok(RecordStore::new());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| SessionError::Io(e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(RecordStore::new());
        }

        serde_yml::from_str(&content).map_err(|e| SessionError::Parse {
            path,
            message: e.to_string(),
        })
    }

    /// Persist the record store, replacing the previous file atomically
    pub fn save_store(&self, store: &RecordStore) -> Result<(), SessionError> {
        let yaml = serde_yml::to_string(store).map_err(|e| SessionError::Io(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(self.rma_dir())
            .map_err(|e| SessionError::Io(e.to_string()))?;
        tmp.write_all(yaml.as_bytes())
            .map_err(|e| SessionError::Io(e.to_string()))?;
        tmp.persist(self.store_path())
            .map_err(|e| SessionError::Io(e.error.to_string()))?;
        Ok(())
    }
}

/// Errors that can occur during session operations
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("not an RMA session (searched from {searched_from:?}). Run 'rma init' to create one.")]
    #[diagnostic(code(rma::session::not_found))]
    NotFound { searched_from: PathBuf },

    #[error("RMA session already exists at {0:?}")]
    #[diagnostic(code(rma::session::exists), help("use `rma init --force` to start over"))]
    AlreadyExists(PathBuf),

    #[error("session file {path:?} is malformed: {message}")]
    #[diagnostic(code(rma::session::parse))]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(rma::session::io))]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::{Field, RmaEntry};
    use tempfile::tempdir;

    #[test]
    fn test_session_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let session = Session::init(tmp.path()).unwrap();

        assert!(session.rma_dir().is_dir());
        assert!(session.config_path().exists());
        assert!(session.store_path().exists());
        assert!(session.load_store().unwrap().is_empty());
    }

    #[test]
    fn test_session_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Session::init(tmp.path()).unwrap();

        let err = Session::init(tmp.path()).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyExists(_)));
    }

    #[test]
    fn test_session_discover_from_subdirectory() {
        let tmp = tempdir().unwrap();
        Session::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("a/b/c");
        std::fs::create_dir_all(&subdir).unwrap();

        let session = Session::discover_from(&subdir).unwrap();
        assert_eq!(
            session.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_session_discover_fails_without_dir() {
        let tmp = tempdir().unwrap();
        let err = Session::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, SessionError::NotFound { .. }));
    }

    #[test]
    fn test_store_save_and_load() {
        let tmp = tempdir().unwrap();
        let session = Session::init(tmp.path()).unwrap();

        let mut store = session.load_store().unwrap();
        store.insert(RmaEntry::default().with(Field::Client, "Acme"));
        let second = store.insert(RmaEntry::default().with(Field::Client, "Beta"));
        store.delete(&[second]);
        session.save_store(&store).unwrap();

        let mut loaded = session.load_store().unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.insert(RmaEntry::default()).get(), 3);
    }

    #[test]
    fn test_malformed_store_reports_parse_error() {
        let tmp = tempdir().unwrap();
        let session = Session::init(tmp.path()).unwrap();
        std::fs::write(session.store_path(), "entries: [unclosed").unwrap();

        let err = session.load_store().unwrap_err();
        assert!(matches!(err, SessionError::Parse { .. }));
    }

    #[test]
    fn test_init_force_keeps_config() {
        let tmp = tempdir().unwrap();
        let session = Session::init(tmp.path()).unwrap();
        std::fs::write(session.config_path(), "title: Mine\n").unwrap();

        let session = Session::init_force(tmp.path()).unwrap();
        let config = std::fs::read_to_string(session.config_path()).unwrap();
        assert_eq!(config, "title: Mine\n");
    }
}
