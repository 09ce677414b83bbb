//! File-backed session storage.
//!
//! One pretty-printed JSON document per session, named `<session-id>.json`.
//! Writes go to a temporary sibling first and are renamed into place.

use std::path::{Path, PathBuf};

use flashsess_core::{Error, Result, SessionBackend, SessionStore};
use tracing::debug;

use crate::error::validate_session_id;

/// Session backend keeping each session in its own JSON file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the session files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a session.
    pub fn path_for(&self, session_id: &str) -> Result<PathBuf> {
        validate_session_id(session_id).map_err(|e| Error::Other(e.to_string()))?;
        Ok(self.dir.join(format!("{}.json", session_id)))
    }

    /// IDs of all stored sessions, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl SessionBackend for FileBackend {
    fn load(&self, session_id: &str) -> Result<SessionStore> {
        let path = self.path_for(session_id)?;
        if !path.exists() {
            debug!("No session file at {:?}; starting empty", path);
            return Ok(SessionStore::new());
        }

        let content = std::fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(SessionStore::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, session_id: &str, store: &SessionStore) -> Result<()> {
        let path = self.path_for(session_id)?;
        std::fs::create_dir_all(&self.dir)?;

        let content = serde_json::to_string_pretty(store)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &path)?;

        debug!("Saved session {} to {:?}", session_id, path);
        Ok(())
    }

    fn destroy(&self, session_id: &str) -> Result<bool> {
        let path = self.path_for(session_id)?;
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashsess_core::SessionLifecycle;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_session() {
        let temp = tempdir().expect("Failed to create temp dir");
        let backend = FileBackend::new(temp.path().join("sessions"));
        assert!(backend.load("default").unwrap().is_empty());
        assert!(backend.list().unwrap().is_empty());
    }

    #[test]
    fn test_persist_and_load() {
        let temp = tempdir().expect("Failed to create temp dir");
        let backend = FileBackend::new(temp.path().join("sessions"));

        let mut store = SessionStore::new();
        store.set("user.name", "John").unwrap();
        backend.persist("web", &store).unwrap();

        assert!(backend.path_for("web").unwrap().exists());
        assert!(!temp.path().join("sessions").join("web.json.tmp").exists());
        assert_eq!(backend.load("web").unwrap(), store);
        assert_eq!(backend.list().unwrap(), vec!["web"]);
    }

    #[test]
    fn test_rejects_unsafe_session_id() {
        let temp = tempdir().expect("Failed to create temp dir");
        let backend = FileBackend::new(temp.path());
        assert!(backend.load("../escape").is_err());
        assert!(backend.persist("a/b", &SessionStore::new()).is_err());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = tempdir().expect("Failed to create temp dir");
        let backend = FileBackend::new(temp.path());
        std::fs::write(backend.path_for("bad").unwrap(), "{not json").unwrap();
        assert!(matches!(backend.load("bad"), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_destroy() {
        let temp = tempdir().expect("Failed to create temp dir");
        let backend = FileBackend::new(temp.path());
        backend.persist("s", &SessionStore::new()).unwrap();
        assert!(backend.destroy("s").unwrap());
        assert!(!backend.destroy("s").unwrap());
    }

    #[test]
    fn test_flash_lifecycle_over_files() {
        let temp = tempdir().expect("Failed to create temp dir");
        let lc = SessionLifecycle::with_defaults(Arc::new(FileBackend::new(temp.path())));

        lc.run("web", |s| s.flash("notice", "Saved")).unwrap();
        let seen = lc.run("web", |s| Ok(s.get("notice").cloned())).unwrap();
        assert_eq!(seen, Some(json!("Saved")));
        assert!(!lc.run("web", |s| Ok(s.has("notice"))).unwrap());
    }
}
