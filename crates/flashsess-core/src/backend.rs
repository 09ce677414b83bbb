//! Store backing interface.
//!
//! The host owns persistence: it loads a session's tree at the start of a
//! request and persists it at the end. The core never picks a format.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{Error, Result};
use crate::store::SessionStore;

/// Load/persist contract between the core and a host's session storage.
///
/// Implementations handle the actual storage (process memory, files, a
/// database, ...). A session that has never been persisted loads as empty.
pub trait SessionBackend: Send + Sync {
    /// Load the whole tree for a session.
    fn load(&self, session_id: &str) -> Result<SessionStore>;

    /// Replace the stored tree for a session.
    fn persist(&self, session_id: &str, store: &SessionStore) -> Result<()>;

    /// Delete a session. Returns whether it existed.
    fn destroy(&self, session_id: &str) -> Result<bool>;
}

/// In-process backend keyed by session id.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    sessions: RwLock<HashMap<String, SessionStore>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn len(&self) -> Result<usize> {
        let sessions = self.sessions.read().map_err(|_| Error::LockPoisoned)?;
        Ok(sessions.len())
    }

    /// True if no session is stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl SessionBackend for MemoryBackend {
    fn load(&self, session_id: &str) -> Result<SessionStore> {
        let sessions = self.sessions.read().map_err(|_| Error::LockPoisoned)?;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    fn persist(&self, session_id: &str, store: &SessionStore) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| Error::LockPoisoned)?;
        sessions.insert(session_id.to_string(), store.clone());
        debug!("Persisted session {} ({} keys)", session_id, store.len());
        Ok(())
    }

    fn destroy(&self, session_id: &str) -> Result<bool> {
        let mut sessions = self.sessions.write().map_err(|_| Error::LockPoisoned)?;
        Ok(sessions.remove(session_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_missing_is_empty() {
        let backend = MemoryBackend::new();
        let store = backend.load("nope").unwrap();
        assert!(store.is_empty());
        assert!(backend.is_empty().unwrap());
    }

    #[test]
    fn test_persist_and_load() {
        let backend = MemoryBackend::new();
        let mut store = SessionStore::new();
        store.set("user.name", "John").unwrap();
        backend.persist("s1", &store).unwrap();

        let loaded = backend.load("s1").unwrap();
        assert_eq!(loaded.get("user.name"), Some(&json!("John")));
        assert!(backend.load("s2").unwrap().is_empty());
        assert_eq!(backend.len().unwrap(), 1);
    }

    #[test]
    fn test_loaded_copy_is_independent() {
        let backend = MemoryBackend::new();
        backend.persist("s1", &SessionStore::new()).unwrap();

        let mut loaded = backend.load("s1").unwrap();
        loaded.set("x", 1).unwrap();
        assert!(!backend.load("s1").unwrap().has("x"));
    }

    #[test]
    fn test_destroy() {
        let backend = MemoryBackend::new();
        backend.persist("s1", &SessionStore::new()).unwrap();
        assert!(backend.destroy("s1").unwrap());
        assert!(!backend.destroy("s1").unwrap());
    }
}
