//! Flash data: values that live for exactly one more request.
//!
//! All bookkeeping lives inside the session store under two reserved lists,
//! `flash.new` and `flash.old` by default:
//!
//! ```text
//! Request N     flash(k, v)          k in new
//!   boundary    on_request_start     age: drop values of old keys
//!                                    rotate: old := new, new := []
//! Request N+1   k readable           k in old
//!   boundary    on_request_start     age: k's value removed
//! Request N+2   k absent
//! ```
//!
//! `keep` and `reflash` move old keys back into `new` during request N+1 so
//! they survive one more boundary.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FlashConfig;
use crate::error::{Error, Result};
use crate::path::SessionPath;
use crate::store::{SessionStore, value_kind};

/// Keys affected by one request-start transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlashTransition {
    /// Keys whose values were removed because they were old.
    pub expired: Vec<String>,
    /// Keys flashed during the previous request, now readable as old.
    pub carried: Vec<String>,
}

impl FlashTransition {
    /// True if the transition neither expired nor carried anything.
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.carried.is_empty()
    }
}

/// Manager for the flash lists inside a session store.
///
/// Holds only the location of the reserved lists; all state is in the store
/// passed to each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashRegistry {
    namespace: SessionPath,
    new_path: SessionPath,
    old_path: SessionPath,
}

impl Default for FlashRegistry {
    fn default() -> Self {
        Self {
            namespace: SessionPath::from_trusted(&["flash"]),
            new_path: SessionPath::from_trusted(&["flash", "new"]),
            old_path: SessionPath::from_trusted(&["flash", "old"]),
        }
    }
}

impl FlashRegistry {
    /// Create a registry for the configured namespace.
    pub fn new(config: &FlashConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            namespace: SessionPath::parse(&config.namespace)?,
            new_path: SessionPath::parse(&config.new_path())?,
            old_path: SessionPath::parse(&config.old_path())?,
        })
    }

    /// The reserved namespace.
    pub fn namespace(&self) -> &SessionPath {
        &self.namespace
    }

    /// Keys flashed during the current request.
    pub fn new_keys(&self, store: &SessionStore) -> Vec<String> {
        key_list(store.get_path(&self.new_path), &self.new_path)
    }

    /// Keys readable now that expire at the next request start.
    pub fn old_keys(&self, store: &SessionStore) -> Vec<String> {
        key_list(store.get_path(&self.old_path), &self.old_path)
    }

    /// True if `key` is tracked in either list.
    pub fn is_flashed(&self, store: &SessionStore, key: &str) -> bool {
        self.new_keys(store).iter().any(|k| k == key)
            || self.old_keys(store).iter().any(|k| k == key)
    }

    /// Store `value` at `key` for this request and the next one.
    pub fn flash(&self, store: &mut SessionStore, key: &str, value: impl Into<Value>) -> Result<()> {
        let path = self.check_key(key)?;
        let key = path.to_string();
        store.set_path(&path, value.into())?;

        let mut new = self.new_keys(store);
        if !new.contains(&key) {
            new.push(key.clone());
        }
        self.write_list(store, &self.new_path, new);

        let mut old = self.old_keys(store);
        let before = old.len();
        old.retain(|k| *k != key);
        if old.len() != before {
            self.write_list(store, &self.old_path, old);
        }

        debug!("Flashed '{}'", key);
        Ok(())
    }

    /// Store `value` at `key` for the current request only.
    pub fn now(&self, store: &mut SessionStore, key: &str, value: impl Into<Value>) -> Result<()> {
        let path = self.check_key(key)?;
        let key = path.to_string();
        store.set_path(&path, value.into())?;

        let mut new = self.new_keys(store);
        let before = new.len();
        new.retain(|k| *k != key);
        if new.len() != before {
            self.write_list(store, &self.new_path, new);
        }

        let mut old = self.old_keys(store);
        if !old.contains(&key) {
            old.push(key.clone());
        }
        self.write_list(store, &self.old_path, old);

        debug!("Flashed '{}' for the current request", key);
        Ok(())
    }

    /// Keep the named old keys for one more request.
    ///
    /// Only keys currently in the old list are moved; anything else is
    /// ignored. Returns the keys that were kept.
    pub fn keep<I, S>(&self, store: &mut SessionStore, keys: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requested = Vec::new();
        for key in keys {
            requested.push(self.check_key(key.as_ref())?.to_string());
        }

        let mut old = self.old_keys(store);
        let mut new = self.new_keys(store);
        let mut kept = Vec::new();

        for key in requested {
            let before = old.len();
            old.retain(|k| *k != key);
            if old.len() == before {
                debug!("Not keeping '{}': it is not old flash data", key);
                continue;
            }
            if !new.contains(&key) {
                new.push(key.clone());
            }
            kept.push(key);
        }

        if !kept.is_empty() {
            self.write_list(store, &self.new_path, new);
            self.write_list(store, &self.old_path, old);
            debug!("Kept flash keys {:?}", kept);
        }
        Ok(kept)
    }

    /// Keep every old key for one more request. Returns the moved keys.
    pub fn reflash(&self, store: &mut SessionStore) -> Vec<String> {
        let old = key_list(store.remove_path(&self.old_path).as_ref(), &self.old_path);

        let mut new = self.new_keys(store);
        for key in &old {
            if !new.contains(key) {
                new.push(key.clone());
            }
        }
        self.write_list(store, &self.new_path, new);

        debug!("Reflashed {} keys", old.len());
        old
    }

    /// Remove the values of every old key.
    ///
    /// Keys flashed during the request that just ended win over old keys
    /// they overlap with. An old key at or under a new key is not removed,
    /// since the new flash overwrote it. An old key above a new key is
    /// removed, and then the new key's value is written back.
    pub fn age(&self, store: &mut SessionStore) -> Vec<String> {
        let fresh: Vec<SessionPath> = self
            .new_keys(store)
            .iter()
            .filter_map(|key| SessionPath::parse(key).ok())
            .collect();
        let mut expired = Vec::new();

        for key in self.old_keys(store) {
            let path = match SessionPath::parse(&key) {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping malformed flash key: {}", e);
                    continue;
                }
            };
            if self.is_reserved(&path) {
                warn!("Skipping reserved path '{}' in old flash list", key);
                continue;
            }
            if fresh.iter().any(|f| path.starts_with(f)) {
                debug!("'{}' was overwritten by a newer flash; leaving its value", key);
                expired.push(key);
                continue;
            }

            let survivors: Vec<(SessionPath, Value)> = fresh
                .iter()
                .filter(|f| f.starts_with(&path))
                .filter_map(|f| store.get_path(f).map(|v| (f.clone(), v.clone())))
                .collect();
            store.remove_path(&path);
            for (fresh_path, value) in survivors {
                if let Err(e) = store.set_path(&fresh_path, value) {
                    warn!("Could not restore flashed '{}': {}", fresh_path, e);
                }
            }
            expired.push(key);
        }

        expired
    }

    /// Move the new list into the old slot, leaving the new list empty.
    pub fn rotate(&self, store: &mut SessionStore) -> Vec<String> {
        let carried = key_list(store.remove_path(&self.new_path).as_ref(), &self.new_path);
        self.write_list(store, &self.old_path, carried.clone());
        carried
    }

    /// Request-start hook: age old data, then rotate new into old.
    ///
    /// Must run exactly once per request, before application code reads or
    /// writes the session.
    pub fn on_request_start(&self, store: &mut SessionStore) -> FlashTransition {
        let expired = self.age(store);
        let carried = self.rotate(store);

        if !expired.is_empty() || !carried.is_empty() {
            debug!(
                "Flash transition: {} expired, {} carried",
                expired.len(),
                carried.len()
            );
        }

        FlashTransition { expired, carried }
    }

    fn is_reserved(&self, path: &SessionPath) -> bool {
        path.starts_with(&self.namespace) || self.namespace.starts_with(path)
    }

    fn check_key(&self, key: &str) -> Result<SessionPath> {
        let path = SessionPath::parse(key)?;
        if self.is_reserved(&path) {
            return Err(Error::ReservedPath(path.to_string()));
        }
        Ok(path)
    }

    fn write_list(&self, store: &mut SessionStore, path: &SessionPath, keys: Vec<String>) {
        let list = Value::Array(keys.into_iter().map(Value::String).collect());
        if let Err(e) = store.set_path(path, list.clone()) {
            warn!("Resetting flash namespace '{}': {}", self.namespace, e);
            store.remove_path(&self.namespace);
            if let Err(e) = store.set_path(path, list) {
                warn!("Could not write flash list '{}': {}", path, e);
            }
        }
    }
}

fn key_list(value: Option<&Value>, path: &SessionPath) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(String::from))
            .collect(),
        Some(other) => {
            warn!(
                "Flash list '{}' holds {} instead of an array; treating as empty",
                path,
                value_kind(other)
            );
            Vec::new()
        }
    }
}
