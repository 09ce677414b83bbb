//! Per-request session handle.
//!
//! A [`Session`] owns one loaded [`SessionStore`] and the [`FlashRegistry`]
//! that manages its flash lists. Hosts construct one per request, call
//! [`Session::on_request_start`] once, hand it to application code, then
//! persist [`Session::into_store`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::flash::{FlashRegistry, FlashTransition};
use crate::store::SessionStore;

/// A session store together with its flash bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Session {
    store: SessionStore,
    flash: FlashRegistry,
}

impl Session {
    /// Wrap a loaded store with the default flash layout.
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            flash: FlashRegistry::default(),
        }
    }

    /// Wrap a loaded store with the configured flash layout.
    pub fn with_config(store: SessionStore, config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            flash: FlashRegistry::new(&config.flash)?,
        })
    }

    /// Wrap a loaded store with an existing registry.
    pub fn with_registry(store: SessionStore, flash: FlashRegistry) -> Self {
        Self { store, flash }
    }

    /// The underlying store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The flash registry.
    pub fn registry(&self) -> &FlashRegistry {
        &self.flash
    }

    /// Give the store back to the host for persisting.
    pub fn into_store(self) -> SessionStore {
        self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Age and rotate flash data. Call exactly once at the start of a request.
    pub fn on_request_start(&mut self) -> FlashTransition {
        self.flash.on_request_start(&mut self.store)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Store access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.store.get(path)
    }

    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.store.get_or(path, default)
    }

    pub fn get_or_else<F>(&self, path: &str, default: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        self.store.get_or_else(path, default)
    }

    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.store.get_as(path)
    }

    pub fn has(&self, path: &str) -> bool {
        self.store.has(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.store.exists(path)
    }

    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.store.set(path, value)
    }

    pub fn put(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.store.put(path, value)
    }

    pub fn put_many<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.store.put_many(pairs)
    }

    pub fn pull(&mut self, path: &str) -> Option<Value> {
        self.store.pull(path)
    }

    pub fn pull_or(&mut self, path: &str, default: Value) -> Value {
        self.store.pull_or(path, default)
    }

    pub fn push(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.store.push(path, value)
    }

    pub fn forget(&mut self, path: &str) -> bool {
        self.store.forget(path)
    }

    pub fn all(&self) -> &Map<String, Value> {
        self.store.all()
    }

    /// Remove every key, flash bookkeeping included.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Alias for [`clear`](Self::clear).
    pub fn flush(&mut self) {
        self.store.flush();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Flash data
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a value readable during this request and the next one.
    pub fn flash(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.flash.flash(&mut self.store, key, value)
    }

    /// Store a value readable during this request only.
    pub fn now(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.flash.now(&mut self.store, key, value)
    }

    /// Keep selected old flash keys for one more request.
    pub fn keep<I, S>(&mut self, keys: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.flash.keep(&mut self.store, keys)
    }

    /// Keep all old flash keys for one more request.
    pub fn reflash(&mut self) -> Vec<String> {
        self.flash.reflash(&mut self.store)
    }

    pub fn flash_new_keys(&self) -> Vec<String> {
        self.flash.new_keys(&self.store)
    }

    pub fn flash_old_keys(&self) -> Vec<String> {
        self.flash.old_keys(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Simulate the boundary between two requests.
    fn next_request(session: Session) -> Session {
        let mut session = Session::new(session.into_store());
        session.on_request_start();
        session
    }

    #[test]
    fn test_flash_survives_exactly_one_boundary() {
        // 1st request
        let mut session = Session::default();
        session.flash("user", "John").unwrap();

        // 2nd
        session = next_request(session);
        assert!(session.has("user"));
        assert_eq!(session.get("user"), Some(&json!("John")));

        // 3rd
        session = next_request(session);
        assert!(!session.has("user"));

        // 4th
        session = next_request(session);
        assert!(!session.has("user"));
    }

    #[test]
    fn test_keep() {
        // 1st request
        let mut session = Session::default();
        session.flash("user", "John").unwrap();
        session.flash("foo", "bar").unwrap();

        // 2nd
        session = next_request(session);
        session.flash("before", "Before").unwrap();
        session.keep(["user"]).unwrap();
        session.flash("after", "After").unwrap();

        // 3rd
        session = next_request(session);
        assert_eq!(session.get("user"), Some(&json!("John")));
        assert!(!session.has("foo"));
        assert_eq!(session.get("before"), Some(&json!("Before")));
        assert_eq!(session.get("after"), Some(&json!("After")));

        // 4th
        session = next_request(session);
        assert!(!session.has("user"));
        assert!(!session.has("foo"));
    }

    #[test]
    fn test_reflash() {
        // 1st request
        let mut session = Session::default();
        session.flash("user", "John").unwrap();
        session.flash("foo", "bar").unwrap();

        // 2nd
        session = next_request(session);
        session.flash("before", "Before").unwrap();
        session.reflash();
        session.flash("after", "After").unwrap();

        // 3rd
        session = next_request(session);
        assert_eq!(session.get("user"), Some(&json!("John")));
        assert_eq!(session.get("foo"), Some(&json!("bar")));
        assert_eq!(session.get("before"), Some(&json!("Before")));
        assert_eq!(session.get("after"), Some(&json!("After")));

        // 4th
        session = next_request(session);
        assert!(!session.has("user"));
        assert!(!session.has("foo"));
    }

    #[test]
    fn test_plain_values_are_not_aged() {
        let mut session = Session::default();
        session.set("user.id", 42).unwrap();
        session.flash("notice", "Saved").unwrap();

        for _ in 0..3 {
            session = next_request(session);
        }
        assert_eq!(session.get("user.id"), Some(&json!(42)));
        assert!(!session.has("notice"));
    }

    #[test]
    fn test_nested_flash_key() {
        let mut session = Session::default();
        session.set("form.keep", "me").unwrap();
        session.flash("form.errors", json!({"email": "required"})).unwrap();

        session = next_request(session);
        assert_eq!(session.get("form.errors.email"), Some(&json!("required")));

        session = next_request(session);
        assert!(!session.has("form.errors"));
        assert_eq!(session.get("form"), Some(&json!({"keep": "me"})));
    }

    #[test]
    fn test_flash_under_expiring_key_survives_boundary() {
        let mut session = Session::default();
        session.flash("form", json!({"name": "x", "errors": "old"})).unwrap();

        session = next_request(session);
        session.flash("form.errors", "required").unwrap();

        session = next_request(session);
        assert!(session.has("form.errors"));
        assert_eq!(session.get("form.errors"), Some(&json!("required")));
        assert!(!session.has("form.name"));

        session = next_request(session);
        assert!(!session.has("form.errors"));
    }

    #[test]
    fn test_flash_over_expiring_key_survives_boundary() {
        let mut session = Session::default();
        session.flash("form.errors", "old").unwrap();

        session = next_request(session);
        session.flash("form", json!({"errors": "new"})).unwrap();

        session = next_request(session);
        assert_eq!(session.get("form.errors"), Some(&json!("new")));

        session = next_request(session);
        assert!(!session.has("form"));
    }

    #[test]
    fn test_flush_drops_flash_bookkeeping() {
        let mut session = Session::default();
        session.set("a", 1).unwrap();
        session.flash("b", 2).unwrap();
        session.flush();
        assert!(session.all().is_empty());
        assert!(session.flash_new_keys().is_empty());
    }

    #[test]
    fn test_with_config_uses_custom_namespace() {
        let config = SessionConfig::default().with_namespace("_flash");
        let mut session = Session::with_config(SessionStore::new(), &config).unwrap();
        session.flash("msg", "hi").unwrap();
        assert_eq!(session.get("_flash.new"), Some(&json!(["msg"])));
        assert!(!session.exists("flash"));

        // flash is an ordinary key under a custom namespace
        session.set("flash", true).unwrap();
        assert!(session.has("flash"));
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = SessionConfig::default().with_namespace("bad..ns");
        assert!(Session::with_config(SessionStore::new(), &config).is_err());
    }
}
