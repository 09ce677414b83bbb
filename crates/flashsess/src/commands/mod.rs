//! Command implementations for the flashsess CLI.
//!
//! Each submodule implements the logic for a command group.

pub mod access;
pub mod flash;
pub mod request;

use anyhow::{Context, Result};
use flashsess_core::{Session, SessionBackend, SessionConfig};
use serde_json::Value;

use crate::file_store::FileBackend;

/// Everything a command needs to open and save one session.
pub struct RequestContext {
    pub backend: FileBackend,
    pub session_id: String,
    pub session_config: SessionConfig,
}

impl RequestContext {
    /// Load the session without crossing a request boundary.
    pub fn open(&self) -> Result<Session> {
        let store = self
            .backend
            .load(&self.session_id)
            .with_context(|| format!("Failed to load session {}", self.session_id))?;
        Ok(Session::with_config(store, &self.session_config)?)
    }

    /// Persist the session.
    pub fn save(&self, session: Session) -> Result<()> {
        self.backend
            .persist(&self.session_id, session.store())
            .with_context(|| format!("Failed to save session {}", self.session_id))
    }
}

/// Parse a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Render a value for terminal output.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("[1,2]"), json!([1, 2]));
        assert_eq!(parse_value("\"quoted\""), json!("quoted"));
        assert_eq!(parse_value("John"), json!("John"));
        assert_eq!(parse_value("{oops"), json!("{oops"));
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("John")), "John");
        assert_eq!(render_value(&json!(3)), "3");
        assert_eq!(render_value(&json!(["a"])), "[\n  \"a\"\n]");
    }
}
