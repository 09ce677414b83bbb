//! Error types for the flashsess CLI.

use thiserror::Error;

/// Errors raised by the CLI host before the core is involved.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid session ID: {0}")]
    InvalidSessionId(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for CliError {
    fn from(e: toml::de::Error) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<flashsess_core::ConfigValidationError> for CliError {
    fn from(e: flashsess_core::ConfigValidationError) -> Self {
        CliError::Config(e.to_string())
    }
}

/// Validate a session ID before it is used as a file name.
///
/// Valid IDs are 1-128 characters of ASCII letters, digits, `-` and `_`.
pub fn validate_session_id(id: &str) -> Result<(), CliError> {
    if id.is_empty() {
        return Err(CliError::InvalidSessionId("ID cannot be empty".into()));
    }

    if id.len() > 128 {
        return Err(CliError::InvalidSessionId(
            "ID must be 128 characters or less".into(),
        ));
    }

    if let Some((i, c)) = id
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        return Err(CliError::InvalidSessionId(format!(
            "Invalid character '{}' at position {}",
            c, i
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_session_ids() {
        assert!(validate_session_id("default").is_ok());
        assert!(validate_session_id("user-42_web").is_ok());
        assert!(validate_session_id("A1").is_ok());
    }

    #[test]
    fn test_invalid_session_ids() {
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("../etc/passwd").is_err());
        assert!(validate_session_id("a b").is_err());
        assert!(validate_session_id(&"a".repeat(129)).is_err());

        let err = validate_session_id("bad/id").unwrap_err();
        assert!(err.to_string().contains("position 3"));
    }
}
