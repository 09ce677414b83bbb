//! Dotted session paths.
//!
//! `user.groups` addresses `store["user"]["groups"]`. A path is non-empty and
//! none of its segments may be empty, so `a..b`, `.a` and `a.` are rejected.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A parsed dotted path into the session tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionPath {
    segments: Vec<String>,
}

impl SessionPath {
    /// Parse a dotted string like `user.groups` into its segments.
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::invalid_path(input, "path cannot be empty"));
        }

        let mut segments = Vec::new();
        for (i, part) in input.split('.').enumerate() {
            if part.is_empty() {
                return Err(Error::invalid_path(
                    input,
                    format!("empty segment at position {}", i),
                ));
            }
            segments.push(part.to_string());
        }

        Ok(Self { segments })
    }

    /// Build from segments known to be non-empty and dot-free.
    pub(crate) fn from_trusted(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Split into the parent segments and the final key.
    pub fn split_last(&self) -> (&[String], &str) {
        // parse() guarantees at least one segment
        match self.segments.split_last() {
            Some((last, parents)) => (parents, last.as_str()),
            None => (&[], ""),
        }
    }

    /// True if `self` equals `prefix` or lies underneath it.
    pub fn starts_with(&self, prefix: &SessionPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for SessionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for SessionPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let p = SessionPath::parse("user").unwrap();
        assert_eq!(p.segments(), &["user".to_string()]);
        assert_eq!(p.depth(), 1);
    }

    #[test]
    fn test_parse_nested() {
        let p = SessionPath::parse("user.groups.admin").unwrap();
        assert_eq!(p.depth(), 3);
        let (parents, last) = p.split_last();
        assert_eq!(parents, &["user".to_string(), "groups".to_string()]);
        assert_eq!(last, "admin");
        assert_eq!(p.to_string(), "user.groups.admin");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(SessionPath::parse("").unwrap_err().is_invalid_path());
        assert!(SessionPath::parse("a..b").is_err());
        assert!(SessionPath::parse(".a").is_err());
        assert!(SessionPath::parse("a.").is_err());
    }

    #[test]
    fn test_starts_with() {
        let ns = SessionPath::parse("flash").unwrap();
        assert!(SessionPath::parse("flash.new").unwrap().starts_with(&ns));
        assert!(SessionPath::parse("flash").unwrap().starts_with(&ns));
        assert!(!SessionPath::parse("flashy").unwrap().starts_with(&ns));
        assert!(!SessionPath::parse("user.flash").unwrap().starts_with(&ns));
    }

    #[test]
    fn test_lexical_order_puts_prefix_first() {
        let mut paths = vec![
            SessionPath::parse("user.name").unwrap(),
            SessionPath::parse("user").unwrap(),
            SessionPath::parse("a").unwrap(),
        ];
        paths.sort();
        let rendered: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["a", "user", "user.name"]);
    }
}
