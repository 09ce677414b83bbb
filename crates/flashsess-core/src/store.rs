//! Dotted-path access over a session's value tree.
//!
//! The tree is a JSON object whose nested objects act as internal nodes.
//! Arrays are internal nodes too: a segment made only of digits indexes into
//! them, so `user.groups.1` is the second element of `user.groups`.
//! Reads never fail: a missing level, a scalar intermediate, a bad index, or
//! an unparsable path all read as absent. Writes validate the path first and
//! leave the tree untouched on error.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::path::SessionPath;

/// Alias for stored values - `serde_json::Value` supports all JSON types.
pub type StoreValue = Value;

/// A session's key/value tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionStore {
    data: Map<String, Value>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-loaded tree.
    pub fn from_map(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Give the tree back to the host, e.g. for persisting.
    pub fn into_map(self) -> Map<String, Value> {
        self.data
    }

    /// Read-only view of the whole tree.
    pub fn all(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Owned copy of the whole tree.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.data.clone()
    }

    /// Get the value at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let path = SessionPath::parse(path).ok()?;
        self.get_path(&path)
    }

    /// Get the value at `path`, or `default` when absent.
    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).cloned().unwrap_or(default)
    }

    /// Get the value at `path`, computing a default only when absent.
    pub fn get_or_else<F>(&self, path: &str, default: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        self.get(path).cloned().unwrap_or_else(default)
    }

    /// Deserialize the value at `path` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.get(path) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// True if a non-null value is stored at `path`.
    ///
    /// A stored `null` reads as absent here; use [`exists`](Self::exists) to
    /// tell the two apart.
    pub fn has(&self, path: &str) -> bool {
        matches!(self.get(path), Some(value) if !value.is_null())
    }

    /// True if any value, `null` included, is stored at `path`.
    pub fn exists(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Set a value, creating intermediate objects as needed.
    ///
    /// A scalar on the way to the target is replaced by an object. An array
    /// on the way is indexed and never replaced: a non-numeric segment or an
    /// index past its end fails with [`Error::ShapeMismatch`].
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let path = SessionPath::parse(path)?;
        self.set_path(&path, value.into())
    }

    /// Alias for [`set`](Self::set).
    pub fn put(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.set(path, value)
    }

    /// Set several paths at once.
    ///
    /// Every path is validated before anything is written. Pairs are applied
    /// in lexical path order, so `user` is written before `user.name` and the
    /// nested write lands inside the fresh value. A repeated path keeps its
    /// last value. If any write fails, none of them is kept.
    pub fn put_many<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut ordered = BTreeMap::new();
        for (key, value) in pairs {
            ordered.insert(SessionPath::parse(key.as_ref())?, value.into());
        }

        let mut staged = self.data.clone();
        for (path, value) in ordered {
            set_in(&mut staged, &path, value)?;
        }
        self.data = staged;
        Ok(())
    }

    /// Remove and return the value at `path`.
    pub fn pull(&mut self, path: &str) -> Option<Value> {
        let path = SessionPath::parse(path).ok()?;
        self.remove_path(&path)
    }

    /// Remove and return the value at `path`, or `default` when absent.
    pub fn pull_or(&mut self, path: &str, default: Value) -> Value {
        self.pull(path).unwrap_or(default)
    }

    /// Append `value` to the array at `path`.
    ///
    /// An absent or `null` target starts a new array. Any other non-array
    /// value is an error and is left as it was.
    pub fn push(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let parsed = SessionPath::parse(path)?;
        let value = value.into();

        match self.get_path_mut(&parsed) {
            Some(Value::Array(items)) => {
                items.push(value);
                return Ok(());
            }
            Some(Value::Null) | None => {}
            Some(other) => {
                return Err(Error::shape_mismatch(path, value_kind(other), "an array"));
            }
        }

        self.set_path(&parsed, Value::Array(vec![value]))
    }

    /// Remove the value at `path`. Returns whether anything was removed.
    ///
    /// Removing an array element shifts the later elements down.
    pub fn forget(&mut self, path: &str) -> bool {
        SessionPath::parse(path)
            .ok()
            .and_then(|p| self.remove_path(&p))
            .is_some()
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        debug!("Clearing session store ({} top-level keys)", self.data.len());
        self.data.clear();
    }

    /// Alias for [`clear`](Self::clear).
    pub fn flush(&mut self) {
        self.clear();
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Top-level keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub(crate) fn get_path(&self, path: &SessionPath) -> Option<&Value> {
        let mut segments = path.segments().iter();
        let mut node = self.data.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(array_index(segment)?)?,
                _ => return None,
            };
        }
        Some(node)
    }

    fn get_path_mut(&mut self, path: &SessionPath) -> Option<&mut Value> {
        lookup_mut(&mut self.data, path.segments())
    }

    pub(crate) fn set_path(&mut self, path: &SessionPath, value: Value) -> Result<()> {
        set_in(&mut self.data, path, value)
    }

    pub(crate) fn remove_path(&mut self, path: &SessionPath) -> Option<Value> {
        let (parents, last) = path.split_last();
        if parents.is_empty() {
            return self.data.remove(last);
        }
        match lookup_mut(&mut self.data, parents)? {
            Value::Object(map) => map.remove(last),
            Value::Array(items) => {
                let index = array_index(last).filter(|i| *i < items.len())?;
                Some(items.remove(index))
            }
            _ => None,
        }
    }
}

fn lookup_mut<'a>(data: &'a mut Map<String, Value>, segments: &[String]) -> Option<&'a mut Value> {
    let (first, rest) = segments.split_first()?;
    let mut node = data.get_mut(first)?;
    for segment in rest {
        node = match node {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(array_index(segment)?)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Write `value` at `path` inside `data`.
///
/// Errors can only come from an existing array, and every array on the path
/// is reached before anything is created or replaced, so a failed write
/// leaves `data` as it was.
fn set_in(data: &mut Map<String, Value>, path: &SessionPath, value: Value) -> Result<()> {
    let (parents, last) = path.split_last();
    let Some((first, middle)) = parents.split_first() else {
        data.insert(last.to_string(), value);
        return Ok(());
    };

    let mut node = data
        .entry(first.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    for segment in middle {
        node = descend(node, segment, path)?;
    }

    match node {
        Value::Array(items) => {
            let slot = element_mut(items, last, path)?;
            *slot = value;
        }
        Value::Object(map) => {
            map.insert(last.to_string(), value);
        }
        other => {
            debug!("Replacing {} with an object to set '{}'", value_kind(other), path);
            let mut map = Map::new();
            map.insert(last.to_string(), value);
            *other = Value::Object(map);
        }
    }
    Ok(())
}

fn descend<'a>(node: &'a mut Value, segment: &str, path: &SessionPath) -> Result<&'a mut Value> {
    if !node.is_object() && !node.is_array() {
        debug!("Replacing {} with an object to set '{}'", value_kind(node), path);
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Array(items) => element_mut(items, segment, path),
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))),
        _ => unreachable!("intermediate node was just made an object"),
    }
}

fn element_mut<'a>(items: &'a mut [Value], segment: &str, path: &SessionPath) -> Result<&'a mut Value> {
    let len = items.len();
    match array_index(segment) {
        Some(index) if index < len => Ok(&mut items[index]),
        _ => Err(Error::shape_mismatch(
            path.to_string(),
            "an array",
            "an index below its length",
        )),
    }
}

/// Parse a segment as an array index. Only plain digits count.
fn array_index(segment: &str) -> Option<usize> {
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.parse().ok()
    } else {
        None
    }
}

impl From<Map<String, Value>> for SessionStore {
    fn from(data: Map<String, Value>) -> Self {
        Self::from_map(data)
    }
}

/// Human-readable kind of a JSON value, for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
