//! Field paths and their resolution against record payloads.
//!
//! A field path is a dot-separated list of field names, such as
//! `"meta.total_reads"`. Resolution is total: a path either lands on a value
//! or it is absent. It never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A parsed, dot-separated path into a record payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path.
    ///
    /// Empty segments (`""`, `"a..b"`, `".a"`) are kept, and a path containing
    /// one never resolves.
    pub fn parse(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = raw.split('.').map(str::to_string).collect();
        Self { raw, segments }
    }

    /// The path as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The individual field names.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve this path against a payload.
    pub fn resolve<'a>(&self, payload: &'a Value) -> Option<&'a Value> {
        resolve(payload, self)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self::parse(path)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Resolve `path` against `payload`.
///
/// Descends through objects one segment at a time. Returns `None` when a
/// segment is missing or empty, when an intermediate value is not an object
/// (lists included), or when the final value is `null`.
pub fn resolve<'a>(payload: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = payload;
    for segment in &path.segments {
        if segment.is_empty() {
            return None;
        }
        current = current.as_object()?.get(segment)?;
    }
    match current {
        Value::Null => None,
        value => Some(value),
    }
}
