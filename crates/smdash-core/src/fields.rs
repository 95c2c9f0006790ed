//! Ordered alias resolution for loosely-typed JSON records.
//!
//! Upstream log sources disagree on key names: one emits `msg`, another
//! `message`, a third `error`. Every concept the dashboard reads has an
//! ordered list of accepted keys, and [`resolve`] returns the value of the
//! first key that is present with a meaningful value.

use serde_json::{Map, Value};

/// A field the dashboard extracts from structured records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concept {
    Timestamp,
    Level,
    Message,
    Extra,
}

impl Concept {
    /// Accepted keys for this concept, in priority order.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Concept::Timestamp => &["timestamp", "time", "ts"],
            Concept::Level => &["level", "severity", "type"],
            Concept::Message => &["message", "msg", "error", "err", "text"],
            Concept::Extra => &["detail", "details", "context", "info"],
        }
    }
}

/// Resolve `concept` against `record`.
///
/// A key only counts when its value is a non-empty string, a non-zero number
/// or `true`; empty strings, zero, `false`, `null`, arrays and objects are
/// skipped so the next alias gets a chance.
pub fn resolve(record: &Map<String, Value>, concept: Concept) -> Option<String> {
    concept
        .aliases()
        .iter()
        .find_map(|key| record.get(*key).and_then(present_text))
}

/// Resolve `concept`, returning an empty string when nothing matches.
pub fn resolve_or_empty(record: &Map<String, Value>, concept: Concept) -> String {
    resolve(record, concept).unwrap_or_default()
}

/// Plain text for a scalar field, or `None` when the value is "absent".
fn present_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Read a plain string field without aliasing (used for alert columns).
pub fn string_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record.get(key).and_then(present_text)
}
