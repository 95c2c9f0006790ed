//! Snapshot payload of `GET /api/dashboard` and partial-update merging.
//!
//! The daemon may omit any top-level field, and older builds send some
//! fields with other shapes. A field that is missing, `null`, or of the wrong
//! JSON type is treated as absent and the previous value is kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FetchError;
use crate::fields::{self, Concept};

/// One entry of the daemon's log feed.
///
/// Plain strings are the common case; structured records carry aliased keys
/// (see [`crate::fields`]). Anything else is kept so it can still be shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogEntry {
    Text(String),
    Record(Map<String, Value>),
    Other(Value),
}

impl From<&str> for LogEntry {
    fn from(s: &str) -> Self {
        LogEntry::Text(s.to_string())
    }
}

impl From<Value> for LogEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => LogEntry::Text(s),
            Value::Object(map) => LogEntry::Record(map),
            other => LogEntry::Other(other),
        }
    }
}

/// A security alert as reported by the daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Raw timestamp text (resolved through the timestamp aliases).
    pub timestamp: String,
    /// Raw severity text; classified when rendered.
    pub severity: String,
    /// Service identifier (`ssh`, `ftp`, `apache`, ...).
    pub service: String,
    pub ip: Option<String>,
    pub country: Option<String>,
    pub message: String,
}

impl Alert {
    /// Build an alert from a JSON object. Non-objects yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        Some(Self {
            timestamp: fields::resolve_or_empty(record, Concept::Timestamp),
            severity: fields::string_field(record, "severity").unwrap_or_default(),
            service: fields::string_field(record, "service").unwrap_or_default(),
            ip: fields::string_field(record, "ip"),
            country: fields::string_field(record, "country"),
            message: fields::string_field(record, "message").unwrap_or_default(),
        })
    }
}

/// Daemon self-reported health block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub msg: String,
}

impl StatusReport {
    /// Whether the daemon reports itself as healthy.
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// Per-service event counters. Missing counters read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStats {
    #[serde(default)]
    pub ssh: u64,
    #[serde(default)]
    pub ftp: u64,
    #[serde(default)]
    pub apache: u64,
}

/// The fields present in one decoded response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotPatch {
    pub status: Option<StatusReport>,
    pub stats: Option<ServiceStats>,
    pub logs: Option<Vec<LogEntry>>,
    pub alerts: Option<Vec<Alert>>,
    pub blocked: Option<Vec<String>>,
}

impl SnapshotPatch {
    /// Decode a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, FetchError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
        Self::from_value(value)
    }

    /// Decode an already-parsed JSON document. The root must be an object.
    pub fn from_value(value: Value) -> Result<Self, FetchError> {
        let Value::Object(mut root) = value else {
            return Err(FetchError::Decode(
                "snapshot root is not a JSON object".to_string(),
            ));
        };

        let status = take_typed::<StatusReport>(&mut root, "status", Value::is_object);
        let stats = take_typed::<ServiceStats>(&mut root, "stats", Value::is_object);
        let logs = take_array(&mut root, "logs")
            .map(|items| items.into_iter().map(LogEntry::from).collect());
        let alerts = take_array(&mut root, "alerts")
            .map(|items| items.iter().filter_map(Alert::from_value).collect());
        let blocked = take_array(&mut root, "blocked").map(|items| {
            items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) if !s.is_empty() => Some(s),
                    _ => None,
                })
                .collect()
        });

        Ok(Self {
            status,
            stats,
            logs,
            alerts,
            blocked,
        })
    }
}

fn take_array(root: &mut Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    match root.remove(key) {
        Some(Value::Array(items)) => Some(items),
        Some(Value::Null) | None => None,
        Some(other) => {
            debug!(field = key, kind = json_kind(&other), "ignoring non-array field");
            None
        }
    }
}

fn take_typed<T: for<'de> Deserialize<'de>>(
    root: &mut Map<String, Value>,
    key: &str,
    shape_ok: fn(&Value) -> bool,
) -> Option<T> {
    let value = root.remove(key)?;
    if !shape_ok(&value) {
        if !value.is_null() {
            debug!(field = key, kind = json_kind(&value), "ignoring malformed field");
        }
        return None;
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(field = key, error = %e, "ignoring undecodable field");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Last-known-good daemon state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub status: Option<StatusReport>,
    pub stats: Option<ServiceStats>,
    pub logs: Vec<LogEntry>,
    pub alerts: Vec<Alert>,
    pub blocked: Vec<String>,
}

impl Snapshot {
    /// Merge a decoded response, keeping the previous value of every field
    /// the response did not carry.
    pub fn merge(&mut self, patch: SnapshotPatch) {
        if let Some(status) = patch.status {
            self.status = Some(status);
        }
        if let Some(stats) = patch.stats {
            self.stats = Some(stats);
        }
        if let Some(logs) = patch.logs {
            self.logs = logs;
        }
        if let Some(alerts) = patch.alerts {
            self.alerts = alerts;
        }
        if let Some(blocked) = patch.blocked {
            self.blocked = blocked;
        }
    }
}
