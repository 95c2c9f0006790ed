//! Log entry normalization and failure classification.
//!
//! Every [`LogEntry`] becomes exactly one display line. Structured records
//! render as `[timestamp] LEVEL message – extra`, with empty segments
//! omitted. Classification decides whether a line should flash the feed.

use serde_json::Value;
use smdash_config::ClassifierConfig;

use crate::fields::{self, Concept};
use crate::snapshot::LogEntry;

/// Render a log entry as a single display line.
pub fn normalize(entry: &LogEntry) -> String {
    match entry {
        LogEntry::Text(text) => text.clone(),
        LogEntry::Record(record) => {
            let timestamp = fields::resolve_or_empty(record, Concept::Timestamp);
            let level = fields::resolve_or_empty(record, Concept::Level).to_uppercase();
            let message = fields::resolve_or_empty(record, Concept::Message);
            let extra = fields::resolve_or_empty(record, Concept::Extra);

            let mut line = String::new();
            if !timestamp.is_empty() {
                line.push('[');
                line.push_str(&timestamp);
                line.push_str("] ");
            }
            if !level.is_empty() {
                line.push_str(&level);
                line.push(' ');
            }
            line.push_str(&message);
            if !extra.is_empty() {
                line.push_str(" – ");
                line.push_str(&extra);
            }
            line.trim().to_string()
        }
        LogEntry::Other(value) => display_value(value),
    }
}

/// Generic string conversion for non-text, non-record entries.
///
/// Arrays flatten to comma-separated items, with `null` items rendered
/// empty; a bare `null` renders as `null`.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object]".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
    }
}

/// Decides whether a log entry is a security failure.
pub trait FailureClassifier: Send + Sync {
    fn is_failure(&self, entry: &LogEntry) -> bool;

    /// Short identifier shown by `smdash config --show`.
    fn name(&self) -> &'static str;
}

/// Substring scan of the lower-cased normalized line.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn matches_line(&self, line: &str) -> bool {
        let line = line.to_lowercase();
        self.keywords.iter().any(|k| line.contains(k.as_str()))
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(smdash_config::default_keywords())
    }
}

impl FailureClassifier for KeywordClassifier {
    fn is_failure(&self, entry: &LogEntry) -> bool {
        self.matches_line(&normalize(entry))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Levels that mark a structured record as a failure.
const FAILURE_LEVELS: &[&str] = &[
    "ERROR", "ERR", "CRITICAL", "CRIT", "FATAL", "ALERT", "EMERG", "HIGH",
];

/// Trusts an explicit level on structured records; scans keywords otherwise.
#[derive(Debug, Clone, Default)]
pub struct SeverityFirstClassifier {
    fallback: KeywordClassifier,
}

impl SeverityFirstClassifier {
    pub fn new(fallback: KeywordClassifier) -> Self {
        Self { fallback }
    }
}

impl FailureClassifier for SeverityFirstClassifier {
    fn is_failure(&self, entry: &LogEntry) -> bool {
        if let LogEntry::Record(record) = entry {
            if let Some(level) = fields::resolve(record, Concept::Level) {
                let level = level.to_uppercase();
                return FAILURE_LEVELS.contains(&level.as_str());
            }
        }
        self.fallback.is_failure(entry)
    }

    fn name(&self) -> &'static str {
        "severity-first"
    }
}

/// Keyword check with the default keyword set.
pub fn is_failure_signal(entry: &LogEntry) -> bool {
    KeywordClassifier::default().is_failure(entry)
}

/// Build the classifier selected by configuration.
///
/// Unknown modes are rejected by config validation; they fall back to
/// keyword scanning here.
pub fn classifier_from_config(config: &ClassifierConfig) -> Box<dyn FailureClassifier> {
    let keywords = KeywordClassifier::new(config.keywords.iter().cloned());
    match config.mode.as_str() {
        "severity-first" => Box::new(SeverityFirstClassifier::new(keywords)),
        _ => Box::new(keywords),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> LogEntry {
        LogEntry::from(value)
    }

    #[test]
    fn test_text_is_verbatim() {
        assert_eq!(
            normalize(&LogEntry::from("  [SSH] accepted key  ")),
            "  [SSH] accepted key  "
        );
    }

    #[test]
    fn test_record_full_line() {
        let e = entry(json!({
            "time": "2024-01-01 10:00:00",
            "severity": "warn",
            "msg": "rate limited",
            "context": "ftp"
        }));
        assert_eq!(normalize(&e), "[2024-01-01 10:00:00] WARN rate limited – ftp");
    }

    #[test]
    fn test_record_omits_empty_segments() {
        assert_eq!(normalize(&entry(json!({"message": "hello"}))), "hello");
        assert_eq!(normalize(&entry(json!({"level": "info"}))), "INFO");
        assert_eq!(normalize(&entry(json!({"ts": "t1"}))), "[t1]");
        assert_eq!(normalize(&entry(json!({}))), "");
    }

    #[test]
    fn test_record_extra_without_message() {
        assert_eq!(normalize(&entry(json!({"detail": "x"}))), "– x");
    }

    #[test]
    fn test_other_values() {
        assert_eq!(normalize(&entry(json!(42))), "42");
        assert_eq!(normalize(&entry(json!(false))), "false");
        assert_eq!(normalize(&entry(Value::Null)), "null");
        assert_eq!(normalize(&entry(json!([1, null, "a", [2, 3]]))), "1,,a,2,3");
    }

    #[test]
    fn test_is_failure_signal_examples() {
        assert!(!is_failure_signal(&LogEntry::from("2024 INFO login ok")));
        assert!(is_failure_signal(&LogEntry::from("2024 ERROR auth denied")));
        assert!(is_failure_signal(&LogEntry::from("IP 1.2.3.4 Blocked")));
        assert!(is_failure_signal(&LogEntry::from("login FAIL for bob")));
        assert!(!is_failure_signal(&LogEntry::from("failover complete")));
    }

    #[test]
    fn test_keyword_classifier_on_records() {
        let e = entry(json!({"level": "warn", "msg": "Password FAILED for root"}));
        assert!(is_failure_signal(&e));
    }

    #[test]
    fn test_custom_keywords_are_lowercased() {
        let c = KeywordClassifier::new(["Intrusion"]);
        assert!(c.is_failure(&LogEntry::from("possible INTRUSION detected")));
        assert!(!c.is_failure(&LogEntry::from("ERROR")));
    }

    #[test]
    fn test_severity_first_trusts_level() {
        let c = SeverityFirstClassifier::default();
        // Level says info, so the keyword in the message is ignored.
        assert!(!c.is_failure(&entry(json!({"level": "info", "msg": "blocked 1.2.3.4"}))));
        assert!(c.is_failure(&entry(json!({"type": "crit", "msg": "disk"}))));
        assert!(c.is_failure(&entry(json!({"severity": "HIGH"}))));
    }

    #[test]
    fn test_severity_first_falls_back_to_keywords() {
        let c = SeverityFirstClassifier::default();
        assert!(c.is_failure(&LogEntry::from("auth failed")));
        assert!(c.is_failure(&entry(json!({"msg": "access denied"}))));
        assert!(!c.is_failure(&entry(json!({"msg": "all good"}))));
    }

    #[test]
    fn test_classifier_from_config() {
        let mut config = ClassifierConfig::default();
        assert_eq!(classifier_from_config(&config).name(), "keyword");

        config.mode = "severity-first".to_string();
        let c = classifier_from_config(&config);
        assert_eq!(c.name(), "severity-first");
        assert!(c.is_failure(&entry(json!({"level": "error"}))));
    }
}
