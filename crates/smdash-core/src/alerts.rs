//! Alert table rendering: newest first, windowed, with the age of the
//! freshest alert.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::snapshot::Alert;
use crate::timefmt::{self, Locale};

/// Placeholder for missing table cells.
pub const EMPTY_CELL: &str = "—";

/// Row severity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Case-insensitive; anything other than HIGH or MEDIUM is low.
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "HIGH" => Severity::High,
            "MEDIUM" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        })
    }
}

/// Display label for a service identifier.
pub fn service_label(service: &str) -> String {
    match service.to_lowercase().as_str() {
        "ssh" => "SSH".to_string(),
        "ftp" => "FTP".to_string(),
        "apache" => "Apache".to_string(),
        "" => EMPTY_CELL.to_string(),
        _ => service.to_string(),
    }
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRow {
    pub when: String,
    pub service: String,
    pub ip: String,
    pub country: String,
    pub severity: Severity,
    /// Severity text as shown; the daemon's own word, upper-cased.
    pub severity_label: String,
    pub message: String,
    #[serde(skip)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl AlertRow {
    fn from_alert(alert: &Alert, timestamp: Option<DateTime<Utc>>, locale: Option<Locale>) -> Self {
        let severity_label = if alert.severity.is_empty() {
            Severity::Low.to_string()
        } else {
            alert.severity.to_uppercase()
        };
        Self {
            when: timefmt::format_wall_clock(&alert.timestamp, locale),
            service: service_label(&alert.service),
            ip: cell(alert.ip.as_deref()),
            country: cell(alert.country.as_deref()),
            severity: Severity::classify(&alert.severity),
            severity_label,
            message: alert.message.clone(),
            timestamp,
        }
    }
}

fn cell(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(EMPTY_CELL)
        .to_string()
}

/// Rendered alert table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertTableView {
    /// At most `window` rows, newest first.
    pub rows: Vec<AlertRow>,
    /// Size of the full alert set, before windowing.
    pub total: usize,
    /// Instant of the freshest alert; `None` when there are no alerts.
    pub last_alert_at: Option<DateTime<Utc>>,
}

impl AlertTableView {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Render the alert set.
///
/// The daemon appends alerts in arrival order, so reversing puts the latest
/// arrival first; the window then keeps the first `window` rows. No
/// timestamp comparison is made. The result depends only on the inputs.
pub fn render_alerts(
    alerts: &[Alert],
    window: usize,
    now: DateTime<Utc>,
    locale: Option<Locale>,
) -> AlertTableView {
    if alerts.is_empty() {
        return AlertTableView::default();
    }

    let ordered: Vec<(&Alert, Option<DateTime<Utc>>)> = alerts
        .iter()
        .rev()
        .take(window)
        .map(|alert| {
            let parsed = if alert.timestamp.is_empty() {
                None
            } else {
                timefmt::parse_timestamp(&alert.timestamp).ok()
            };
            (alert, parsed)
        })
        .collect();

    let last_alert_at = match ordered.first() {
        Some((_, Some(ts))) => Some(*ts),
        Some((newest, None)) => {
            debug!(
                timestamp = %newest.timestamp,
                "newest alert has no usable timestamp, using current time"
            );
            Some(now)
        }
        None => None,
    };

    let rows = ordered
        .into_iter()
        .map(|(alert, ts)| AlertRow::from_alert(alert, ts, locale))
        .collect();

    AlertTableView {
        rows,
        total: alerts.len(),
        last_alert_at,
    }
}
