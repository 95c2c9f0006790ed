//! Plain-text rendering of a dashboard session.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use smdash_core::alerts::{AlertRow, Severity};
use smdash_core::reconcile::FeedLine;
use smdash_core::view::{Badge, HeaderView, Tone};
use smdash_core::{DashboardSession, RefreshOutcome, TickReport};

/// Log lines shown by `smdash snapshot`.
const REPORT_LOG_TAIL: usize = 20;

fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Ok => "+",
        Tone::Warn => "!",
        Tone::Neutral => "·",
    }
}

pub fn badge(badge: &Badge) -> String {
    format!("[{}] {}", tone_marker(badge.tone), badge.text)
}

pub fn header_line(header: &HeaderView) -> String {
    format!("{}  {}", badge(&header.badge), badge(&header.pill))
}

/// A feed line; failures get a `!` gutter.
pub fn feed_line(line: &FeedLine) -> String {
    let gutter = if line.failure { "!" } else { " " };
    format!("{gutter} {}", line.text)
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "HIGH",
        Severity::Medium => "MED ",
        Severity::Low => "low ",
    }
}

pub fn alert_row(row: &AlertRow) -> String {
    format!(
        "{} {:<19} {:<7} {:<15} {:<3} {:<8} {}",
        severity_tag(row.severity),
        row.when,
        row.service,
        row.ip,
        row.country,
        row.severity_label,
        row.message
    )
    .trim_end()
    .to_string()
}

/// Full report for `smdash snapshot`.
pub fn render_report(session: &DashboardSession, now: DateTime<Utc>) -> String {
    let labels = session.labels();
    let mut out = String::new();

    let _ = writeln!(out, "{}", header_line(session.header()));
    let stats = session.stats();
    let _ = writeln!(
        out,
        "SSH {}  FTP {}  Apache {}",
        stats.ssh, stats.ftp, stats.apache
    );
    let _ = writeln!(out, "{}", badge(&session.last_alert_pill(now)));

    let _ = writeln!(out);
    let _ = writeln!(out, "== {} ==", session.alert_count_label());
    let alerts = session.alerts();
    if alerts.is_empty() {
        let _ = writeln!(out, "  {}", labels.no_alerts);
    } else {
        for row in &alerts.rows {
            let _ = writeln!(out, "{}", alert_row(row));
        }
    }

    let _ = writeln!(out);
    let blocked = session.blocked();
    let _ = writeln!(out, "== blocked ({}) ==", blocked.len());
    if blocked.is_empty() {
        let _ = writeln!(out, "  {}", labels.no_blocked);
    } else {
        for ip in &blocked.items {
            let _ = writeln!(out, "  {ip}");
        }
    }

    let _ = writeln!(out);
    let lines = session.feed().lines();
    let _ = writeln!(out, "== logs ({}) ==", lines.len());
    let skip = lines.len().saturating_sub(REPORT_LOG_TAIL);
    for line in &lines[skip..] {
        let _ = writeln!(out, "{}", feed_line(line));
    }

    out
}

/// Lines `smdash watch` prints after one refresh.
pub fn watch_lines(
    session: &DashboardSession,
    report: &TickReport,
    previous_header: &HeaderView,
) -> Vec<String> {
    let mut out = Vec::new();

    if session.header() != previous_header {
        out.push(header_line(session.header()));
    }

    match &report.outcome {
        RefreshOutcome::Applied(outcome) => {
            if outcome.reset {
                out.push("-- log feed reset --".to_string());
            }
            let lines = session.feed().lines();
            let start = lines.len().saturating_sub(outcome.appended);
            out.extend(lines[start..].iter().map(feed_line));
            if outcome.new_failure {
                out.push("*** new failure in log feed ***".to_string());
            }
        }
        RefreshOutcome::Failed { failures, error } => {
            out.push(format!("-- fetch failed ({failures}): {error}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use smdash_core::FetchError;
    use smdash_core::timefmt::parse_timestamp;
    use smdash_test_utils::{ScriptedApi, TestConfigBuilder};

    fn now() -> DateTime<Utc> {
        parse_timestamp("2024-01-01T00:10:00Z").unwrap()
    }

    #[tokio::test]
    async fn test_report_sections() {
        let api = ScriptedApi::new().with_snapshot(json!({
            "status": {"status": "OK", "msg": "running"},
            "stats": {"ssh": 3, "ftp": 0, "apache": 1},
            "logs": ["boot", "auth failed for root"],
            "alerts": [{"timestamp": "2024-01-01T00:05:00Z", "severity": "HIGH",
                        "service": "ssh", "ip": "1.2.3.4", "message": "brute force"}],
            "blocked": ["10.0.0.5", "1.2.3.4"]
        }));
        let config = TestConfigBuilder::new().locale("en").build();
        let mut session = DashboardSession::new(&config);
        session.refresh(&api).await;

        let report = render_report(&session, now());
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "[+] OK – running  [+] Daemon running");
        assert_eq!(lines[1], "SSH 3  FTP 0  Apache 1");
        assert_eq!(lines[2], "[!] Last alert: 5 minutes ago");
        assert!(report.contains("== 1 alert =="));
        assert!(report.contains("brute force"));
        assert!(report.contains("== blocked (2) ==\n  1.2.3.4\n  10.0.0.5\n"));
        assert!(report.contains("\n! auth failed for root\n"));
    }

    #[tokio::test]
    async fn test_report_empty_states() {
        let api = ScriptedApi::new().with_snapshot(json!({}));
        let mut session = DashboardSession::new(&TestConfigBuilder::new().build());
        session.refresh(&api).await;

        let report = render_report(&session, now());
        assert!(report.contains("Sin alertas recientes"));
        assert!(report.contains("== 0 alertas =="));
        assert!(report.contains("No hay alertas registradas"));
        assert!(report.contains("No hay IPs bloqueadas"));
    }

    #[test_log::test(tokio::test)]
    async fn test_watch_lines_append_and_flash() {
        let api = ScriptedApi::new()
            .with_snapshot(json!({"logs": ["a"]}))
            .with_snapshot(json!({"logs": ["a", "b", "ERROR disk full"]}))
            .with_error(FetchError::Status(502));
        let mut session = DashboardSession::new(&TestConfigBuilder::new().build());

        let before = session.header().clone();
        let report = session.refresh(&api).await;
        assert_eq!(watch_lines(&session, &report, &before), vec!["  a"]);

        let before = session.header().clone();
        let report = session.refresh(&api).await;
        assert_eq!(
            watch_lines(&session, &report, &before),
            vec!["  b", "! ERROR disk full", "*** new failure in log feed ***"]
        );

        let before = session.header().clone();
        let report = session.refresh(&api).await;
        assert_eq!(
            watch_lines(&session, &report, &before),
            vec![
                "[!] Retraso de red…  [·] Esperando daemon".to_string(),
                "-- fetch failed (1): daemon returned HTTP 502".to_string(),
            ]
        );
    }

    #[test]
    fn test_feed_line_gutter() {
        let line = FeedLine {
            text: "denied".into(),
            failure: true,
        };
        assert_eq!(feed_line(&line), "! denied");
    }
}
