//! End-to-end tests: a dashboard session polling the mock daemon over HTTP.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::json;
use smdash_core::connection::ConnectionHealth;
use smdash_core::{
    DaemonApi, DashboardEvent, DashboardSession, FetchError, HttpDaemonClient, Poller,
    RefreshOutcome,
};
use smdash_test_utils::{MockDaemon, MockResponse, ScriptedApi, TestConfigBuilder};
use tokio::sync::mpsc::UnboundedReceiver;

fn client_for(daemon: &MockDaemon) -> HttpDaemonClient {
    HttpDaemonClient::new(&daemon.url(), Duration::from_secs(2)).unwrap()
}

async fn next(rx: &mut UnboundedReceiver<DashboardEvent>) -> DashboardEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("event timed out")
        .expect("channel closed")
}

#[test_log::test(tokio::test)]
async fn fetch_decodes_live_snapshot() {
    let daemon = MockDaemon::with_snapshot(json!({
        "status": {"status": "OK", "msg": "up"},
        "stats": {"ssh": 12},
        "logs": ["one", {"ts": "2024-01-01T00:00:00Z", "level": "error", "msg": "auth failed"}],
        "blocked": ["10.0.0.5", "1.2.3.4"]
    }))
    .await;

    let patch = client_for(&daemon).fetch_snapshot().await.unwrap();
    assert_eq!(patch.stats.unwrap().ssh, 12);
    assert_eq!(patch.logs.unwrap().len(), 2);
    assert_eq!(patch.alerts, None);
    assert_eq!(daemon.dashboard_requests(), 1);
}

#[tokio::test]
async fn non_2xx_is_status_error() {
    let daemon = MockDaemon::start().await;
    daemon.push_status(500);

    let err = client_for(&daemon).fetch_snapshot().await.unwrap_err();
    assert!(matches!(err, FetchError::Status(500)));
}

#[tokio::test]
async fn non_object_body_is_decode_error() {
    let daemon = MockDaemon::start().await;
    daemon.push(MockResponse::Raw("<html>maintenance</html>".into()));
    daemon.push_json(json!(["not", "an", "object"]));

    let client = client_for(&daemon);
    assert!(matches!(
        client.fetch_snapshot().await,
        Err(FetchError::Decode(_))
    ));
    assert!(matches!(
        client.fetch_snapshot().await,
        Err(FetchError::Decode(_))
    ));
}

#[tokio::test]
async fn http_500_keeps_last_known_good_state() {
    let daemon = MockDaemon::with_snapshot(json!({
        "status": {"status": "OK", "msg": "up"},
        "stats": {"ssh": 1, "ftp": 2, "apache": 3},
        "logs": ["a", "b"],
        "alerts": [{"timestamp": "2024-01-01T00:00:00Z", "severity": "HIGH", "service": "ssh"}],
        "blocked": ["1.2.3.4"]
    }))
    .await;
    let config = TestConfigBuilder::new().base_url(&daemon.url()).build();
    let client = HttpDaemonClient::from_config(&config).unwrap();
    let mut session = DashboardSession::new(&config);

    session.refresh(&client).await;
    let before = session.snapshot().clone();

    daemon.push_status(500);
    let report = session.refresh(&client).await;

    assert!(matches!(report.outcome, RefreshOutcome::Failed { failures: 1, .. }));
    assert_eq!(session.failures(), 1);
    assert_eq!(session.snapshot(), &before);
    assert_eq!(session.feed().len(), 2);
    assert_eq!(session.header().badge.text, "Retraso de red…");
}

#[tokio::test]
async fn unreachable_daemon_disconnects_after_three_failures() {
    let daemon = MockDaemon::start().await;
    let url = daemon.url();
    daemon.shutdown().await;

    let config = TestConfigBuilder::new().base_url(&url).locale("en").build();
    let client = HttpDaemonClient::from_config(&config).unwrap();
    let mut session = DashboardSession::new(&config);

    for expected in [
        ConnectionHealth::Degraded,
        ConnectionHealth::Degraded,
        ConnectionHealth::Disconnected,
    ] {
        assert_eq!(session.refresh(&client).await.health, expected);
    }
    assert_eq!(session.header().badge.text, "DISCONNECTED");
    assert_eq!(session.header().pill.text, "No connection to daemon");
}

#[tokio::test]
async fn growing_logs_append_incrementally_and_reset_replays() {
    let daemon = MockDaemon::with_snapshot(json!({"logs": ["a"]})).await;
    let config = TestConfigBuilder::new().base_url(&daemon.url()).build();
    let client = HttpDaemonClient::from_config(&config).unwrap();
    let mut session = DashboardSession::new(&config);

    session.refresh(&client).await;
    daemon.set_snapshot(json!({"logs": ["a", "b", "login failed"]}));
    let report = session.refresh(&client).await;
    assert!(report.new_failure());
    assert_eq!(session.feed().len(), 3);

    // Same logs again: nothing appended, no second flash.
    let report = session.refresh(&client).await;
    assert!(!report.new_failure());
    assert_eq!(session.feed().len(), 3);

    daemon.set_snapshot(json!({"logs": ["fresh start"]}));
    let report = session.refresh(&client).await;
    match report.outcome {
        RefreshOutcome::Applied(outcome) => assert!(outcome.reset),
        other => panic!("unexpected outcome: {other:?}"),
    }
    let lines: Vec<&str> = session.feed().lines().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(lines, vec!["fresh start"]);
}

#[tokio::test]
async fn unblock_round_trip_refreshes_blocked_list() {
    let daemon = MockDaemon::with_snapshot(json!({"blocked": ["10.0.0.5", "1.2.3.4"]})).await;
    let config = TestConfigBuilder::new().base_url(&daemon.url()).build();
    let api: Arc<dyn DaemonApi> = Arc::new(HttpDaemonClient::from_config(&config).unwrap());
    let (poller, mut rx) = Poller::new(api);
    let mut session = DashboardSession::new(&config);

    poller.refresh(&mut session);
    let event = next(&mut rx).await;
    poller.dispatch(&mut session, event);
    assert_eq!(session.blocked().items, vec!["1.2.3.4", "10.0.0.5"]);

    poller.spawn_unblock("1.2.3.4");
    let event = next(&mut rx).await;
    assert!(matches!(event, DashboardEvent::Unblocked { result: Ok(()), .. }));
    poller.dispatch(&mut session, event);

    let event = next(&mut rx).await;
    poller.dispatch(&mut session, event);
    assert_eq!(daemon.unblocked(), vec!["1.2.3.4"]);
    assert_eq!(session.blocked().items, vec!["10.0.0.5"]);
}

#[tokio::test]
async fn failed_unblock_still_refreshes_without_removing() {
    let daemon = MockDaemon::with_snapshot(json!({"blocked": ["1.2.3.4"]})).await;
    daemon.set_unblock_status(500);
    let config = TestConfigBuilder::new().base_url(&daemon.url()).build();
    let api: Arc<dyn DaemonApi> = Arc::new(HttpDaemonClient::from_config(&config).unwrap());
    let (poller, mut rx) = Poller::new(api);
    let mut session = DashboardSession::new(&config);

    poller.spawn_unblock("1.2.3.4");
    let event = next(&mut rx).await;
    assert!(matches!(
        event,
        DashboardEvent::Unblocked {
            result: Err(FetchError::Status(500)),
            ..
        }
    ));
    poller.dispatch(&mut session, event);
    assert!(session.is_refreshing());

    let event = next(&mut rx).await;
    poller.dispatch(&mut session, event);
    assert_eq!(session.blocked().items, vec!["1.2.3.4"]);
}

#[tokio::test]
async fn unblock_encodes_ipv6_query() {
    let daemon = MockDaemon::with_snapshot(json!({"blocked": ["fe80::1%eth0"]})).await;
    client_for(&daemon).unblock("fe80::1%eth0").await.unwrap();
    assert_eq!(daemon.unblocked(), vec!["fe80::1%eth0"]);
    assert_eq!(daemon.snapshot()["blocked"], json!([]));
}

#[tokio::test]
async fn scripted_api_drives_session() {
    let api = ScriptedApi::new()
        .with_error(FetchError::Transport("boom".into()))
        .with_snapshot(json!({"alerts": [
            {"timestamp": "2024-01-01T00:00:00Z", "severity": "LOW"},
            {"timestamp": "2024-01-01T00:05:00Z", "severity": "HIGH"}
        ]}));
    let config = TestConfigBuilder::new().locale("en").build();
    let mut session = DashboardSession::new(&config);

    assert_eq!(session.refresh(&api).await.health, ConnectionHealth::Degraded);
    assert_eq!(session.refresh(&api).await.health, ConnectionHealth::Healthy);
    assert_eq!(api.remaining(), 0);

    let labels: Vec<String> = session
        .alerts()
        .rows
        .iter()
        .map(|r| r.severity_label.clone())
        .collect();
    assert_eq!(labels, vec!["HIGH", "LOW"]);
    assert_eq!(session.alert_count_label(), "2 alerts");
    assert_eq!(
        session.alerts().last_alert_at,
        Some(smdash_core::timefmt::parse_timestamp("2024-01-01T00:05:00Z").unwrap())
    );
}

#[tokio::test]
async fn flash_expires_after_configured_duration() {
    let api = ScriptedApi::new().with_snapshot(json!({"logs": ["ERROR disk"]}));
    let config = TestConfigBuilder::new().flash_ms(1_000).build();
    let mut session = DashboardSession::new(&config);

    session.refresh(&api).await;
    let after = Instant::now();
    assert!(session.flash_active(after));
    assert!(!session.flash_active(after + Duration::from_millis(1_000)));
    assert!(session.expire_flash(after + Duration::from_millis(1_000)));
    assert!(!session.flash_active(after));
}
