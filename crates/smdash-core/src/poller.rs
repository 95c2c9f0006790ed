//! Background network I/O for a dashboard session.
//!
//! The session is owned by the front end's event loop. [`Poller`] runs the
//! timer, fetches and unblock requests on tokio tasks and delivers their
//! results as [`DashboardEvent`]s over an unbounded channel; the loop feeds
//! each event back through [`Poller::dispatch`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::client::DaemonApi;
use crate::error::FetchError;
use crate::session::{DashboardSession, TickReport};
use crate::snapshot::SnapshotPatch;

/// Something the owner loop has to apply to its session.
#[derive(Debug)]
pub enum DashboardEvent {
    /// The polling timer fired.
    Tick,
    /// A snapshot fetch finished.
    Snapshot(Result<SnapshotPatch, FetchError>),
    /// An unblock request finished.
    Unblocked {
        ip: String,
        result: Result<(), FetchError>,
    },
}

/// Spawns daemon requests and reports their results.
#[derive(Clone)]
pub struct Poller {
    api: Arc<dyn DaemonApi>,
    tx: mpsc::UnboundedSender<DashboardEvent>,
}

impl Poller {
    pub fn new(api: Arc<dyn DaemonApi>) -> (Self, mpsc::UnboundedReceiver<DashboardEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { api, tx }, rx)
    }

    /// Start the polling timer. The first tick fires immediately; ticks
    /// missed while the loop is busy are dropped. The task ends once the
    /// receiver is gone.
    pub fn spawn_ticker(&self, period: Duration) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(DashboardEvent::Tick).is_err() {
                    debug!("event receiver dropped, stopping ticker");
                    break;
                }
            }
        })
    }

    /// Fetch one snapshot in the background.
    pub fn spawn_fetch(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_snapshot().await;
            let _ = tx.send(DashboardEvent::Snapshot(result));
        });
    }

    /// Send an unblock request in the background.
    pub fn spawn_unblock(&self, ip: impl Into<String>) {
        let ip = ip.into();
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.unblock(&ip).await;
            let _ = tx.send(DashboardEvent::Unblocked { ip, result });
        });
    }

    /// Apply an event to `session`, starting whatever fetch it calls for.
    ///
    /// Returns the refresh report when the event completed a fetch.
    pub fn dispatch(
        &self,
        session: &mut DashboardSession,
        event: DashboardEvent,
    ) -> Option<TickReport> {
        match event {
            DashboardEvent::Tick => {
                if session.begin_tick() {
                    self.spawn_fetch();
                }
                None
            }
            DashboardEvent::Snapshot(result) => {
                let report = session.complete_refresh(result, Utc::now(), Instant::now());
                if report.follow_up {
                    self.spawn_fetch();
                }
                Some(report)
            }
            DashboardEvent::Unblocked { ip, result } => {
                match result {
                    Ok(()) => info!(%ip, "unblock request accepted"),
                    Err(e) => warn!(%ip, error = %e, "unblock request failed"),
                }
                // Refresh regardless of outcome; the list only changes when
                // the daemon says so.
                if session.request_refresh() {
                    self.spawn_fetch();
                }
                None
            }
        }
    }

    /// Manual refresh from the user.
    pub fn refresh(&self, session: &mut DashboardSession) {
        if session.request_refresh() {
            self.spawn_fetch();
        }
    }
}
