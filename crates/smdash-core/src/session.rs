//! Dashboard session: the single owner of all dashboard state.
//!
//! A session is driven by its front end. Each refresh goes
//! `Idle -> Refreshing -> Idle`; the fetch itself happens outside (see
//! [`crate::poller`]) and its result is handed back through
//! [`DashboardSession::complete_refresh`].

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use smdash_config::AppConfig;
use tracing::{debug, warn};

use crate::alerts::{AlertTableView, render_alerts};
use crate::blocked::{BlockedListView, render_blocked};
use crate::client::DaemonApi;
use crate::connection::{ConnectionHealth, ConnectionTracker};
use crate::error::FetchError;
use crate::normalize::{FailureClassifier, classifier_from_config};
use crate::reconcile::{FlashSignal, LogFeed, LogReconciler, ReconcileOutcome};
use crate::snapshot::{ServiceStats, Snapshot, SnapshotPatch};
use crate::timefmt::Locale;
use crate::view::{self, Badge, HeaderView, Labels};

/// Refresh state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Refreshing,
}

/// What a completed refresh did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A snapshot was merged and rendered.
    Applied(ReconcileOutcome),
    /// The fetch failed; only the header changed.
    Failed { failures: u32, error: String },
}

/// Result of [`DashboardSession::complete_refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub outcome: RefreshOutcome,
    pub health: ConnectionHealth,
    /// A refresh was requested while this one ran. The session is already
    /// back in `Refreshing`; the caller must start the follow-up fetch.
    pub follow_up: bool,
}

impl TickReport {
    pub fn new_failure(&self) -> bool {
        matches!(self.outcome, RefreshOutcome::Applied(o) if o.new_failure)
    }
}

/// All dashboard state, rebuilt from the daemon's snapshots.
pub struct DashboardSession {
    snapshot: Snapshot,
    connection: ConnectionTracker,
    reconciler: LogReconciler,
    feed: LogFeed,
    flash: FlashSignal,
    header: HeaderView,
    alerts: AlertTableView,
    blocked: BlockedListView,
    classifier: Box<dyn FailureClassifier>,
    locale: Option<Locale>,
    alert_window: usize,
    flash_duration: Duration,
    phase: Phase,
    pending_refresh: bool,
}

impl DashboardSession {
    pub fn new(config: &AppConfig) -> Self {
        let locale = Locale::from_tag(&config.display.locale);
        Self {
            snapshot: Snapshot::default(),
            connection: ConnectionTracker::new(),
            reconciler: LogReconciler::new(),
            feed: LogFeed::new(config.display.scroll_tolerance),
            flash: FlashSignal::default(),
            header: HeaderView::initial(Labels::for_locale(locale)),
            alerts: AlertTableView::default(),
            blocked: BlockedListView::default(),
            classifier: classifier_from_config(&config.classifier),
            locale,
            alert_window: config.display.alert_window,
            flash_duration: config.flash_duration(),
            phase: Phase::Idle,
            pending_refresh: false,
        }
    }

    /// Replace the failure classifier.
    pub fn with_classifier(mut self, classifier: Box<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    // ── Refresh state machine ────────────────────────────────────────

    /// Start a timer-driven refresh. Skipped while one is in flight.
    pub fn begin_tick(&mut self) -> bool {
        if self.phase == Phase::Refreshing {
            debug!("tick skipped, fetch in flight");
            return false;
        }
        self.phase = Phase::Refreshing;
        true
    }

    /// Start a manual refresh. While a fetch is in flight the request is
    /// remembered and served once it completes; returns whether the caller
    /// should fetch now.
    pub fn request_refresh(&mut self) -> bool {
        if self.phase == Phase::Refreshing {
            self.pending_refresh = true;
            debug!("refresh queued behind in-flight fetch");
            return false;
        }
        self.phase = Phase::Refreshing;
        true
    }

    /// Apply the result of the in-flight fetch.
    pub fn complete_refresh(
        &mut self,
        result: Result<SnapshotPatch, FetchError>,
        now: DateTime<Utc>,
        instant: Instant,
    ) -> TickReport {
        if self.phase != Phase::Refreshing {
            warn!("refresh result arrived while idle");
        }

        let outcome = match result {
            Ok(patch) => RefreshOutcome::Applied(self.apply_snapshot(patch, now, instant)),
            Err(e) => {
                self.apply_failure();
                debug!(error = %e, failures = self.connection.failures(), "fetch failed");
                RefreshOutcome::Failed {
                    failures: self.connection.failures(),
                    error: e.to_string(),
                }
            }
        };

        let follow_up = std::mem::take(&mut self.pending_refresh);
        self.phase = if follow_up {
            Phase::Refreshing
        } else {
            Phase::Idle
        };

        TickReport {
            outcome,
            health: self.connection.health(),
            follow_up,
        }
    }

    /// Fetch and apply one snapshot inline, serving any queued refresh
    /// before returning.
    pub async fn refresh(&mut self, api: &dyn DaemonApi) -> TickReport {
        self.phase = Phase::Refreshing;
        loop {
            let result = api.fetch_snapshot().await;
            let report = self.complete_refresh(result, Utc::now(), Instant::now());
            if !report.follow_up {
                return report;
            }
        }
    }

    fn apply_snapshot(
        &mut self,
        patch: SnapshotPatch,
        now: DateTime<Utc>,
        instant: Instant,
    ) -> ReconcileOutcome {
        self.connection.record_success();
        self.snapshot.merge(patch);

        let labels = Labels::for_locale(self.locale);
        if let Some(status) = &self.snapshot.status {
            self.header.apply_status(status, labels);
        }

        let outcome = self.reconciler.reconcile(
            &self.snapshot.logs,
            &mut self.feed,
            self.classifier.as_ref(),
        );
        if outcome.new_failure {
            self.flash.trigger(instant, self.flash_duration);
        }

        self.alerts = render_alerts(&self.snapshot.alerts, self.alert_window, now, self.locale);
        self.blocked = render_blocked(&self.snapshot.blocked);
        outcome
    }

    fn apply_failure(&mut self) {
        self.connection.record_failure();
        self.header
            .apply_degraded(self.connection.failures(), Labels::for_locale(self.locale));
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_refreshing(&self) -> bool {
        self.phase == Phase::Refreshing
    }

    pub fn pending_refresh(&self) -> bool {
        self.pending_refresh
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn health(&self) -> ConnectionHealth {
        self.connection.health()
    }

    pub fn failures(&self) -> u32 {
        self.connection.failures()
    }

    pub fn header(&self) -> &HeaderView {
        &self.header
    }

    /// Per-service counters; zero until the daemon reports them.
    pub fn stats(&self) -> ServiceStats {
        self.snapshot.stats.unwrap_or_default()
    }

    pub fn feed(&self) -> &LogFeed {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut LogFeed {
        &mut self.feed
    }

    pub fn reconciler(&self) -> &LogReconciler {
        &self.reconciler
    }

    pub fn flash_active(&self, instant: Instant) -> bool {
        self.flash.is_active(instant)
    }

    /// Clear an expired flash; returns true when a redraw is due.
    pub fn expire_flash(&mut self, instant: Instant) -> bool {
        self.flash.expire(instant)
    }

    pub fn alerts(&self) -> &AlertTableView {
        &self.alerts
    }

    pub fn blocked(&self) -> &BlockedListView {
        &self.blocked
    }

    pub fn locale(&self) -> Option<Locale> {
        self.locale
    }

    pub fn labels(&self) -> &'static Labels {
        Labels::for_locale(self.locale)
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    pub fn alert_count_label(&self) -> String {
        view::alert_count_label(self.alerts.total, self.labels())
    }

    pub fn last_alert_pill(&self, now: DateTime<Utc>) -> Badge {
        view::last_alert_pill(self.alerts.last_alert_at, now, self.locale)
    }
}
