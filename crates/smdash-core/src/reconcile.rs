//! Incremental log feed reconciliation.
//!
//! The daemon always returns its whole log history. [`LogReconciler`] keeps a
//! cursor into that sequence so each poll only appends what is new, detects
//! when the daemon's buffer was reset, and reports when a newer failure line
//! arrived.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::normalize::{FailureClassifier, normalize};
use crate::snapshot::LogEntry;

/// One rendered line of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLine {
    pub text: String,
    pub failure: bool,
}

/// Rendered log lines plus a scroll position, measured in rows.
#[derive(Debug, Clone)]
pub struct LogFeed {
    lines: Vec<FeedLine>,
    scroll_top: usize,
    viewport_height: usize,
    tolerance: usize,
}

impl LogFeed {
    pub fn new(tolerance: usize) -> Self {
        Self {
            lines: Vec::new(),
            scroll_top: 0,
            viewport_height: 0,
            tolerance,
        }
    }

    pub fn lines(&self) -> &[FeedLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Update the visible height; front ends call this on every draw.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
        self.clamp();
    }

    /// Whether the view counts as pinned to the newest line.
    pub fn at_bottom(&self) -> bool {
        if self.lines.is_empty() {
            return true;
        }
        self.scroll_top + self.viewport_height + self.tolerance >= self.lines.len()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.max_scroll();
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_top = 0;
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_top = self.scroll_top.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_top = self.scroll_top.saturating_add(rows).min(self.max_scroll());
    }

    /// The lines currently inside the viewport.
    pub fn visible(&self) -> &[FeedLine] {
        let start = self.scroll_top.min(self.lines.len());
        let end = (start + self.viewport_height).min(self.lines.len());
        &self.lines[start..end]
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_height)
    }

    fn clamp(&mut self) {
        self.scroll_top = self.scroll_top.min(self.max_scroll());
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.scroll_top = 0;
    }

    fn push(&mut self, line: FeedLine) {
        self.lines.push(line);
    }
}

/// What one reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Lines appended to the feed.
    pub appended: usize,
    /// The feed was cleared because the sequence shrank.
    pub reset: bool,
    /// A failure newer than any flashed before arrived.
    pub new_failure: bool,
}

/// Cursor state across polls.
#[derive(Debug, Clone, Default)]
pub struct LogReconciler {
    last_logs_length: usize,
    last_failure_index: Option<usize>,
}

impl LogReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_logs_length(&self) -> usize {
        self.last_logs_length
    }

    pub fn last_failure_index(&self) -> Option<usize> {
        self.last_failure_index
    }

    /// Append the entries of `logs` not yet rendered into `feed`.
    pub fn reconcile(
        &mut self,
        logs: &[LogEntry],
        feed: &mut LogFeed,
        classifier: &dyn FailureClassifier,
    ) -> ReconcileOutcome {
        let was_at_bottom = feed.at_bottom();
        let mut outcome = ReconcileOutcome::default();

        if logs.len() < self.last_logs_length {
            debug!(
                previous = self.last_logs_length,
                current = logs.len(),
                "log sequence shrank, replaying feed"
            );
            feed.clear();
            self.last_logs_length = 0;
            self.last_failure_index = None;
            outcome.reset = true;
        }

        let mut latest_failure = None;
        for (idx, entry) in logs.iter().enumerate().skip(self.last_logs_length) {
            let failure = classifier.is_failure(entry);
            feed.push(FeedLine {
                text: normalize(entry),
                failure,
            });
            if failure {
                latest_failure = Some(idx);
            }
            outcome.appended += 1;
        }
        self.last_logs_length = logs.len();

        if was_at_bottom {
            feed.scroll_to_bottom();
        }

        if let Some(idx) = latest_failure {
            if self.last_failure_index.is_none_or(|prev| idx > prev) {
                self.last_failure_index = Some(idx);
                outcome.new_failure = true;
            }
        }

        if outcome.appended > 0 {
            debug!(
                appended = outcome.appended,
                total = self.last_logs_length,
                new_failure = outcome.new_failure,
                "reconciled log feed"
            );
        }
        outcome
    }
}

/// Transient highlight that expires on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlashSignal {
    until: Option<Instant>,
}

impl FlashSignal {
    /// Start (or extend) the highlight for `duration` from `now`.
    pub fn trigger(&mut self, now: Instant, duration: Duration) {
        self.until = Some(now + duration);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Drop an expired highlight. Returns true if it was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.until.is_some() && !self.is_active(now) {
            self.until = None;
            return true;
        }
        false
    }
}
