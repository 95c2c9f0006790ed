//! Connection health derived from consecutive fetch failures.

use std::fmt;

use tracing::info;

/// Failures at which the daemon is considered unreachable.
pub const DISCONNECT_THRESHOLD: u32 = 3;

/// Health of the link to the monitoring daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionHealth {
    Healthy,
    Degraded,
    Disconnected,
}

impl ConnectionHealth {
    /// Pure mapping from the consecutive failure count.
    pub fn from_failures(failures: u32) -> Self {
        match failures {
            0 => ConnectionHealth::Healthy,
            f if f < DISCONNECT_THRESHOLD => ConnectionHealth::Degraded,
            _ => ConnectionHealth::Disconnected,
        }
    }
}

impl fmt::Display for ConnectionHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionHealth::Healthy => "healthy",
            ConnectionHealth::Degraded => "degraded",
            ConnectionHealth::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Consecutive-failure counter.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    consecutive_failures: u32,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn health(&self) -> ConnectionHealth {
        ConnectionHealth::from_failures(self.consecutive_failures)
    }

    /// Reset after a successful fetch.
    pub fn record_success(&mut self) -> ConnectionHealth {
        let before = self.health();
        self.consecutive_failures = 0;
        self.log_transition(before);
        ConnectionHealth::Healthy
    }

    /// Count one failed fetch and return the new health.
    pub fn record_failure(&mut self) -> ConnectionHealth {
        let before = self.health();
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.log_transition(before);
        self.health()
    }

    fn log_transition(&self, before: ConnectionHealth) {
        let after = self.health();
        if before != after {
            info!(
                from = %before,
                to = %after,
                failures = self.consecutive_failures,
                "connection health changed"
            );
        }
    }
}
