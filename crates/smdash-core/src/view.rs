//! Localized header, counters and pills shared by the front ends.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::snapshot::StatusReport;
use crate::timefmt::{self, Locale};

/// Visual tone of a badge or pill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Ok,
    Warn,
    Neutral,
}

/// A short piece of header text with its tone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub text: String,
    pub tone: Tone,
}

impl Badge {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Fixed UI strings for one language.
#[derive(Debug)]
pub struct Labels {
    pub connecting: &'static str,
    pub waiting: &'static str,
    pub daemon_running: &'static str,
    pub daemon_degraded: &'static str,
    pub network_delay: &'static str,
    pub disconnected: &'static str,
    pub no_connection: &'static str,
    pub last_alert: &'static str,
    pub alert_singular: &'static str,
    pub alert_plural: &'static str,
    pub no_alerts: &'static str,
    pub no_blocked: &'static str,
    pub unblock: &'static str,
}

static ES: Labels = Labels {
    connecting: "Conectando…",
    waiting: "Esperando daemon",
    daemon_running: "Daemon activo",
    daemon_degraded: "Daemon con problemas",
    network_delay: "Retraso de red…",
    disconnected: "SIN CONEXIÓN",
    no_connection: "Sin conexión con daemon",
    last_alert: "Última alerta",
    alert_singular: "alerta",
    alert_plural: "alertas",
    no_alerts: "No hay alertas registradas",
    no_blocked: "No hay IPs bloqueadas",
    unblock: "Desbloquear",
};

static EN: Labels = Labels {
    connecting: "Connecting…",
    waiting: "Waiting for daemon",
    daemon_running: "Daemon running",
    daemon_degraded: "Daemon degraded",
    network_delay: "Network delay…",
    disconnected: "DISCONNECTED",
    no_connection: "No connection to daemon",
    last_alert: "Last alert",
    alert_singular: "alert",
    alert_plural: "alerts",
    no_alerts: "No alerts recorded",
    no_blocked: "No blocked IPs",
    unblock: "Unblock",
};

impl Labels {
    /// Labels for `locale`; unsupported locales use Spanish.
    pub fn for_locale(locale: Option<Locale>) -> &'static Labels {
        match locale {
            Some(Locale::En) => &EN,
            _ => &ES,
        }
    }
}

/// Status badge plus daemon-health pill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    pub badge: Badge,
    pub pill: Badge,
}

impl HeaderView {
    /// Header shown before the first response.
    pub fn initial(labels: &Labels) -> Self {
        Self {
            badge: Badge::new(labels.connecting, Tone::Neutral),
            pill: Badge::new(labels.waiting, Tone::Neutral),
        }
    }

    /// Reflect the daemon's self-reported status.
    pub fn apply_status(&mut self, status: &StatusReport, labels: &Labels) {
        if status.is_ok() {
            self.badge = Badge::new(format!("OK – {}", status.msg), Tone::Ok);
            self.pill = Badge::new(labels.daemon_running, Tone::Ok);
        } else {
            self.badge = Badge::new("ERROR", Tone::Warn);
            self.pill = Badge::new(labels.daemon_degraded, Tone::Warn);
        }
    }

    /// Reflect a failed fetch. Below the disconnect threshold only the badge
    /// changes; the pill keeps the last known daemon state.
    pub fn apply_degraded(&mut self, failures: u32, labels: &Labels) {
        if failures < crate::connection::DISCONNECT_THRESHOLD {
            self.badge = Badge::new(labels.network_delay, Tone::Warn);
        } else {
            self.badge = Badge::new(labels.disconnected, Tone::Warn);
            self.pill = Badge::new(labels.no_connection, Tone::Warn);
        }
    }
}

/// `N alerta(s)` / `N alert(s)`.
pub fn alert_count_label(count: usize, labels: &Labels) -> String {
    let noun = if count == 1 {
        labels.alert_singular
    } else {
        labels.alert_plural
    };
    format!("{count} {noun}")
}

/// Pill showing how long ago the freshest alert was.
pub fn last_alert_pill(
    last_alert_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    locale: Option<Locale>,
) -> Badge {
    match last_alert_at {
        None => Badge::new(timefmt::no_recent_alerts(locale), Tone::Neutral),
        Some(at) => {
            let labels = Labels::for_locale(locale);
            let relative = timefmt::format_relative(Some(at), now, locale);
            Badge::new(format!("{}: {relative}", labels.last_alert), Tone::Warn)
        }
    }
}
