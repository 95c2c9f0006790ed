//! Fuzz target for snapshot decoding and rendering.
//!
//! Run with: cargo +nightly fuzz run fuzz_snapshot_decode
//!
//! Treats the input as a `/api/dashboard` body and pushes whatever decodes
//! through a full session refresh: merge, log reconciliation, alert and
//! blocked-list rendering.

#![no_main]

use std::time::Instant;

use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use smdash_config::AppConfig;
use smdash_core::{DashboardSession, SnapshotPatch};

fuzz_target!(|data: &[u8]| {
    let Ok(patch) = SnapshotPatch::from_slice(data) else {
        return;
    };
    let mut session = DashboardSession::new(&AppConfig::default());
    session.begin_tick();
    session.complete_refresh(Ok(patch), Utc::now(), Instant::now());

    assert_eq!(session.feed().len(), session.reconciler().last_logs_length());
    assert!(session.alerts().rows.len() <= session.alerts().total);
    let _ = session.last_alert_pill(Utc::now());
});
