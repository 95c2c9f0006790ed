#![deny(unsafe_code)]

//! smdash core engine.
//!
//! Polls a SecureMonitor daemon and turns its snapshots into incremental
//! view state: connection health, service counters, an append-only log feed,
//! a sorted alert table and the blocked-IP list. The engine is UI-agnostic;
//! the TUI and CLI draw the views it produces.

use std::future::Future;
use std::pin::Pin;

/// A type-erased, `Send`-safe, boxed future for async trait methods that
/// need dynamic dispatch (`dyn DaemonApi`).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Alert table rendering.
pub mod alerts;
/// Blocked-IP list rendering.
pub mod blocked;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// HTTP client for the daemon API.
pub mod client;
/// Connection health tracking.
pub mod connection;
/// Error types.
pub mod error;
/// Ordered alias lookup for structured records.
pub mod fields;
/// Log line normalization and failure classification.
pub mod normalize;
/// Background polling and event dispatch.
pub mod poller;
/// Incremental log feed reconciliation.
pub mod reconcile;
/// Dashboard session state machine.
pub mod session;
/// Snapshot payload and merging.
pub mod snapshot;
/// Timestamp parsing and relative-time phrasing.
pub mod timefmt;
/// Localized header and pills.
pub mod view;

pub use client::{DaemonApi, HttpDaemonClient};
pub use connection::ConnectionHealth;
pub use error::{FetchError, ParseError};
pub use normalize::{FailureClassifier, is_failure_signal, normalize};
pub use poller::{DashboardEvent, Poller};
pub use session::{DashboardSession, Phase, RefreshOutcome, TickReport};
pub use snapshot::{Alert, LogEntry, Snapshot, SnapshotPatch};
