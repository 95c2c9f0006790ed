#![deny(unsafe_code)]

//! Shared test utilities for the smdash workspace.
//!
//! Provides config builders, temporary config files, tracing helpers, a mock
//! SecureMonitor daemon served over real HTTP, and an in-memory
//! [`smdash_core::DaemonApi`] for tests that do not need the network.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! smdash-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod mock_daemon;
pub mod scripted;
pub mod tracing_setup;

pub use config::{TestConfigBuilder, TestConfigFile};
pub use mock_daemon::{MockDaemon, MockResponse};
pub use scripted::ScriptedApi;
