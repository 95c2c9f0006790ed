//! Tracing initialisation helpers for tests.
//!
//! Call [`init_test_tracing`] at the top of any test that wants the engine's
//! `tracing` output (poll results, health transitions) in the test log.
//! Initialises at most once per process.

use tracing_subscriber::EnvFilter;

/// Install a subscriber on the test-harness writer. `RUST_LOG` wins,
/// otherwise smdash crates log at `debug` and everything else at `warn`.
///
/// ```ignore
/// #[tokio::test]
/// async fn my_test() {
///     smdash_test_utils::tracing_setup::init_test_tracing();
///     tracing::debug!("visible in test output");
/// }
/// ```
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,smdash_core=debug")),
        )
        .with_test_writer()
        .try_init();
}
