//! HTTP client for the SecureMonitor daemon API.
//!
//! The daemon exposes two endpoints: `GET /api/dashboard` returns the full
//! snapshot, `POST /api/unblock?ip=...` lifts a block. [`DaemonApi`] is the
//! seam the session and poller are written against, so tests can swap in an
//! in-memory implementation.

use std::time::Duration;

use reqwest::Client;
use smdash_config::AppConfig;
use tracing::debug;

use crate::BoxFuture;
use crate::build_info;
use crate::error::FetchError;
use crate::snapshot::SnapshotPatch;

const DASHBOARD_PATH: &str = "/api/dashboard";
const UNBLOCK_PATH: &str = "/api/unblock";

/// Operations the dashboard needs from the daemon.
///
/// Uses `BoxFuture` so it can be held as `Arc<dyn DaemonApi>`.
pub trait DaemonApi: Send + Sync {
    /// Fetch one snapshot. No retries.
    fn fetch_snapshot(&self) -> BoxFuture<'_, Result<SnapshotPatch, FetchError>>;

    /// Ask the daemon to unblock `ip`. Any 2xx is success.
    fn unblock(&self, ip: &str) -> BoxFuture<'_, Result<(), FetchError>>;
}

/// [`DaemonApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDaemonClient {
    client: Client,
    base_url: String,
}

impl HttpDaemonClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(build_info::user_agent())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::new(&config.daemon.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl DaemonApi for HttpDaemonClient {
    fn fetch_snapshot(&self) -> BoxFuture<'_, Result<SnapshotPatch, FetchError>> {
        Box::pin(async move {
            let url = self.url(DASHBOARD_PATH);
            debug!(%url, "fetching snapshot");

            let resp = self
                .client
                .get(&url)
                .header("accept", "application/json")
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            let body = resp
                .bytes()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            debug!(bytes = body.len(), "snapshot received");

            SnapshotPatch::from_slice(&body)
        })
    }

    fn unblock(&self, ip: &str) -> BoxFuture<'_, Result<(), FetchError>> {
        let ip = ip.to_string();
        Box::pin(async move {
            let url = self.url(UNBLOCK_PATH);
            debug!(%url, %ip, "requesting unblock");

            let resp = self
                .client
                .post(&url)
                .query(&[("ip", ip.as_str())])
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            Ok(())
        })
    }
}
