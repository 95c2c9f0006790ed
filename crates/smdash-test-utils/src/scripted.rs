//! In-memory [`DaemonApi`] with scripted replies.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;
use smdash_core::{BoxFuture, DaemonApi, FetchError, SnapshotPatch};

/// Replays queued fetch results; once empty every fetch fails with a
/// transport error. Unblock calls are recorded and succeed unless
/// [`ScriptedApi::fail_unblocks`] is set.
#[derive(Default)]
pub struct ScriptedApi {
    fetches: Mutex<VecDeque<Result<SnapshotPatch, FetchError>>>,
    unblocked: Mutex<Vec<String>>,
    fail_unblocks: bool,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful fetch of `body`.
    pub fn with_snapshot(self, body: Value) -> Self {
        let patch = SnapshotPatch::from_value(body).expect("scripted snapshot must be an object");
        self.fetches.lock().expect("lock").push_back(Ok(patch));
        self
    }

    /// Queue a failed fetch.
    pub fn with_error(self, error: FetchError) -> Self {
        self.fetches.lock().expect("lock").push_back(Err(error));
        self
    }

    pub fn fail_unblocks(mut self) -> Self {
        self.fail_unblocks = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.fetches.lock().expect("lock").len()
    }

    pub fn unblocked(&self) -> Vec<String> {
        self.unblocked.lock().expect("lock").clone()
    }
}

impl DaemonApi for ScriptedApi {
    fn fetch_snapshot(&self) -> BoxFuture<'_, Result<SnapshotPatch, FetchError>> {
        Box::pin(async move {
            self.fetches
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".to_string())))
        })
    }

    fn unblock(&self, ip: &str) -> BoxFuture<'_, Result<(), FetchError>> {
        let ip = ip.to_string();
        Box::pin(async move {
            self.unblocked.lock().expect("lock").push(ip);
            if self.fail_unblocks {
                Err(FetchError::Status(503))
            } else {
                Ok(())
            }
        })
    }
}
