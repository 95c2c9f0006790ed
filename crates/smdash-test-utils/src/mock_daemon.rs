//! Mock SecureMonitor daemon.
//!
//! An axum server on an ephemeral localhost port that answers
//! `GET /api/dashboard` from a script of canned responses and records every
//! `POST /api/unblock`. Once the script runs out it keeps serving the current
//! snapshot, which unblock calls edit like the real daemon would.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// One scripted reply to `GET /api/dashboard`.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with this JSON body.
    Json(Value),
    /// Empty body with this status code.
    Status(u16),
    /// 200 with this raw body.
    Raw(String),
}

struct MockState {
    script: Mutex<VecDeque<MockResponse>>,
    snapshot: Mutex<Value>,
    unblocked: Mutex<Vec<String>>,
    unblock_status: Mutex<u16>,
    dashboard_requests: AtomicUsize,
}

/// Running mock daemon; shuts down on drop.
pub struct MockDaemon {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

/// Snapshot served when nothing else was configured.
pub fn default_snapshot() -> Value {
    json!({
        "status": {"status": "OK", "msg": "SecureMonitor is running"},
        "stats": {"ssh": 0, "ftp": 0, "apache": 0},
        "logs": [],
        "alerts": [],
        "blocked": []
    })
}

impl MockDaemon {
    /// Start serving [`default_snapshot`].
    pub async fn start() -> Self {
        Self::with_snapshot(default_snapshot()).await
    }

    /// Start serving `snapshot`.
    pub async fn with_snapshot(snapshot: Value) -> Self {
        let state = Arc::new(MockState {
            script: Mutex::new(VecDeque::new()),
            snapshot: Mutex::new(snapshot),
            unblocked: Mutex::new(Vec::new()),
            unblock_status: Mutex::new(200),
            dashboard_requests: AtomicUsize::new(0),
        });

        let app = axum::Router::new()
            .route("/api/dashboard", get(handle_dashboard))
            .route("/api/unblock", post(handle_unblock))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock daemon");
        let addr = listener.local_addr().expect("mock daemon has no address");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });
        debug!(%addr, "mock daemon listening");

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Base URL to put in `daemon.base_url`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue a one-shot reply ahead of the steady snapshot.
    pub fn push(&self, response: MockResponse) {
        self.state.script.lock().expect("lock").push_back(response);
    }

    pub fn push_json(&self, body: Value) {
        self.push(MockResponse::Json(body));
    }

    pub fn push_status(&self, status: u16) {
        self.push(MockResponse::Status(status));
    }

    /// Replace the steady snapshot.
    pub fn set_snapshot(&self, snapshot: Value) {
        *self.state.snapshot.lock().expect("lock") = snapshot;
    }

    pub fn snapshot(&self) -> Value {
        self.state.snapshot.lock().expect("lock").clone()
    }

    /// Status code returned by `POST /api/unblock`. Non-2xx codes leave the
    /// snapshot untouched.
    pub fn set_unblock_status(&self, status: u16) {
        *self.state.unblock_status.lock().expect("lock") = status;
    }

    /// IPs received by `POST /api/unblock`, in order.
    pub fn unblocked(&self) -> Vec<String> {
        self.state.unblocked.lock().expect("lock").clone()
    }

    /// Number of `GET /api/dashboard` requests served.
    pub fn dashboard_requests(&self) -> usize {
        self.state.dashboard_requests.load(Ordering::SeqCst)
    }

    /// Stop the server and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for MockDaemon {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_dashboard(State(state): State<Arc<MockState>>) -> Response {
    state.dashboard_requests.fetch_add(1, Ordering::SeqCst);
    let scripted = state.script.lock().expect("lock").pop_front();
    match scripted {
        Some(MockResponse::Json(body)) => Json(body).into_response(),
        Some(MockResponse::Status(code)) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Some(MockResponse::Raw(body)) => body.into_response(),
        None => {
            let snapshot = state.snapshot.lock().expect("lock").clone();
            Json(snapshot).into_response()
        }
    }
}

async fn handle_unblock(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    let ip = params.get("ip").cloned().unwrap_or_default();
    state.unblocked.lock().expect("lock").push(ip.clone());

    let code = *state.unblock_status.lock().expect("lock");
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_success() {
        let mut snapshot = state.snapshot.lock().expect("lock");
        if let Some(Value::Array(blocked)) = snapshot.get_mut("blocked") {
            blocked.retain(|v| v.as_str() != Some(ip.as_str()));
        }
    }
    status
}
