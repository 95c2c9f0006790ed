//! Error types shared across the dashboard engine.

/// Errors from talking to the monitoring daemon.
///
/// `Transport` and `Status` are both transport-class failures: the snapshot
/// never arrived. `Decode` means it arrived but was not a JSON object.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("daemon returned HTTP {0}")]
    Status(u16),

    #[error("failed to decode snapshot: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether the request failed before a usable body was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status(_))
    }
}

/// An alert timestamp that could not be interpreted as a date.
///
/// Always recovered locally by substituting the current time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unparseable timestamp: {0:?}")]
pub struct ParseError(pub String);
