//! Session state and error types.

use std::fmt;
use std::time::Duration;

/// Lifecycle of a bridge session.
///
/// `Idle → Connecting → Open → Closed`, or `Connecting → Failed` when the
/// transport cannot be opened.  `Closed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, `start` not called yet.
    Idle,
    /// Transport establishment in progress.
    Connecting,
    /// Handshake frames submitted; events are accepted.
    Open,
    /// Transport could not be opened.
    Failed,
    /// Stopped by the caller or closed by the transport.
    Closed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Closed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level client error.
///
/// Only session establishment fails loudly.  Emitting while the session is
/// not open is a silent no-op, and transport failures after the handshake
/// surface through [`SessionState`] instead.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    #[error("config: {0}")]
    Config(String),
    #[error("websocket: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
    #[error("cannot start session in state {0}")]
    InvalidState(SessionState),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for BridgeError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

impl BridgeError {
    /// Whether the error came from opening the transport (refused, reset,
    /// timed out, rejected upgrade).
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::WebSocket(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(SessionState::Closed.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(!SessionState::Open.is_terminal());
        assert!(!SessionState::Idle.is_terminal());
    }

    #[test]
    fn error_display_messages() {
        let err = BridgeError::InvalidState(SessionState::Closed);
        assert_eq!(err.to_string(), "cannot start session in state closed");

        let err = BridgeError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("5s"));
        assert!(err.is_connection_error());

        let err = BridgeError::Config("url is required".into());
        assert!(!err.is_connection_error());
    }
}
