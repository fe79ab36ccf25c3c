//! Bridge protocol: WebSocket message types and protocol constants.
//!
//! A bridge client opens one WebSocket connection to a bridge server,
//! sends `auth` then `hello`, and afterwards streams `console` and `error`
//! events.  Every message is a single UTF-8 JSON text frame whose `type`
//! field selects the variant.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Protocol revision announced in `hello`.  Bumping it is a breaking change
/// for bridge servers.
pub const PROTOCOL_VERSION: u32 = 2;

/// Platform identifier announced in `hello`.
pub const PLATFORM: &str = "rust";

/// Capability set used when the caller configures none.
pub const DEFAULT_CAPABILITIES: [&str; 2] = ["console", "error"];

/// Connection-level header that carries the shared secret during the
/// WebSocket upgrade request.
pub const SECRET_HEADER: &str = "X-Bridge-Secret";

/// Reason string sent with the normal-closure close frame.
pub const CLOSE_REASON: &str = "bye";

/// Upper bound on transport establishment.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Role announced in the `auth` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Bridge,
}

/// WebSocket message envelope.
///
/// Field order matches the wire layout; `serde_json` escapes backslashes,
/// quotes and control characters in every string field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    /// Client → Server: first frame, authorizes the session.
    #[serde(rename = "auth")]
    Auth { secret: String, role: Role },

    /// Client → Server: capabilities and identity, sent right after `auth`.
    #[serde(rename = "hello")]
    Hello {
        capabilities: Vec<String>,
        platform: String,
        #[serde(rename = "projectId")]
        project_id: String,
        protocol: u32,
    },

    /// Client → Server: one console line.
    #[serde(rename = "console")]
    Console {
        level: String,
        message: String,
        timestamp: i64,
    },

    /// Client → Server: one runtime error.
    #[serde(rename = "error")]
    Error { message: String, timestamp: i64 },
}

impl BridgeMessage {
    pub fn auth(secret: impl Into<String>) -> Self {
        Self::Auth {
            secret: secret.into(),
            role: Role::Bridge,
        }
    }

    /// Build the `hello` frame.  A missing project id is sent as `""`.
    pub fn hello(capabilities: &[String], project_id: Option<&str>) -> Self {
        Self::Hello {
            capabilities: capabilities.to_vec(),
            platform: PLATFORM.into(),
            project_id: project_id.unwrap_or_default().into(),
            protocol: PROTOCOL_VERSION,
        }
    }

    /// Console event stamped with the current wall-clock time.
    pub fn console(level: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Console {
            level: level.into(),
            message: message.into(),
            timestamp: now_ms(),
        }
    }

    /// Error event stamped with the current wall-clock time.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            timestamp: now_ms(),
        }
    }

    /// Wire name of the variant (the `type` field).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Hello { .. } => "hello",
            Self::Console { .. } => "console",
            Self::Error { .. } => "error",
        }
    }

    /// Encode as a single text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The default capability set as owned strings.
pub fn default_capabilities() -> Vec<String> {
    DEFAULT_CAPABILITIES.iter().map(|c| c.to_string()).collect()
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
