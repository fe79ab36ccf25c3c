//! `cb-client`: forwards console lines and errors to a code-bridge server.
//!
//! A bridge server is a development-time listener (IDE plugin, dashboard)
//! that collects diagnostics from running programs.  This crate owns the
//! client side of that connection: one WebSocket session per
//! [`BridgeClient`], a fixed two-frame handshake, and fire-and-forget event
//! emission that never blocks the host program.
//!
//! # Usage
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), cb_client::BridgeError> {
//! use cb_client::BridgeClientBuilder;
//!
//! let mut client = BridgeClientBuilder::new()
//!     .url("ws://localhost:9877")
//!     .secret("dev-secret")
//!     .project_id("my-app")
//!     .build()?;
//!
//! client.start().await?;
//! client.send_console("info", "server listening on :8080");
//! client.send_error("database unreachable");
//! client.stop();
//! # Ok(())
//! # }
//! ```
//!
//! # Connection flow
//!
//! 1. Connect WS with an `X-Bridge-Secret: <secret>` header (5s bound)
//! 2. Send `auth { secret, role: "bridge" }`
//! 3. Send `hello { capabilities, platform, projectId, protocol }`
//! 4. `start` resolves; `console` / `error` frames flow in call order
//! 5. `stop` sends a `1000 "bye"` close frame
//!
//! There is no reconnect: a closed or failed session stays that way, and
//! events emitted while the session is not open are dropped.

pub mod builder;
pub mod client;
pub mod config;
pub mod emitter;
pub mod forward;
mod session;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use builder::BridgeClientBuilder;
pub use client::BridgeClient;
pub use config::BridgeConfig;
pub use emitter::BridgeEmitter;
pub use forward::BridgeLayer;
pub use types::{BridgeError, SessionState};

// Re-export protocol types so callers never need to import cb-protocol directly.
pub use cb_protocol::{BridgeMessage, PROTOCOL_VERSION};
