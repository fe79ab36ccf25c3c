//! Builder pattern for constructing a [`BridgeClient`].

use std::time::Duration;

use crate::client::BridgeClient;
use crate::config::BridgeConfig;
use crate::types::BridgeError;

/// Fluent builder for [`BridgeClient`].
///
/// # Example
///
/// ```rust,no_run
/// # use cb_client::BridgeClientBuilder;
/// let client = BridgeClientBuilder::new()
///     .url("ws://localhost:9877")
///     .secret("dev-secret")
///     .project_id("my-app")
///     .connect_timeout(std::time::Duration::from_secs(2))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct BridgeClientBuilder {
    config: BridgeConfig,
}

impl BridgeClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: BridgeConfig) -> Self {
        Self { config }
    }

    // ── Required ─────────────────────────────────────────────────────

    /// Set the bridge server URL (e.g. `wss://bridge.example.com`).
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Set the shared secret.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.config.secret = secret.into();
        self
    }

    // ── Identity ─────────────────────────────────────────────────────

    /// Set the project identifier announced in `hello`.
    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.config.project_id = Some(id.into());
        self
    }

    /// Replace the capability set announced in `hello`.
    pub fn capabilities<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.capabilities = caps.into_iter().map(Into::into).collect();
        self
    }

    // ── Behavior ─────────────────────────────────────────────────────

    /// Override the transport establishment bound (default 5s).
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.config.connect_timeout = d;
        self
    }

    /// Override the local outbound frame buffer (default 256).
    pub fn outbound_buffer(mut self, n: usize) -> Self {
        self.config.outbound_buffer = n;
        self
    }

    /// Build the [`BridgeClient`].
    pub fn build(self) -> Result<BridgeClient, BridgeError> {
        BridgeClient::new(self.config)
    }
}
