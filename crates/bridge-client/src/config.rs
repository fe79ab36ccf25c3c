//! Session configuration.

use std::time::Duration;

use cb_protocol::{default_capabilities, CONNECT_TIMEOUT};

use crate::types::BridgeError;

/// Everything a [`BridgeClient`](crate::BridgeClient) needs to open a session.
///
/// The client never reads the environment; callers resolve env vars or CLI
/// flags into this struct.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Bridge server URL (`ws://` or `wss://`).
    pub url: String,
    /// Shared secret, sent both as the `X-Bridge-Secret` header and in `auth`.
    pub secret: String,
    /// Project identifier announced in `hello`; `None` is sent as `""`.
    pub project_id: Option<String>,
    /// Capability set announced in `hello`.  Empty means the default pair.
    pub capabilities: Vec<String>,
    /// Bound on transport establishment (default 5s).
    pub connect_timeout: Duration,
    /// Outbound frames buffered locally before new ones are dropped.
    pub outbound_buffer: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:9877".into(),
            secret: "dev-secret".into(),
            project_id: None,
            capabilities: default_capabilities(),
            connect_timeout: CONNECT_TIMEOUT,
            outbound_buffer: 256,
        }
    }
}

impl BridgeConfig {
    pub fn new(url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Check required fields and fill in the default capability set.
    pub(crate) fn validated(mut self) -> Result<Self, BridgeError> {
        if self.url.trim().is_empty() {
            return Err(BridgeError::Config("url is required".into()));
        }
        if self.secret.is_empty() {
            return Err(BridgeError::Config("secret is required".into()));
        }
        if self.outbound_buffer == 0 {
            return Err(BridgeError::Config("outbound_buffer must be at least 1".into()));
        }
        self.capabilities.retain(|c| !c.is_empty());
        if self.capabilities.is_empty() {
            self.capabilities = default_capabilities();
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_dev_bridge() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.url, "ws://localhost:9877");
        assert_eq!(cfg.secret, "dev-secret");
        assert_eq!(cfg.capabilities, vec!["console", "error"]);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn empty_capabilities_fall_back_to_default() {
        let cfg = BridgeConfig {
            capabilities: vec![],
            ..Default::default()
        };
        assert_eq!(cfg.validated().unwrap().capabilities, vec!["console", "error"]);
    }

    #[test]
    fn configured_capabilities_are_kept() {
        let cfg = BridgeConfig {
            capabilities: vec!["console".into(), "".into()],
            ..Default::default()
        };
        assert_eq!(cfg.validated().unwrap().capabilities, vec!["console"]);
    }

    #[test]
    fn url_and_secret_are_required() {
        let err = BridgeConfig::new("", "s").validated().unwrap_err();
        assert!(err.to_string().contains("url"));

        let err = BridgeConfig::new("ws://localhost:1", "").validated().unwrap_err();
        assert!(err.to_string().contains("secret"));
    }
}
