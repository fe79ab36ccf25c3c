//! `tracing` layer that forwards log events to the bridge as console lines.
//!
//! Install it next to the usual fmt layer:
//!
//! ```rust,no_run
//! # use cb_client::{BridgeClient, BridgeConfig, BridgeLayer};
//! use tracing_subscriber::layer::SubscriberExt;
//! use tracing_subscriber::util::SubscriberInitExt;
//!
//! let client = BridgeClient::new(BridgeConfig::default()).unwrap();
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(BridgeLayer::new(client.emitter()))
//!     .init();
//! ```
//!
//! Events are dropped while the session is not open, like any other emit.

use std::fmt::Write as _;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::emitter::BridgeEmitter;

/// Targets whose events are never forwarded: the bridge's own logging and
/// the WebSocket stack underneath it.
const SKIPPED_TARGETS: [&str; 4] = ["cb_client", "cb_protocol", "tokio_tungstenite", "tungstenite"];

/// Forwards `tracing` events at or above `min_level` as `console` frames.
pub struct BridgeLayer {
    emitter: BridgeEmitter,
    min_level: Level,
}

impl BridgeLayer {
    /// Forward `INFO` and above.
    pub fn new(emitter: BridgeEmitter) -> Self {
        Self {
            emitter,
            min_level: Level::INFO,
        }
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }
}

impl<S> Layer<S> for BridgeLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        // `Level` orders verbose levels as greater: TRACE > DEBUG > INFO.
        if *meta.level() > self.min_level || is_skipped(meta.target()) {
            return;
        }
        if !self.emitter.is_open() {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.emitter
            .send_console(level_name(meta.level()), &visitor.finish());
    }
}

fn is_skipped(target: &str) -> bool {
    SKIPPED_TARGETS.iter().any(|skip| {
        target == *skip || target.strip_prefix(*skip).is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Bridge level names; there is no `trace` level on the wire.
fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "error",
        Level::WARN => "warn",
        Level::INFO => "info",
        Level::DEBUG | Level::TRACE => "debug",
    }
}

/// Renders an event as `message key=value key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, name: &str, value: &dyn std::fmt::Display) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), &format_args!("{value:?}"));
        }
    }
}
