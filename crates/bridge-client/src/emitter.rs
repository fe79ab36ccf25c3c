//! Fire-and-forget event emission.

use std::sync::Arc;

use cb_protocol::BridgeMessage;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::session::SessionShared;
use crate::types::SessionState;

/// Cloneable handle that sends `console` and `error` events on a session.
///
/// Events are only accepted while the session is [`SessionState::Open`];
/// anything sent before `start` or after `stop` is dropped without error.
/// Frames are queued in call order and written by a single task, so
/// sequential calls reach the server in the same order.
#[derive(Clone)]
pub struct BridgeEmitter {
    pub(crate) shared: Arc<SessionShared>,
    pub(crate) outbound: mpsc::Sender<BridgeMessage>,
}

impl BridgeEmitter {
    /// Send one console line, e.g. `send_console("warn", "disk almost full")`.
    pub fn send_console(&self, level: &str, message: &str) {
        if self.is_open() {
            self.enqueue(BridgeMessage::console(level, message));
        }
    }

    /// Send one runtime error.
    pub fn send_error(&self, message: &str) {
        if self.is_open() {
            self.enqueue(BridgeMessage::error(message));
        }
    }

    pub fn is_open(&self) -> bool {
        self.shared.state() == SessionState::Open
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    fn enqueue(&self, msg: BridgeMessage) {
        match self.outbound.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(msg)) => {
                tracing::warn!(kind = msg.kind(), "outbound queue full, dropping frame");
            }
            Err(TrySendError::Closed(msg)) => {
                tracing::debug!(kind = msg.kind(), "writer gone, dropping frame");
            }
        }
    }
}
