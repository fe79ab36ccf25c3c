//! State shared between the client, its emitters, and the I/O tasks.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::types::SessionState;

pub(crate) struct SessionShared {
    state: watch::Sender<SessionState>,
    /// Cancelled by `stop` or when the transport goes away; tells the writer
    /// task to send the close frame and exit.
    shutdown: CancellationToken,
}

impl SessionShared {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            state,
            shutdown: CancellationToken::new(),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub(crate) fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Atomically move `from → to`.  Returns `false` (and changes nothing)
    /// if the current state is not `from`.
    pub(crate) fn transition(&self, from: SessionState, to: SessionState) -> bool {
        let moved = self.state.send_if_modified(|s| {
            if *s == from {
                *s = to;
                true
            } else {
                false
            }
        });
        if moved {
            tracing::debug!(from = %from, to = %to, "session state changed");
        }
        moved
    }

    /// `Connecting → Failed`.
    pub(crate) fn fail(&self) {
        self.transition(SessionState::Connecting, SessionState::Failed);
    }

    /// `Open → Closed` and signal the writer.  No-op in any other state.
    pub(crate) fn close(&self) -> bool {
        let closed = self.transition(SessionState::Open, SessionState::Closed);
        if closed {
            self.shutdown.cancel();
        }
        closed
    }
}
