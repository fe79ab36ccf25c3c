//! Core bridge client: opens the WebSocket, performs the `auth`/`hello`
//! handshake, and hands the connection to a reader and a writer task.

use std::sync::Arc;

use cb_protocol::{BridgeMessage, CLOSE_REASON, SECRET_HEADER};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::config::BridgeConfig;
use crate::emitter::BridgeEmitter;
use crate::session::SessionShared;
use crate::types::{BridgeError, SessionState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// One bridge session.
///
/// Create via [`BridgeClient::new`] or
/// [`BridgeClientBuilder`](crate::builder::BridgeClientBuilder), call
/// [`start`](Self::start) once, emit any number of events, then
/// [`stop`](Self::stop).  A stopped or failed client cannot be restarted.
pub struct BridgeClient {
    config: BridgeConfig,
    emitter: BridgeEmitter,
    outbound_rx: Option<mpsc::Receiver<BridgeMessage>>,
    tasks: Vec<JoinHandle<()>>,
}

impl BridgeClient {
    /// Start a new builder.
    pub fn builder() -> crate::builder::BridgeClientBuilder {
        crate::builder::BridgeClientBuilder::new()
    }

    /// Validate `config` and create an idle client.  No I/O happens here.
    pub fn new(config: BridgeConfig) -> Result<Self, BridgeError> {
        let config = config.validated()?;
        let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_buffer);
        Ok(Self {
            config,
            emitter: BridgeEmitter {
                shared: Arc::new(SessionShared::new()),
                outbound: outbound_tx,
            },
            outbound_rx: Some(outbound_rx),
            tasks: Vec::new(),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.emitter.state()
    }

    /// Watch lifecycle changes, including a server-side close or a transport
    /// error after the handshake.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.emitter.shared.subscribe()
    }

    /// A cloneable handle for emitting events from elsewhere in the program.
    pub fn emitter(&self) -> BridgeEmitter {
        self.emitter.clone()
    }

    /// Open the transport and submit the handshake.
    ///
    /// Resolves once the connection is established and both `auth` and
    /// `hello` were written; no server acknowledgement is awaited.  Transport
    /// establishment is bounded by `connect_timeout`.  Nothing is retried: on
    /// error the session moves to [`SessionState::Failed`].
    pub async fn start(&mut self) -> Result<(), BridgeError> {
        let shared = self.emitter.shared.clone();
        if !shared.transition(SessionState::Idle, SessionState::Connecting) {
            return Err(BridgeError::InvalidState(shared.state()));
        }

        match self.open().await {
            Ok(()) => {
                shared.transition(SessionState::Connecting, SessionState::Open);
                tracing::info!(
                    url = %self.config.url,
                    project_id = self.config.project_id.as_deref().unwrap_or(""),
                    "bridge session open"
                );
                Ok(())
            }
            Err(e) => {
                shared.fail();
                tracing::warn!(url = %self.config.url, error = %e, "bridge connection failed");
                Err(e)
            }
        }
    }

    /// Send one console line.  Silently dropped unless the session is open.
    pub fn send_console(&self, level: &str, message: &str) {
        self.emitter.send_console(level, message);
    }

    /// Send one runtime error.  Silently dropped unless the session is open.
    pub fn send_error(&self, message: &str) {
        self.emitter.send_error(message);
    }

    /// Close the session with a normal-closure frame (`1000`, `"bye"`).
    ///
    /// Frames queued before this call are written first.  No-op unless the
    /// session is open, so calling it twice is harmless.
    pub fn stop(&self) {
        if self.emitter.shared.close() {
            tracing::info!(url = %self.config.url, "bridge session stopped");
        }
    }

    /// Wait for the reader and writer tasks to finish, i.e. for the close
    /// handshake to complete after [`stop`](Self::stop) or a server close.
    /// Returns immediately if the session never opened.
    pub async fn closed(&mut self) {
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }

    /// Single connection attempt: connect, handshake, spawn I/O tasks.
    async fn open(&mut self) -> Result<(), BridgeError> {
        let request = self.build_request()?;
        let outbound_rx = self
            .outbound_rx
            .take()
            .ok_or(BridgeError::InvalidState(SessionState::Connecting))?;

        tracing::info!(url = %self.config.url, "connecting to bridge server");

        let timeout = self.config.connect_timeout;
        let (ws, _response) =
            tokio::time::timeout(timeout, tokio_tungstenite::connect_async(request))
                .await
                .map_err(|_| BridgeError::Timeout(timeout))??;
        let (mut sink, stream) = ws.split();

        // ── Handshake: auth strictly before hello ────────────────────
        let auth = BridgeMessage::auth(&self.config.secret);
        sink.send(Message::Text(auth.to_json()?)).await?;

        let hello = BridgeMessage::hello(
            &self.config.capabilities,
            self.config.project_id.as_deref(),
        );
        sink.send(Message::Text(hello.to_json()?)).await?;

        let shared = self.emitter.shared.clone();
        let shutdown = shared.shutdown_token();
        self.tasks.push(tokio::spawn(write_loop(
            sink,
            outbound_rx,
            shutdown.clone(),
            shared.clone(),
        )));
        self.tasks.push(tokio::spawn(read_loop(stream, shutdown, shared)));
        Ok(())
    }

    /// Upgrade request carrying the secret header.
    fn build_request(&self) -> Result<Request, BridgeError> {
        let mut request = self.config.url.as_str().into_client_request()?;
        let name = HeaderName::from_bytes(SECRET_HEADER.as_bytes())
            .map_err(|e| BridgeError::Config(format!("invalid header name: {e}")))?;
        let value = HeaderValue::from_str(&self.config.secret)
            .map_err(|e| BridgeError::Config(format!("secret is not a valid header value: {e}")))?;
        request.headers_mut().insert(name, value);
        Ok(request)
    }
}

impl Drop for BridgeClient {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Drain the outbound queue into the sink.  Queued frames win over the
/// shutdown signal, so everything accepted before `stop` goes out before
/// the close frame.
async fn write_loop(
    mut sink: WsSink,
    mut outbound_rx: mpsc::Receiver<BridgeMessage>,
    shutdown: CancellationToken,
    shared: Arc<SessionShared>,
) {
    loop {
        tokio::select! {
            biased;
            msg = outbound_rx.recv() => {
                let Some(msg) = msg else { break };
                let json = match msg.to_json() {
                    Ok(j) => j,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to serialize outbound message");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(json)).await {
                    tracing::warn!(error = %e, "bridge send failed");
                    shared.close();
                    break;
                }
            }
            _ = shutdown.cancelled() => {
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: CLOSE_REASON.into(),
                };
                if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                    tracing::debug!(error = %e, "close frame not sent");
                }
                break;
            }
        }
    }
}

/// Read until the connection ends.  Inbound frames are only logged; reading
/// keeps tungstenite answering pings and completing the close handshake.
async fn read_loop(
    mut stream: SplitStream<WsStream>,
    shutdown: CancellationToken,
    shared: Arc<SessionShared>,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                tracing::debug!(frame = %text, "inbound frame");
            }
            Ok(Message::Close(frame)) => {
                tracing::info!(
                    code = frame.as_ref().map_or(1005, |f| u16::from(f.code)),
                    "bridge server closed connection"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "bridge transport error");
                break;
            }
        }
    }

    if shared.close() {
        tracing::info!("bridge session closed by transport");
    }
    // Release the writer if the caller never calls `stop`.
    shutdown.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> BridgeClient {
        BridgeClient::new(BridgeConfig::new("ws://localhost:9877/bridge", "dev-secret")).unwrap()
    }

    #[test]
    fn request_carries_secret_header() {
        let client = test_client();
        let request = client.build_request().unwrap();
        assert_eq!(request.uri(), "ws://localhost:9877/bridge");
        assert_eq!(
            request.headers().get(SECRET_HEADER).unwrap(),
            "dev-secret"
        );
    }

    #[test]
    fn secret_with_newline_is_rejected() {
        let client = BridgeClient::new(BridgeConfig::new("ws://localhost:9877", "bad\nsecret")).unwrap();
        assert!(matches!(client.build_request(), Err(BridgeError::Config(_))));
    }

    #[test]
    fn events_before_start_are_not_queued() {
        let mut client = test_client();
        client.send_console("info", "early");
        client.send_error("early");
        assert_eq!(client.state(), SessionState::Idle);
        assert!(client.outbound_rx.as_mut().unwrap().try_recv().is_err());
    }

    #[test]
    fn stop_before_start_is_noop() {
        let client = test_client();
        client.stop();
        client.stop();
        assert_eq!(client.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn invalid_url_fails_session() {
        let mut client =
            BridgeClient::new(BridgeConfig::new("not a url", "dev-secret")).unwrap();
        let err = client.start().await.unwrap_err();
        assert!(matches!(err, BridgeError::WebSocket(_)), "got {err:?}");
        assert_eq!(client.state(), SessionState::Failed);

        let err = client.start().await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidState(SessionState::Failed)));
    }
}
