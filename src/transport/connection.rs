//! WebSocket client connection and event loop.
//!
//! This module handles one JSON-RPC-over-WebSocket session to a remote
//! endpoint, including request/response correlation, notification routing
//! and optional reconnection.
//!
//! # Lifecycle
//!
//! ```text
//! Connection::new ──► Idle ──connect()──► Open ──close()──► Closed
//!                       │                   │
//!                       └─ call() with      └─ socket lost ─► reconnecting ─► Open
//!                          autoconnect                         (or Closed)
//! ```
//!
//! # Event Loop
//!
//! `connect` spawns a tokio task that handles:
//!
//! - Incoming messages (responses, notifications)
//! - Outgoing requests from the Rust API
//! - Re-dialing after the socket is lost
//!
//! The task only holds a weak reference to the connection state, so
//! dropping the last [`Connection`] handle ends the loop and releases the
//! socket even when [`Connection::shutdown`] was never called.

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{Notification, Request, Response};

use super::ConnectionOptions;

// ============================================================================
// Constants
// ============================================================================

/// Maximum pending requests before rejecting new ones.
const MAX_PENDING_REQUESTS: usize = 100;

// ============================================================================
// Types
// ============================================================================

/// Client-side WebSocket stream.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the WebSocket stream.
type WsSink = SplitSink<WsStream, Message>;

/// Map of request IDs to response channels.
type CorrelationMap = FxHashMap<RequestId, oneshot::Sender<Result<Response>>>;

/// Event handler callback type.
///
/// Called for every [`ConnectionEvent`]. Runs on the event loop task, so it
/// must not block and must not call back into the same handler setter.
pub type EventHandler = Box<dyn Fn(&ConnectionEvent) + Send + Sync>;

// ============================================================================
// ConnectionEvent
// ============================================================================

/// Observable transport events.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// Handshake completed (initial connect or reconnect).
    Open,
    /// A dial attempt failed.
    Error(String),
    /// The socket went away (closed locally or lost).
    Close,
    /// The remote end pushed a notification.
    Notification(Notification),
}

// ============================================================================
// Internal Types
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write a request whose correlation entry is already registered.
    Send(Request),
    /// Close the socket and stop.
    Shutdown,
}

/// Connection state as seen by API callers.
enum State {
    /// Constructed, never dialed.
    Idle,
    /// Event loop running.
    Open(mpsc::UnboundedSender<ConnectionCommand>),
    /// Terminal.
    Closed,
}

/// Why one socket's read/write loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    /// Local shutdown or every handle dropped.
    Shutdown,
    /// Remote close, read error, or end of stream.
    Lost,
}

/// State shared between API handles and the event loop.
struct Shared {
    url: String,
    options: ConnectionOptions,
    correlation: Mutex<CorrelationMap>,
    event_handler: Mutex<Option<EventHandler>>,
}

impl Shared {
    fn emit(&self, event: &ConnectionEvent) {
        let handler = self.event_handler.lock();
        if let Some(ref handler) = *handler {
            handler(event);
        }
    }
}

// ============================================================================
// Connection
// ============================================================================

/// JSON-RPC-over-WebSocket connection to one endpoint.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone; clones share the same
/// socket. Calls may be in flight concurrently: responses are matched to
/// requests by id.
#[derive(Clone)]
pub struct Connection {
    /// Shared with the event loop.
    shared: Arc<Shared>,
    /// Event loop holds only a `Weak` to this.
    state: Arc<Mutex<State>>,
    /// Serializes dialing.
    dial_lock: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.shared.url)
            .field("open", &self.is_open())
            .finish()
    }
}

// ============================================================================
// Connection - Constructors
// ============================================================================

impl Connection {
    /// Creates an idle connection to `url`. No I/O is performed.
    #[must_use]
    pub fn new(url: impl Into<String>, options: ConnectionOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                url: url.into(),
                options,
                correlation: Mutex::new(CorrelationMap::default()),
                event_handler: Mutex::new(None),
            }),
            state: Arc::new(Mutex::new(State::Idle)),
            dial_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Creates a connection and dials it immediately.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::connect`].
    pub async fn open(url: impl Into<String>, options: ConnectionOptions) -> Result<Self> {
        let connection = Self::new(url, options);
        connection.connect().await?;
        Ok(connection)
    }
}

// ============================================================================
// Connection - Public API
// ============================================================================

impl Connection {
    /// Returns the endpoint URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.shared.url
    }

    /// Returns the options this connection was built with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.shared.options
    }

    /// Returns `true` while the event loop is running.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock(), State::Open(_))
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.correlation.lock().len()
    }

    /// Sets the event handler callback.
    pub fn set_event_handler(&self, handler: EventHandler) {
        let mut guard = self.shared.event_handler.lock();
        *guard = Some(handler);
    }

    /// Clears the event handler.
    pub fn clear_event_handler(&self) {
        let mut guard = self.shared.event_handler.lock();
        *guard = None;
    }

    /// Performs the WebSocket handshake and starts the event loop.
    ///
    /// Emits [`ConnectionEvent::Open`] on success and
    /// [`ConnectionEvent::Error`] on failure. Calling this on an already
    /// open connection is a no-op.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the options contain a zero budget
    /// - [`Error::ConnectionTimeout`] if the handshake exceeds `handshake_timeout`
    /// - [`Error::Connection`] if the handshake fails
    /// - [`Error::ConnectionClosed`] if the connection was already closed
    pub async fn connect(&self) -> Result<()> {
        self.shared.options.validate()?;

        let _dial = self.dial_lock.lock().await;

        match *self.state.lock() {
            State::Open(_) => return Ok(()),
            State::Closed => return Err(Error::ConnectionClosed),
            State::Idle => {}
        }

        let ws_stream = match dial(&self.shared.url, self.shared.options.handshake_timeout).await {
            Ok(ws_stream) => ws_stream,
            Err(e) => {
                debug!(url = %self.shared.url, error = %e, "Dial failed");
                self.shared.emit(&ConnectionEvent::Error(e.to_string()));
                return Err(e);
            }
        };

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        {
            let mut state = self.state.lock();
            if matches!(*state, State::Closed) {
                // close() raced with the handshake
                return Err(Error::ConnectionClosed);
            }
            *state = State::Open(command_tx);
        }

        debug!(url = %self.shared.url, "WebSocket connection established");
        self.shared.emit(&ConnectionEvent::Open);

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&self.shared),
            Arc::downgrade(&self.state),
        ));

        Ok(())
    }

    /// Calls `method` with `params` and returns the JSON-RPC result.
    ///
    /// # Errors
    ///
    /// - [`Error::Rpc`] if the remote end answered with an error object
    /// - any error from [`Connection::send`]
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        self.send(Request::new(method, params)).await?.into_result()
    }

    /// Sends a request and waits for the response with the configured timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if idle and autoconnect is disabled
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::RequestTimeout`] if the response does not arrive in time
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.send_with_timeout(request, self.shared.options.timeout)
            .await
    }

    /// Sends a request and waits for the response with a custom timeout.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::send`].
    pub async fn send_with_timeout(
        &self,
        request: Request,
        request_timeout: Duration,
    ) -> Result<Response> {
        let command_tx = self.sender().await?;
        let request_id = request.id;

        let (response_tx, response_rx) = oneshot::channel();
        {
            let mut correlation = self.shared.correlation.lock();
            if correlation.len() >= MAX_PENDING_REQUESTS {
                warn!(
                    pending = correlation.len(),
                    max = MAX_PENDING_REQUESTS,
                    "Too many pending requests"
                );
                return Err(Error::protocol(format!(
                    "Too many pending requests: {}/{}",
                    correlation.len(),
                    MAX_PENDING_REQUESTS
                )));
            }
            correlation.insert(request_id, response_tx);
        }

        if command_tx.send(ConnectionCommand::Send(request)).is_err() {
            self.shared.correlation.lock().remove(&request_id);
            return Err(Error::ConnectionClosed);
        }

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                self.shared.correlation.lock().remove(&request_id);
                Err(Error::request_timeout(
                    request_id,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Closes the connection.
    ///
    /// Pending requests fail with [`Error::ConnectionClosed`]. Idempotent.
    pub fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), State::Closed);
        if let State::Open(command_tx) = previous {
            let _ = command_tx.send(ConnectionCommand::Shutdown);
            debug!(url = %self.shared.url, "Shutdown requested");
        }
    }

    /// Returns the command channel, dialing first if allowed.
    async fn sender(&self) -> Result<mpsc::UnboundedSender<ConnectionCommand>> {
        if let Some(command_tx) = self.current_sender()? {
            return Ok(command_tx);
        }

        if !self.shared.options.autoconnect {
            return Err(Error::NotConnected);
        }

        self.connect().await?;
        self.current_sender()?.ok_or(Error::NotConnected)
    }

    fn current_sender(&self) -> Result<Option<mpsc::UnboundedSender<ConnectionCommand>>> {
        match *self.state.lock() {
            State::Open(ref command_tx) => Ok(Some(command_tx.clone())),
            State::Idle => Ok(None),
            State::Closed => Err(Error::ConnectionClosed),
        }
    }
}

// ============================================================================
// Connection - Event Loop
// ============================================================================

impl Connection {
    /// Event loop that owns the socket for the connection's lifetime.
    async fn run_event_loop(
        mut ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        shared: Arc<Shared>,
        state: Weak<Mutex<State>>,
    ) {
        loop {
            let exit = Self::drive_socket(ws_stream, &mut command_rx, &shared).await;

            Self::fail_pending_requests(&shared.correlation);
            shared.emit(&ConnectionEvent::Close);

            if exit == LoopExit::Shutdown {
                break;
            }

            match Self::reconnect(&mut command_rx, &shared).await {
                Some(next) => {
                    ws_stream = next;
                    shared.emit(&ConnectionEvent::Open);
                }
                None => break,
            }
        }

        if let Some(state) = state.upgrade() {
            *state.lock() = State::Closed;
        }

        // Requests registered after the last drain now fail to send.
        drop(command_rx);
        Self::fail_pending_requests(&shared.correlation);

        debug!(url = %shared.url, "Event loop terminated");
    }

    /// Pumps one socket until it is lost or shut down.
    async fn drive_socket(
        ws_stream: WsStream,
        command_rx: &mut mpsc::UnboundedReceiver<ConnectionCommand>,
        shared: &Shared,
    ) -> LoopExit {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming messages from remote end
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, shared);
                        }

                        Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                            Ok(text) => Self::handle_incoming_message(text, shared),
                            Err(_) => warn!(len = bytes.len(), "Non-UTF-8 binary frame ignored"),
                        },

                        Some(Ok(Message::Close(_))) => {
                            debug!(url = %shared.url, "WebSocket closed by remote");
                            return LoopExit::Lost;
                        }

                        Some(Err(e)) => {
                            error!(url = %shared.url, error = %e, "WebSocket error");
                            return LoopExit::Lost;
                        }

                        None => {
                            debug!(url = %shared.url, "WebSocket stream ended");
                            return LoopExit::Lost;
                        }

                        // Ignore Ping, Pong, Frame
                        _ => {}
                    }
                }

                // Commands from Rust API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(request)) => {
                            Self::handle_send_command(request, &mut ws_write, shared).await;
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!(url = %shared.url, "Shutdown command received");
                            let _ = ws_write.close().await;
                            return LoopExit::Shutdown;
                        }

                        None => {
                            debug!(url = %shared.url, "All connection handles dropped");
                            let _ = ws_write.close().await;
                            return LoopExit::Shutdown;
                        }
                    }
                }
            }
        }
    }

    /// Handles an incoming text message from the remote end.
    fn handle_incoming_message(text: &str, shared: &Shared) {
        // Try to parse as Response first
        if let Ok(response) = from_str::<Response>(text) {
            let tx = shared.correlation.lock().remove(&response.id);

            if let Some(tx) = tx {
                let _ = tx.send(Ok(response));
            } else {
                warn!(id = %response.id, "Response for unknown request");
            }

            return;
        }

        if let Ok(notification) = from_str::<Notification>(text) {
            trace!(method = %notification.method, "Notification received");
            shared.emit(&ConnectionEvent::Notification(notification));
            return;
        }

        warn!(text = %text, "Failed to parse incoming message");
    }

    /// Writes a request whose correlation entry is already registered.
    async fn handle_send_command(request: Request, ws_write: &mut WsSink, shared: &Shared) {
        let request_id = request.id;

        let json = match to_string(&request) {
            Ok(j) => j,
            Err(e) => {
                if let Some(tx) = shared.correlation.lock().remove(&request_id) {
                    let _ = tx.send(Err(Error::Json(e)));
                }
                return;
            }
        };

        if let Err(e) = ws_write.send(Message::Text(json.into())).await {
            // Remove correlation and notify caller
            if let Some(tx) = shared.correlation.lock().remove(&request_id) {
                let _ = tx.send(Err(Error::connection(e.to_string())));
            }
            return;
        }

        trace!(?request_id, method = %request.method, "Request sent");
    }

    /// Re-dials after a lost socket, if the options allow it.
    async fn reconnect(
        command_rx: &mut mpsc::UnboundedReceiver<ConnectionCommand>,
        shared: &Shared,
    ) -> Option<WsStream> {
        let options = &shared.options;
        if !options.reconnect {
            return None;
        }

        let mut attempt: u32 = 0;
        loop {
            if options.max_reconnects != 0 && attempt >= options.max_reconnects {
                warn!(url = %shared.url, attempts = attempt, "Giving up reconnecting");
                return None;
            }
            attempt += 1;

            if !Self::wait_reconnect_interval(command_rx, options.reconnect_interval, shared).await
            {
                return None;
            }

            match dial(&shared.url, options.handshake_timeout).await {
                Ok(ws_stream) => {
                    info!(url = %shared.url, attempt, "Reconnected");
                    return Some(ws_stream);
                }
                Err(e) => {
                    debug!(url = %shared.url, attempt, error = %e, "Reconnect attempt failed");
                    shared.emit(&ConnectionEvent::Error(e.to_string()));
                }
            }
        }
    }

    /// Sleeps for `interval` while failing requests that arrive meanwhile.
    ///
    /// Returns `false` if the connection was shut down during the wait.
    async fn wait_reconnect_interval(
        command_rx: &mut mpsc::UnboundedReceiver<ConnectionCommand>,
        interval: Duration,
        shared: &Shared,
    ) -> bool {
        let sleep = tokio::time::sleep(interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => return true,

                command = command_rx.recv() => match command {
                    Some(ConnectionCommand::Send(request)) => {
                        if let Some(tx) = shared.correlation.lock().remove(&request.id) {
                            let _ = tx.send(Err(Error::ConnectionClosed));
                        }
                    }
                    Some(ConnectionCommand::Shutdown) | None => return false,
                },
            }
        }
    }

    /// Fails all pending requests with ConnectionClosed error.
    fn fail_pending_requests(correlation: &Mutex<CorrelationMap>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending requests on disconnect");
        }
    }
}

// ============================================================================
// Dialing
// ============================================================================

/// Performs the client handshake within `handshake_timeout`.
///
/// On timeout the in-flight handshake future is dropped, which closes the
/// half-open socket.
async fn dial(url: &str, handshake_timeout: Duration) -> Result<WsStream> {
    match timeout(handshake_timeout, connect_async(url)).await {
        Ok(Ok((ws_stream, _response))) => Ok(ws_stream),
        Ok(Err(e)) => Err(Error::connection(format!(
            "WebSocket handshake with {url} failed: {e}"
        ))),
        Err(_) => Err(Error::connection_timeout(
            handshake_timeout.as_millis() as u64,
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::testing::{Reply, RpcServer, closed_port, eventually, silent_listener};

    fn quick_options() -> ConnectionOptions {
        ConnectionOptions::probe(Duration::from_millis(500))
    }

    #[test]
    fn test_constants() {
        assert_eq!(MAX_PENDING_REQUESTS, 100);
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        let server = RpcServer::spawn(|method, params| match method {
            "info" => Reply::Result(json!({ "address": params[0] })),
            _ => Reply::Error(-32601, "Method not found".into()),
        })
        .await;

        let connection = Connection::open(server.url(), quick_options())
            .await
            .expect("open");
        assert!(connection.is_open());

        let result = connection
            .call("info", json!(["Qm123"]))
            .await
            .expect("call");
        assert_eq!(result, json!({ "address": "Qm123" }));
        assert_eq!(connection.pending_count(), 0);

        connection.shutdown();
    }

    #[tokio::test]
    async fn test_rpc_error_is_surfaced() {
        let server = RpcServer::spawn(|_, _| Reply::Error(-32000, "boom".into())).await;
        let connection = Connection::open(server.url(), quick_options())
            .await
            .expect("open");

        let err = connection
            .call("lookup", json!(["Qm123"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Rpc { code: -32000, .. }));
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_correlated() {
        let server = RpcServer::spawn(|_, params| Reply::Result(params[0].clone())).await;
        let connection = Connection::open(server.url(), quick_options())
            .await
            .expect("open");

        let (a, b, c) = tokio::join!(
            connection.call("echo", json!(["a"])),
            connection.call("echo", json!(["b"])),
            connection.call("echo", json!(["c"])),
        );

        assert_eq!(a.expect("a"), json!("a"));
        assert_eq!(b.expect("b"), json!("b"));
        assert_eq!(c.expect("c"), json!("c"));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = RpcServer::spawn(|_, _| Reply::Silent).await;
        let connection = Connection::open(
            server.url(),
            quick_options().with_timeout(Duration::from_millis(100)),
        )
        .await
        .expect("open");

        let err = connection.call("info", json!([])).await.unwrap_err();
        assert!(matches!(err, Error::RequestTimeout { timeout_ms: 100, .. }));
        assert_eq!(connection.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_refused_port_fails_fast() {
        let url = format!("ws://127.0.0.1:{}", closed_port().await);
        let err = Connection::open(url, quick_options()).await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }

    #[tokio::test]
    async fn test_handshake_timeout() {
        let listener = silent_listener().await;
        let port = listener.local_addr().expect("addr").port();
        let url = format!("ws://127.0.0.1:{port}");

        let options = ConnectionOptions::probe(Duration::from_millis(150));
        let err = Connection::open(url, options).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionTimeout { timeout_ms: 150 }));
    }

    #[tokio::test]
    async fn test_idle_without_autoconnect_is_not_connected() {
        let connection = Connection::new("ws://127.0.0.1:1", quick_options());
        let err = connection.call("info", json!([])).await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[tokio::test]
    async fn test_autoconnect_dials_on_first_call() {
        let server = RpcServer::spawn(|_, _| Reply::Result(json!(true))).await;
        let connection = Connection::new(
            server.url(),
            ConnectionOptions::new().with_reconnect(false),
        );
        assert!(!connection.is_open());

        let result = connection.call("ping", json!([])).await.expect("call");
        assert_eq!(result, json!(true));
        assert!(connection.is_open());
    }

    #[tokio::test]
    async fn test_shutdown_is_terminal_and_closes_socket() {
        let server = RpcServer::spawn(|_, _| Reply::Result(json!(1))).await;
        let connection = Connection::open(server.url(), quick_options())
            .await
            .expect("open");
        assert!(eventually(|| server.live_connections() == 1).await);

        connection.shutdown();
        connection.shutdown();

        assert!(!connection.is_open());
        assert!(matches!(
            connection.call("info", json!([])).await,
            Err(Error::ConnectionClosed)
        ));
        assert!(matches!(connection.connect().await, Err(Error::ConnectionClosed)));
        assert!(eventually(|| server.live_connections() == 0).await);
    }

    #[tokio::test]
    async fn test_dropping_last_handle_closes_socket() {
        let server = RpcServer::spawn(|_, _| Reply::Result(json!(1))).await;
        let connection = Connection::open(server.url(), quick_options())
            .await
            .expect("open");
        assert!(eventually(|| server.live_connections() == 1).await);

        drop(connection);
        assert!(eventually(|| server.live_connections() == 0).await);
    }

    #[tokio::test]
    async fn test_events_and_notifications() {
        let server = RpcServer::spawn_with_greeting(
            json!({ "jsonrpc": "2.0", "method": "hello", "params": ["hi"] }),
            |_, _| Reply::Result(json!(null)),
        )
        .await;

        let events: Arc<Mutex<Vec<ConnectionEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let connection = Connection::new(server.url(), quick_options());
        let sink = Arc::clone(&events);
        connection.set_event_handler(Box::new(move |event| sink.lock().push(event.clone())));

        connection.connect().await.expect("connect");
        assert!(
            eventually(|| events
                .lock()
                .iter()
                .any(|e| matches!(e, ConnectionEvent::Notification(n) if n.method == "hello")))
            .await
        );

        connection.shutdown();
        assert!(eventually(|| events.lock().contains(&ConnectionEvent::Close)).await);
        assert_eq!(events.lock().first(), Some(&ConnectionEvent::Open));
    }

    #[tokio::test]
    async fn test_error_event_on_failed_dial() {
        let url = format!("ws://127.0.0.1:{}", closed_port().await);
        let connection = Connection::new(url, quick_options());

        let errors = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&errors);
        connection.set_event_handler(Box::new(move |event| {
            if matches!(event, ConnectionEvent::Error(_)) {
                *counter.lock() += 1;
            }
        }));

        assert!(connection.connect().await.is_err());
        assert_eq!(*errors.lock(), 1);
    }

    #[tokio::test]
    async fn test_lost_socket_without_reconnect_becomes_closed() {
        let server = RpcServer::spawn(|_, _| Reply::Disconnect).await;
        let connection = Connection::open(server.url(), quick_options())
            .await
            .expect("open");

        let err = connection.call("info", json!([])).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
        assert!(eventually(|| !connection.is_open()).await);
    }

    #[tokio::test]
    async fn test_reconnects_after_lost_socket() {
        let server = RpcServer::spawn(|method, _| match method {
            "drop" => Reply::Disconnect,
            _ => Reply::Result(json!("pong")),
        })
        .await;

        let options = ConnectionOptions::bootstrap()
            .with_reconnect_interval(Duration::from_millis(20))
            .with_timeout(Duration::from_millis(500));
        let connection = Connection::open(server.url(), options)
            .await
            .expect("open");

        assert!(connection.call("drop", json!([])).await.is_err());
        assert!(eventually(|| server.accepted() == 2).await);

        let mut answered = false;
        for _ in 0..20 {
            if let Ok(value) = connection.call("ping", json!([])).await {
                assert_eq!(value, json!("pong"));
                answered = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(answered);
        assert!(connection.is_open());
    }
}
