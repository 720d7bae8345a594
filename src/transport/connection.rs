//! WebSocket connection and event loop.
//!
//! This module handles the WebSocket connection to a target's debugger
//! endpoint, including request/response correlation and event routing.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that is the only reader of the socket:
//!
//! - Incoming replies fulfil the pending slot with the matching ID
//! - Everything else is queued, in arrival order, for the event feed
//! - Outgoing commands are written in submission order
//! - On exit every remaining slot fails with [`Error::ConnectionClosed`]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, from_str, to_string};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, error, trace, warn};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::identifiers::{RequestId, RequestIdSequence};
use crate::protocol::{Event, Request, Response};

// ============================================================================
// Types
// ============================================================================

/// Map of request IDs to reply slots.
type CorrelationMap = FxHashMap<RequestId, oneshot::Sender<Result<Response>>>;

/// Receiving half of the event queue.
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write a serialized request whose slot is already registered.
    Send { request_id: RequestId, payload: String },
    /// Close the socket and stop.
    Shutdown,
}

// ============================================================================
// ConnectionParts
// ============================================================================

/// A freshly spawned connection with its event queue and loop handle.
pub struct ConnectionParts {
    /// Command handle.
    pub connection: Connection,
    /// Queue of every non-reply message, in arrival order.
    pub events: EventReceiver,
    /// Event loop task. Joining it guarantees the socket is released.
    pub task: JoinHandle<()>,
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to a single target.
///
/// Handles request/response correlation and event routing.
/// The connection spawns an internal event loop task.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone. Concurrent
/// [`send`](Self::send) calls each own their reply slot.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Correlation map (shared with event loop).
    correlation: Arc<Mutex<CorrelationMap>>,
    /// Request ID allocator.
    sequence: Arc<RequestIdSequence>,
    /// Default reply timeout.
    command_timeout: Duration,
    /// Maximum in-flight requests.
    max_pending: usize,
}

impl Connection {
    /// Opens a WebSocket to `url` and spawns the event loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the socket cannot be opened.
    pub async fn open(url: &str, config: &SessionConfig) -> Result<ConnectionParts> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| Error::connection(format!("Failed to connect to target: {e}")))?;

        debug!(url, "WebSocket connected");

        Ok(Self::spawn(ws_stream, config))
    }

    /// Wraps an established WebSocket stream and spawns the event loop.
    pub fn spawn<S>(ws_stream: WebSocketStream<S>, config: &SessionConfig) -> ConnectionParts
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));

        let task = tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&correlation),
            events_tx,
        ));

        let connection = Self {
            command_tx,
            correlation,
            sequence: Arc::new(RequestIdSequence::new()),
            command_timeout: config.command_timeout,
            max_pending: config.max_pending,
        };

        ConnectionParts {
            connection,
            events,
            task,
        }
    }

    /// Sends a command and waits for its reply with the default timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is or becomes closed
    /// - [`Error::RequestTimeout`] if no reply arrives in time
    /// - [`Error::Protocol`] if the target replies with an error
    pub async fn send(&self, method: &str, params: Option<Value>) -> Result<Value> {
        self.send_with_timeout(method, params, self.command_timeout)
            .await
    }

    /// Sends a command and waits for its reply with a custom timeout.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus [`Error::Connection`] when too many
    /// requests are already pending.
    pub async fn send_with_timeout(
        &self,
        method: &str,
        params: Option<Value>,
        request_timeout: Duration,
    ) -> Result<Value> {
        let request_id = self.sequence.next();
        let payload = to_string(&Request::new(request_id, method, params))?;

        let (response_tx, response_rx) = oneshot::channel();

        // Register the slot before the write so a fast reply always finds it
        {
            let mut correlation = self.correlation.lock();
            if correlation.len() >= self.max_pending {
                warn!(
                    pending = correlation.len(),
                    max = self.max_pending,
                    "Too many pending requests"
                );
                return Err(Error::connection(format!(
                    "Too many pending requests: {}/{}",
                    correlation.len(),
                    self.max_pending
                )));
            }
            correlation.insert(request_id, response_tx);
        }

        if self
            .command_tx
            .send(ConnectionCommand::Send {
                request_id,
                payload,
            })
            .is_err()
        {
            self.correlation.lock().remove(&request_id);
            return Err(Error::ConnectionClosed);
        }

        trace!(%request_id, method, "Request queued");

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(reply)) => reply?.into_result(),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                self.correlation.lock().remove(&request_id);
                debug!(%request_id, method, "Request timed out");

                Err(Error::request_timeout(
                    request_id,
                    method,
                    timeout_millis(request_timeout),
                ))
            }
        }
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Returns `true` while the event loop is accepting commands.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Asks the event loop to close the socket and stop.
    ///
    /// Join the loop task to wait for completion.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop<S>(
        ws_stream: WebSocketStream<S>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
        events_tx: mpsc::UnboundedSender<Event>,
    ) where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming messages from target
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &correlation, &events_tx);
                        }

                        Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                            Ok(text) => Self::handle_incoming_message(text, &correlation, &events_tx),
                            Err(e) => warn!(error = %e, "Dropping non-UTF-8 binary frame"),
                        },

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(WsError::Utf8(e))) => {
                            warn!(error = %e, "Dropping malformed text frame");
                        }

                        Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                            debug!("WebSocket already closed");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Ping, Pong, raw frames
                        _ => {}
                    }
                }

                // Commands from the session
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { request_id, payload }) => {
                            Self::handle_send_command(request_id, payload, &mut ws_write, &correlation).await;
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("All connection handles dropped");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        // Refuse new commands first so no slot can be registered after the drain
        command_rx.close();
        Self::fail_pending_requests(&correlation);

        debug!("Event loop terminated");
    }

    /// Routes one incoming text message.
    ///
    /// Replies to pending requests fill their slot; every other well-formed
    /// object is queued as an event; anything else is dropped.
    fn handle_incoming_message(
        text: &str,
        correlation: &Mutex<CorrelationMap>,
        events_tx: &mpsc::UnboundedSender<Event>,
    ) {
        let value: Value = match from_str(text) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Dropping malformed message");
                return;
            }
        };

        if let Some(id) = value.get("id").and_then(Value::as_u64) {
            let tx = correlation.lock().remove(&RequestId::new(id));

            if let Some(tx) = tx {
                let reply = serde_json::from_value::<Response>(value).map_err(Error::from);
                let _ = tx.send(reply);
                return;
            }

            debug!(id, "Reply for unknown request, forwarding as event");
        }

        match serde_json::from_value::<Event>(value) {
            Ok(event) => {
                trace!(method = %event.method, "Event queued");
                let _ = events_tx.send(event);
            }
            Err(e) => warn!(error = %e, "Dropping unrecognized message"),
        }
    }

    /// Writes a request whose slot is already registered.
    async fn handle_send_command<S>(
        request_id: RequestId,
        payload: String,
        ws_write: &mut SplitSink<WebSocketStream<S>, Message>,
        correlation: &Mutex<CorrelationMap>,
    ) where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        if let Err(e) = ws_write.send(Message::Text(payload.into())).await {
            // Remove correlation and notify caller
            if let Some(tx) = correlation.lock().remove(&request_id) {
                let _ = tx.send(Err(Error::connection(e.to_string())));
            }
            return;
        }

        trace!(%request_id, "Request sent");
    }

    /// Fails all pending requests with ConnectionClosed error.
    fn fail_pending_requests(correlation: &Mutex<CorrelationMap>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending requests on shutdown");
        }
    }
}

/// Converts a timeout to whole milliseconds, saturating at `u64::MAX`.
fn timeout_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn routing_fixture() -> (
        Mutex<CorrelationMap>,
        mpsc::UnboundedSender<Event>,
        EventReceiver,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Mutex::new(CorrelationMap::default()), tx, rx)
    }

    #[test]
    fn test_reply_fills_pending_slot() {
        let (correlation, events_tx, mut events) = routing_fixture();
        let (slot_tx, mut slot_rx) = oneshot::channel();
        correlation.lock().insert(RequestId::new(4), slot_tx);

        Connection::handle_incoming_message(
            r#"{"id": 4, "result": {"ok": true}}"#,
            &correlation,
            &events_tx,
        );

        let reply = slot_rx.try_recv().expect("slot filled").expect("reply");
        assert_eq!(reply.into_result().expect("success"), json!({ "ok": true }));
        assert!(correlation.lock().is_empty());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_error_reply_fails_pending_slot() {
        let (correlation, events_tx, _events) = routing_fixture();
        let (slot_tx, mut slot_rx) = oneshot::channel();
        correlation.lock().insert(RequestId::new(1), slot_tx);

        Connection::handle_incoming_message(
            r#"{"id": 1, "error": {"code": -32000, "message": "Cannot find context"}}"#,
            &correlation,
            &events_tx,
        );

        let reply = slot_rx.try_recv().expect("slot filled").expect("reply");
        let err = reply.into_result().expect_err("error reply");
        assert_eq!(err.protocol_code(), Some(-32000));
    }

    #[test]
    fn test_unmatched_id_is_forwarded_as_event() {
        let (correlation, events_tx, mut events) = routing_fixture();

        Connection::handle_incoming_message(r#"{"id": 77, "result": {}}"#, &correlation, &events_tx);

        let event = events.try_recv().expect("forwarded");
        assert_eq!(event.id, Some(json!(77)));
    }

    #[test]
    fn test_non_integer_ids_are_forwarded() {
        let (correlation, events_tx, mut events) = routing_fixture();
        let (slot_tx, _slot_rx) = oneshot::channel();
        correlation.lock().insert(RequestId::new(1), slot_tx);

        for text in [
            r#"{"id": "abc", "method": "Custom.event"}"#,
            r#"{"id": -1, "result": {}}"#,
            r#"{"id": 1.5, "result": {}}"#,
        ] {
            Connection::handle_incoming_message(text, &correlation, &events_tx);
        }

        let forwarded: Vec<Event> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert_eq!(forwarded.len(), 3);
        assert_eq!(forwarded[0].id, Some(json!("abc")));
        assert_eq!(forwarded[0].method, "Custom.event");
        assert_eq!(forwarded[1].id, Some(json!(-1)));
        assert_eq!(forwarded[1].extra.get("result"), Some(&json!({})));
        // The pending slot is untouched
        assert_eq!(correlation.lock().len(), 1);
    }

    #[test]
    fn test_events_keep_arrival_order() {
        let (correlation, events_tx, mut events) = routing_fixture();

        for method in ["Page.frameNavigated", "Log.entryAdded", "Runtime.consoleAPICalled"] {
            let text = json!({ "method": method, "params": {} }).to_string();
            Connection::handle_incoming_message(&text, &correlation, &events_tx);
        }

        let order: Vec<String> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|e| e.method)
            .collect();
        assert_eq!(
            order,
            ["Page.frameNavigated", "Log.entryAdded", "Runtime.consoleAPICalled"]
        );
    }

    #[test]
    fn test_malformed_messages_are_dropped() {
        let (correlation, events_tx, mut events) = routing_fixture();

        Connection::handle_incoming_message("not json", &correlation, &events_tx);
        Connection::handle_incoming_message("[1, 2, 3]", &correlation, &events_tx);
        Connection::handle_incoming_message(r#"{"method": 5}"#, &correlation, &events_tx);

        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(timeout_millis(Duration::from_micros(999)), 0);
        assert_eq!(timeout_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_fail_pending_requests_drains_map() {
        let correlation = Mutex::new(CorrelationMap::default());
        let (a_tx, mut a_rx) = oneshot::channel();
        let (b_tx, mut b_rx) = oneshot::channel();
        correlation.lock().insert(RequestId::new(1), a_tx);
        correlation.lock().insert(RequestId::new(2), b_tx);

        Connection::fail_pending_requests(&correlation);

        assert!(correlation.lock().is_empty());
        assert!(matches!(a_rx.try_recv(), Ok(Err(Error::ConnectionClosed))));
        assert!(matches!(b_rx.try_recv(), Ok(Err(Error::ConnectionClosed))));
    }
}
