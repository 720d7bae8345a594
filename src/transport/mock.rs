//! In-process debugger endpoint for tests.
//!
//! Binds a WebSocket server on a random loopback port and hands the accepted
//! socket to a scripted peer.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::discovery::{Target, TargetType};
use crate::identifiers::TargetId;

// ============================================================================
// MockBrowser
// ============================================================================

/// A one-connection debugger endpoint.
pub(crate) struct MockBrowser {
    /// Port the server is bound to.
    port: u16,
    /// Peer script task.
    task: JoinHandle<()>,
}

impl MockBrowser {
    /// Binds a server and runs `script` against the first connection.
    pub(crate) async fn serve<F, Fut>(script: F) -> Self
    where
        F: FnOnce(MockPeer) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .expect("bind mock endpoint");
        let port = listener.local_addr().expect("local addr").port();

        let task = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("websocket upgrade");
            script(MockPeer { ws }).await;
        });

        Self { port, task }
    }

    /// Returns the WebSocket URL of the page.
    pub(crate) fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/devtools/page/MOCK", self.port)
    }

    /// Returns a target record pointing at this endpoint.
    pub(crate) fn target(&self) -> Target {
        Target {
            id: TargetId::new("MOCK"),
            title: "Mock Page".to_string(),
            url: "http://mock.test/".to_string(),
            target_type: TargetType::Page,
            websocket_url: Some(self.ws_url()),
        }
    }

    /// Waits for the peer script to finish, surfacing its panics.
    pub(crate) async fn finish(self) {
        self.task.await.expect("mock peer script panicked");
    }
}

// ============================================================================
// MockPeer
// ============================================================================

/// The browser side of an accepted connection.
pub(crate) struct MockPeer {
    ws: WebSocketStream<TcpStream>,
}

impl MockPeer {
    /// Reads the next JSON request, or `None` once the client is gone.
    pub(crate) async fn next_request(&mut self) -> Option<Value> {
        loop {
            match self.ws.next().await? {
                Ok(Message::Text(text)) => return serde_json::from_str(&text).ok(),
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => {}
            }
        }
    }

    /// Reads the next request and returns its id and method.
    pub(crate) async fn expect_request(&mut self) -> (u64, String) {
        let request = self.next_request().await.expect("request");
        let id = request["id"].as_u64().expect("request id");
        let method = request["method"].as_str().unwrap_or_default().to_string();
        (id, method)
    }

    /// Replies with a result.
    pub(crate) async fn reply(&mut self, id: u64, result: Value) {
        self.send_json(json!({ "id": id, "result": result })).await;
    }

    /// Replies with a remote error.
    pub(crate) async fn reply_error(&mut self, id: u64, code: i64, message: &str) {
        self.send_json(json!({ "id": id, "error": { "code": code, "message": message } }))
            .await;
    }

    /// Sends an unsolicited event.
    pub(crate) async fn emit(&mut self, method: &str, params: Value) {
        self.send_json(json!({ "method": method, "params": params }))
            .await;
    }

    /// Sends a raw text frame.
    pub(crate) async fn send_text(&mut self, raw: &str) {
        self.ws
            .send(Message::Text(raw.to_string().into()))
            .await
            .expect("send text frame");
    }

    /// Answers every request with `respond(method, params)` until the client leaves.
    pub(crate) async fn answer_all<R>(mut self, respond: R)
    where
        R: Fn(&str, &Value) -> Value + Send,
    {
        while let Some(request) = self.next_request().await {
            let Some(id) = request["id"].as_u64() else {
                continue;
            };
            let method = request["method"].as_str().unwrap_or_default();
            let result = respond(method, &request["params"]);
            self.reply(id, result).await;
        }
    }

    /// Waits until the client closes the socket.
    pub(crate) async fn wait_closed(mut self) {
        while self.next_request().await.is_some() {}
    }

    /// Closes the socket from the browser side.
    pub(crate) async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }

    async fn send_json(&mut self, value: Value) {
        self.send_text(&value.to_string()).await;
    }
}
