//! Loopback JSON-RPC WebSocket servers for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::{JoinHandle, JoinSet};
use tokio_tungstenite::tungstenite::Message;

/// How the server answers one request.
pub enum Reply {
    Result(Value),
    Error(i64, String),
    /// Never answer.
    Silent,
    /// Drop the socket without answering.
    Disconnect,
}

type Handler = dyn Fn(&str, &Value) -> Reply + Send + Sync;

/// A JSON-RPC server on `127.0.0.1:<random port>`.
pub struct RpcServer {
    port: u16,
    accepted: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl RpcServer {
    pub async fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
    {
        Self::start(None, Arc::new(handler)).await
    }

    /// Pushes `greeting` to every client right after the handshake.
    pub async fn spawn_with_greeting<F>(greeting: Value, handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
    {
        Self::start(Some(greeting), Arc::new(handler)).await
    }

    async fn start(greeting: Option<Value>, handler: Arc<Handler>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let accepted = Arc::new(AtomicUsize::new(0));
        let live = Arc::new(AtomicUsize::new(0));

        let task = {
            let accepted = Arc::clone(&accepted);
            let live = Arc::clone(&live);
            tokio::spawn(async move {
                // Dropped with this task, aborting every session.
                let mut sessions = JoinSet::new();
                while let Ok((stream, _)) = listener.accept().await {
                    let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                        continue;
                    };
                    accepted.fetch_add(1, Ordering::SeqCst);
                    live.fetch_add(1, Ordering::SeqCst);

                    let handler = Arc::clone(&handler);
                    let greeting = greeting.clone();
                    let live = Arc::clone(&live);
                    sessions.spawn(async move {
                        serve(ws, greeting, handler).await;
                        live.fetch_sub(1, Ordering::SeqCst);
                    });
                }
            })
        };

        Self {
            port,
            accepted,
            live,
            task,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Completed WebSocket handshakes so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Sessions whose socket is still open.
    pub fn live_connections(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Drop for RpcServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    ws: tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
    greeting: Option<Value>,
    handler: Arc<Handler>,
) {
    let (mut write, mut read) = ws.split();

    if let Some(greeting) = greeting {
        let _ = write.send(Message::Text(greeting.to_string().into())).await;
    }

    while let Some(Ok(message)) = read.next().await {
        let Message::Text(text) = message else {
            if message.is_close() {
                break;
            }
            continue;
        };
        let Ok(request) = serde_json::from_str::<Value>(&text) else {
            continue;
        };

        let method = request["method"].as_str().unwrap_or_default();
        let id = request["id"].clone();
        let reply = match handler(method, &request["params"]) {
            Reply::Result(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Reply::Error(code, message) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message }
            }),
            Reply::Silent => continue,
            Reply::Disconnect => return,
        };

        if write.send(Message::Text(reply.to_string().into())).await.is_err() {
            break;
        }
    }
}

/// A port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    listener.local_addr().expect("addr").port()
}

/// A listener that never accepts, so handshakes hang until the client gives up.
pub async fn silent_listener() -> TcpListener {
    TcpListener::bind("127.0.0.1:0").await.expect("bind")
}

/// Polls `condition` for up to two seconds.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
