//! RPC client abstraction.
//!
//! The resolver talks to endpoints through two seams:
//!
//! - [`RpcClient`] - anything that can `call` a method and be `close`d
//! - [`Connector`] - opens a new, handshake-bounded [`RpcClient`]
//!
//! The bootstrap connection is an already-open client held for the
//! resolver's lifetime; probe and info connections come from the
//! connector. [`WsConnector`] is the production connector.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

use super::{Connection, ConnectionOptions};

// ============================================================================
// Traits
// ============================================================================

/// A JSON-RPC session to one endpoint.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Calls `method` with `params` and returns the result payload.
    async fn call(&self, method: &str, params: Value) -> Result<Value>;

    /// Releases the session. Must be safe to call more than once.
    async fn close(&self);
}

/// Opens new sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Session type produced by this connector.
    type Client: RpcClient + 'static;

    /// Opens a session to `url` and completes the handshake.
    ///
    /// Implementations must honor `options.handshake_timeout`.
    async fn open(&self, url: &str, options: &ConnectionOptions) -> Result<Self::Client>;
}

// ============================================================================
// WebSocket Implementations
// ============================================================================

#[async_trait]
impl RpcClient for Connection {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        Connection::call(self, method, params).await
    }

    async fn close(&self) {
        self.shutdown();
    }
}

/// Opens [`Connection`]s over WebSocket.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    type Client = Connection;

    async fn open(&self, url: &str, options: &ConnectionOptions) -> Result<Connection> {
        Connection::open(url, options.clone()).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::json;

    use crate::testing::{Reply, RpcServer, eventually};

    #[tokio::test]
    async fn test_ws_connector_round_trip() {
        let server = RpcServer::spawn(|method, _| Reply::Result(json!(method))).await;

        let client = WsConnector
            .open(&server.url(), &ConnectionOptions::probe(Duration::from_millis(500)))
            .await
            .expect("open");

        let value = RpcClient::call(&client, "info", json!([])).await.expect("call");
        assert_eq!(value, json!("info"));

        RpcClient::close(&client).await;
        RpcClient::close(&client).await;
        assert!(eventually(|| server.live_connections() == 0).await);
    }
}
