//! WebSocket transport layer.
//!
//! This module is the Connection Primitive the resolver is built on: a
//! JSON-RPC client session over WebSocket with configurable
//! autoconnect / reconnect / timeout behavior.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Resolver       │                              │  DHT / control  │
//! │                 │         WebSocket            │  endpoint       │
//! │  Connection     │◄────────────────────────────►│                 │
//! │  (event loop)   │      ws://host:port          │  JSON-RPC 2.0   │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket client connection and event loop |
//! | `options` | Dial, reconnect and timeout settings |
//! | `rpc` | `RpcClient` / `Connector` seams |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket client connection and event loop.
pub mod connection;

/// Connection options.
pub mod options;

/// RPC client abstraction.
pub mod rpc;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ConnectionEvent, EventHandler};
pub use options::ConnectionOptions;
pub use rpc::{Connector, RpcClient, WsConnector};
