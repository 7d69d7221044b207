//! DHT RPC Resolver - find the control endpoints behind a content address.
//!
//! A DHT lookup returns raw `(host, port)` announcements with no
//! indication of which port, if any, serves the JSON-RPC control
//! interface. This crate resolves that: it looks the address up over a
//! long-lived bootstrap connection, verifies candidate ports by completing
//! a bounded WebSocket handshake, and gathers each verified host's `info`
//! payload into one map.
//!
//! # Architecture
//!
//! - **Bootstrap connection**: one JSON-RPC-over-WebSocket session, opened
//!   by [`ResolverClient::connect`] and closed by [`ResolverClient::destroy`]
//! - **Probes**: short-lived, timeout-bounded sessions that exist only to
//!   prove a port speaks the protocol; always closed before `lookup` returns
//! - **Partial failure**: a host that refuses, times out, or fails `info`
//!   is left out of the result; only a failed `lookup` call is an error
//!
//! # Quick Start
//!
//! ```no_run
//! use dht_rpc_resolver::{ResolverClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ResolverClient::connect("ws://10.0.0.1:9944").await?;
//!
//!     let hosts = client.lookup("Qm123").await?;
//!     for (host, info) in &hosts {
//!         println!("{host} -> {info}");
//!     }
//!
//!     client.destroy().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | JSON-RPC message types |
//! | [`resolver`] | Lookup, classification and aggregation |
//! | [`transport`] | WebSocket connection layer |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// JSON-RPC 2.0 message types.
pub mod protocol;

/// Endpoint discovery and verification.
///
/// Use [`ResolverClient::connect()`] to create a client.
pub mod resolver;

/// WebSocket transport layer.
///
/// JSON-RPC client sessions with autoconnect, reconnect and timeouts.
pub mod transport;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Resolver types
pub use resolver::{
    Announcement, Endpoint, HostCandidate, HostInfoMap, ResolverClient, ResolverConfig,
    group_by_host,
};

// Transport types
pub use transport::{
    Connection, ConnectionEvent, ConnectionOptions, Connector, RpcClient, WsConnector,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::RequestId;
