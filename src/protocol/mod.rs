//! JSON-RPC 2.0 message types.
//!
//! This module defines the wire format spoken over every WebSocket
//! connection the resolver opens.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Remote | Method call carrying an `id` |
//! | `Response` | Remote → Local | `result` or `error` for that `id` |
//! | `Notification` | Remote → Local | Server push without an `id` |
//!
//! # Methods
//!
//! Only two methods are issued by the resolver:
//!
//! - `lookup(address)` - DHT announcements for a content address
//! - `info(address)` - opaque info payload from a control endpoint
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `method` | Resolver method definitions |
//! | `request` | Request, Response and Notification types |

// ============================================================================
// Submodules
// ============================================================================

/// Resolver method definitions.
pub mod method;

/// Request, Response and Notification message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use method::Method;
pub use request::{Notification, Request, Response, RpcErrorObject, JSONRPC_VERSION};
