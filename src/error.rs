//! Error types for the resolver.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use dht_rpc_resolver::{ResolverClient, Result};
//!
//! async fn example() -> Result<()> {
//!     let client = ResolverClient::connect("ws://10.0.0.1:9944").await?;
//!     let hosts = client.lookup("Qm123").await?;
//!     client.destroy().await;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidAddress`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`], [`Error::NotConnected`] |
//! | Protocol | [`Error::Protocol`], [`Error::Rpc`], [`Error::RequestTimeout`] |
//! | Lifecycle | [`Error::ClientDestroyed`] |
//! | External | [`Error::Json`] |
//!
//! Only two situations surface to callers of the resolver: a failed
//! bootstrap handshake (from `connect`) and a failed `lookup` RPC call.
//! Per-host probe and `info` failures are absorbed inside the resolver.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when resolver or connection options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Endpoint address could not be parsed.
    #[error("Invalid address {address}: {message}")]
    InvalidAddress {
        /// The offending address, verbatim.
        address: String,
        /// Why it was rejected.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Returned when the WebSocket handshake cannot be completed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Handshake did not complete within the configured budget.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed unexpectedly.
    ///
    /// Returned when connection is lost during operation.
    #[error("Connection closed")]
    ConnectionClosed,

    /// A call was issued on a connection that was never opened
    /// and does not autoconnect.
    #[error("Connection not established")]
    NotConnected,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected response.
    ///
    /// Returned when a message or result has the wrong shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// The remote end answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the remote end.
        message: String,
        /// Optional structured error data.
        data: Option<Value>,
    },

    /// Call request timeout.
    ///
    /// Returned when a response does not arrive in time.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// The resolver client was already destroyed.
    #[error("Resolver client destroyed")]
    ClientDestroyed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid address error.
    #[inline]
    pub fn invalid_address(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an RPC error from a JSON-RPC error object.
    #[inline]
    pub fn rpc(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
            data,
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::NotConnected
        )
    }

    /// Returns `true` if the remote end answered with an error object.
    #[inline]
    #[must_use]
    pub fn is_rpc_error(&self) -> bool {
        matches!(self, Self::Rpc { .. })
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed when the lookup is issued again.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. } | Self::ConnectionClosed
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::connection("refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn test_rpc_error_display() {
        let err = Error::rpc(-32601, "Method not found", None);
        assert_eq!(err.to_string(), "RPC error -32601: Method not found");
        assert!(err.is_rpc_error());
        assert!(!err.is_connection_error());
    }

    #[test]
    fn test_invalid_address_display() {
        let err = Error::invalid_address("tcp://x", "unsupported scheme");
        assert_eq!(
            err.to_string(),
            "Invalid address tcp://x: unsupported scheme"
        );
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::connection_timeout(2000);
        let request_timeout = Error::request_timeout(RequestId::generate(), 30_000);
        let other_err = Error::connection("test");

        assert!(timeout_err.is_timeout());
        assert!(request_timeout.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::connection_timeout(1000).is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::NotConnected.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
        assert!(!Error::ClientDestroyed.is_connection_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::ConnectionClosed.is_recoverable());
        assert!(Error::connection_timeout(10).is_recoverable());
        assert!(!Error::config("test").is_recoverable());
        assert!(!Error::rpc(1, "no", None).is_recoverable());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
