//! Request, Response and Notification message types.
//!
//! Defines the JSON-RPC 2.0 envelope used between the resolver
//! (local end) and DHT / control endpoints (remote end).

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::Method;

// ============================================================================
// Constants
// ============================================================================

/// Protocol version tag carried by every request.
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// Request
// ============================================================================

/// A method call from local end to remote end.
///
/// # Format
///
/// ```json
/// {
///   "jsonrpc": "2.0",
///   "id": "uuid",
///   "method": "lookup",
///   "params": ["Qm123"]
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Always [`JSONRPC_VERSION`].
    pub jsonrpc: &'static str,

    /// Unique identifier for request/response correlation.
    pub id: RequestId,

    /// Method name.
    pub method: String,

    /// Method params (positional array or object).
    pub params: Value,
}

impl Request {
    /// Creates a new request with auto-generated ID.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self::with_id(RequestId::generate(), method, params)
    }

    /// Creates a new request with specific ID.
    #[inline]
    #[must_use]
    pub fn with_id(id: RequestId, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }
}

impl From<Method> for Request {
    fn from(method: Method) -> Self {
        let params = method.params();
        Self::new(method.name(), params)
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response from remote end to local end.
///
/// # Format
///
/// Success:
/// ```json
/// { "jsonrpc": "2.0", "id": "uuid", "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "jsonrpc": "2.0", "id": "uuid", "error": { "code": -32000, "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error object (if error).
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl Response {
    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, returning error if response was error.
    ///
    /// A missing or `null` result is returned as [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rpc`] if the response carried an error object.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(error) => Err(error.into()),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

// ============================================================================
// RpcErrorObject
// ============================================================================

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorObject {
    /// Error code.
    pub code: i64,

    /// Short description.
    #[serde(default)]
    pub message: String,

    /// Additional error data.
    #[serde(default)]
    pub data: Option<Value>,
}

impl From<RpcErrorObject> for Error {
    fn from(error: RpcErrorObject) -> Self {
        Error::rpc(error.code, error.message, error.data)
    }
}

// ============================================================================
// Notification
// ============================================================================

/// A server-initiated message without an `id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notification {
    /// Notification name.
    pub method: String,

    /// Notification payload.
    #[serde(default)]
    pub params: Value,
}

// ============================================================================
// Tests
// ============================================================================
