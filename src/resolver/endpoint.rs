//! Endpoint and announcement types.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Endpoint
// ============================================================================

/// One network destination. Carries no implied protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or IP literal, exactly as announced.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Creates an endpoint.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns `ws://<host>:<port>`.
    ///
    /// The host is spliced in verbatim so the result can be compared
    /// string-for-string with the bootstrap address.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }

    /// Parses a `ws://` or `wss://` address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address is not a WebSocket
    /// URL with a host.
    pub fn parse(address: &str) -> Result<Self> {
        let url =
            Url::parse(address).map_err(|e| Error::invalid_address(address, e.to_string()))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::invalid_address(
                address,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        let host = url
            .host_str()
            .ok_or_else(|| Error::invalid_address(address, "missing host"))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::invalid_address(address, "missing port"))?;

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Announcement
// ============================================================================

/// A raw `(host, port)` record returned by a DHT lookup.
///
/// Any other fields the DHT attaches are kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    /// Announcing host.
    pub host: String,
    /// Announced port; may or may not be the control port.
    pub port: u16,
    /// Opaque extra fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Announcement {
    /// Creates an announcement without extra fields.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            extra: Map::new(),
        }
    }

    /// Returns the announced endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

// ============================================================================
// Tests
// ============================================================================
