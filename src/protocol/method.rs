//! Resolver method definitions.
//!
//! Both methods take the content address as their single positional
//! parameter.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Value, json};

// ============================================================================
// Method
// ============================================================================

/// Methods the resolver invokes on remote endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// Ask the DHT which `(host, port)` pairs announced an address.
    ///
    /// Issued on the bootstrap connection only.
    Lookup {
        /// Content address to look up.
        address: String,
    },

    /// Ask a verified control endpoint for its info payload.
    Info {
        /// Content address the payload is requested for.
        address: String,
    },
}

impl Method {
    /// Creates a `lookup` call.
    #[inline]
    #[must_use]
    pub fn lookup(address: impl Into<String>) -> Self {
        Self::Lookup {
            address: address.into(),
        }
    }

    /// Creates an `info` call.
    #[inline]
    #[must_use]
    pub fn info(address: impl Into<String>) -> Self {
        Self::Info {
            address: address.into(),
        }
    }

    /// Returns the JSON-RPC method name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Lookup { .. } => "lookup",
            Self::Info { .. } => "info",
        }
    }

    /// Returns the positional params array.
    #[must_use]
    pub fn params(&self) -> Value {
        match self {
            Self::Lookup { address } | Self::Info { address } => json!([address]),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_method() {
        let method = Method::lookup("Qm123");
        assert_eq!(method.name(), "lookup");
        assert_eq!(method.params(), json!(["Qm123"]));
    }

    #[test]
    fn test_info_method() {
        let method = Method::info("Qm123");
        assert_eq!(method.name(), "info");
        assert_eq!(method.params(), json!(["Qm123"]));
    }
}
