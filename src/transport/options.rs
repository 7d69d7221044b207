//! Connection options.
//!
//! Controls how a [`Connection`](super::Connection) dials, how long it
//! waits, and whether it recovers from a lost socket.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use dht_rpc_resolver::ConnectionOptions;
//!
//! let options = ConnectionOptions::new()
//!     .with_autoconnect(false)
//!     .with_handshake_timeout(Duration::from_secs(2));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default WebSocket handshake budget.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default per-call response budget.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delay between reconnect attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(1000);

/// Default number of reconnect attempts after a lost socket.
pub const DEFAULT_MAX_RECONNECTS: u32 = 5;

// ============================================================================
// ConnectionOptions
// ============================================================================

/// Connection behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Dial lazily on the first call if the connection is still idle.
    pub autoconnect: bool,

    /// Re-dial after the socket is lost.
    pub reconnect: bool,

    /// Delay between reconnect attempts.
    pub reconnect_interval: Duration,

    /// Reconnect attempts before giving up (0 = unlimited).
    pub max_reconnects: u32,

    /// Budget for the WebSocket handshake.
    pub handshake_timeout: Duration,

    /// Budget for each call's response.
    pub timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ConnectionOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            autoconnect: true,
            reconnect: true,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnects: DEFAULT_MAX_RECONNECTS,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Options for the long-lived bootstrap connection.
    ///
    /// Dialed explicitly, re-dialed if lost.
    #[inline]
    #[must_use]
    pub const fn bootstrap() -> Self {
        Self {
            autoconnect: false,
            ..Self::new()
        }
    }

    /// Options for a short-lived probe connection.
    ///
    /// Dialed explicitly, never re-dialed, and bounded by `budget` for both
    /// the handshake and any call made over it.
    #[inline]
    #[must_use]
    pub const fn probe(budget: Duration) -> Self {
        Self {
            autoconnect: false,
            reconnect: false,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnects: 0,
            handshake_timeout: budget,
            timeout: budget,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ConnectionOptions {
    /// Sets lazy dialing on first call.
    #[inline]
    #[must_use]
    pub fn with_autoconnect(mut self, autoconnect: bool) -> Self {
        self.autoconnect = autoconnect;
        self
    }

    /// Sets re-dialing after a lost socket.
    #[inline]
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Sets the delay between reconnect attempts.
    #[inline]
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the number of reconnect attempts (0 = unlimited).
    #[inline]
    #[must_use]
    pub fn with_max_reconnects(mut self, max_reconnects: u32) -> Self {
        self.max_reconnects = max_reconnects;
        self
    }

    /// Sets the handshake budget.
    #[inline]
    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Sets the per-call response budget.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ConnectionOptions {
    /// Checks that every budget is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first zero duration.
    pub fn validate(&self) -> Result<()> {
        if self.handshake_timeout.is_zero() {
            return Err(Error::config("handshake_timeout must be greater than zero"));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
