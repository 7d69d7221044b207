//! Resolver configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use dht_rpc_resolver::ResolverConfig;
//!
//! let config = ResolverConfig::new()
//!     .with_probe_timeout(Duration::from_millis(500))
//!     .with_max_concurrent_hosts(1);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};
use crate::transport::ConnectionOptions;
use crate::transport::options::DEFAULT_CALL_TIMEOUT;

// ============================================================================
// Constants
// ============================================================================

/// Handshake budget for one probe connection.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Hosts classified at the same time.
pub const DEFAULT_MAX_CONCURRENT_HOSTS: usize = 8;

// ============================================================================
// ResolverConfig
// ============================================================================

/// Tuning knobs for [`ResolverClient`](super::ResolverClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Handshake budget for each probe.
    pub probe_timeout: Duration,

    /// Response budget for `info` calls on non-bootstrap endpoints.
    pub info_timeout: Duration,

    /// Upper bound on hosts in flight, which also bounds open probe sockets.
    /// `1` classifies hosts strictly one after another.
    pub max_concurrent_hosts: usize,

    /// Issue `info` over the probe connection that verified the port
    /// instead of closing it and dialing again.
    pub reuse_probe_connection: bool,

    /// Options for the bootstrap connection.
    pub bootstrap: ConnectionOptions,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverConfig {
    /// Creates a configuration with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            info_timeout: DEFAULT_CALL_TIMEOUT,
            max_concurrent_hosts: DEFAULT_MAX_CONCURRENT_HOSTS,
            reuse_probe_connection: true,
            bootstrap: ConnectionOptions::bootstrap(),
        }
    }

    /// Sets the probe handshake budget.
    #[inline]
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets the `info` response budget.
    #[inline]
    #[must_use]
    pub fn with_info_timeout(mut self, timeout: Duration) -> Self {
        self.info_timeout = timeout;
        self
    }

    /// Sets how many hosts are classified concurrently.
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_hosts(mut self, limit: usize) -> Self {
        self.max_concurrent_hosts = limit;
        self
    }

    /// Sets whether the verifying probe connection carries the `info` call.
    #[inline]
    #[must_use]
    pub fn with_reuse_probe_connection(mut self, reuse: bool) -> Self {
        self.reuse_probe_connection = reuse;
        self
    }

    /// Sets the bootstrap connection options.
    #[inline]
    #[must_use]
    pub fn with_bootstrap_options(mut self, options: ConnectionOptions) -> Self {
        self.bootstrap = options;
        self
    }

    /// Options for probe and `info`-only connections.
    #[must_use]
    pub fn probe_options(&self) -> ConnectionOptions {
        ConnectionOptions::probe(self.probe_timeout).with_timeout(self.info_timeout)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero budget or zero concurrency.
    pub fn validate(&self) -> Result<()> {
        if self.probe_timeout.is_zero() {
            return Err(Error::config("probe_timeout must be greater than zero"));
        }
        if self.info_timeout.is_zero() {
            return Err(Error::config("info_timeout must be greater than zero"));
        }
        if self.max_concurrent_hosts == 0 {
            return Err(Error::config("max_concurrent_hosts must be at least 1"));
        }
        self.bootstrap.validate()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.probe_timeout, Duration::from_millis(2000));
        assert_eq!(config.max_concurrent_hosts, 8);
        assert!(config.reuse_probe_connection);
        assert!(!config.bootstrap.autoconnect);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_probe_options() {
        let config = ResolverConfig::new()
            .with_probe_timeout(Duration::from_millis(250))
            .with_info_timeout(Duration::from_secs(5));
        let options = config.probe_options();

        assert!(!options.autoconnect);
        assert!(!options.reconnect);
        assert_eq!(options.handshake_timeout, Duration::from_millis(250));
        assert_eq!(options.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validate() {
        assert!(
            ResolverConfig::new()
                .with_max_concurrent_hosts(0)
                .validate()
                .is_err()
        );
        assert!(
            ResolverConfig::new()
                .with_probe_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            ResolverConfig::new()
                .with_bootstrap_options(ConnectionOptions::new().with_timeout(Duration::ZERO))
                .validate()
                .is_err()
        );
    }
}
