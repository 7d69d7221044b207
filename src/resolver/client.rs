//! Resolver client.
//!
//! Owns the bootstrap connection and runs lookups over it.
//!
//! # Lifecycle
//!
//! ```text
//! connect() ──► Ready ──destroy()──► Destroyed
//!                 │
//!                 └─ lookup() any number of times
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{StreamExt, future, stream};
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::protocol::Method;
use crate::transport::{Connector, RpcClient, WsConnector};

use super::{Announcement, Endpoint, HostCandidate, ResolverConfig, aggregate, group_by_host, probe};

// ============================================================================
// Types
// ============================================================================

/// Lookup result: host → `info` payload, for every host that was both
/// port-verified and answered `info`.
pub type HostInfoMap = FxHashMap<String, Value>;

// ============================================================================
// ResolverClient
// ============================================================================

/// Resolves content addresses to the hosts serving their control RPC.
///
/// # Example
///
/// ```no_run
/// use dht_rpc_resolver::{ResolverClient, Result};
///
/// # async fn example() -> Result<()> {
/// let client = ResolverClient::connect("ws://10.0.0.1:9944").await?;
///
/// for (host, info) in client.lookup("Qm123").await? {
///     println!("{host}: {info}");
/// }
///
/// client.destroy().await;
/// # Ok(())
/// # }
/// ```
pub struct ResolverClient<C: Connector = WsConnector> {
    /// Long-lived connection to the bootstrap endpoint.
    bootstrap: C::Client,
    /// Bootstrap address exactly as given to `connect`.
    bootstrap_address: String,
    /// Opens probe and `info` connections.
    connector: C,
    config: ResolverConfig,
    destroyed: AtomicBool,
}

impl ResolverClient<WsConnector> {
    /// Connects to the bootstrap endpoint with default settings.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAddress`] if `address` is not a `ws://`/`wss://` URL
    /// - the transport's error if the bootstrap handshake fails
    pub async fn connect(address: impl Into<String>) -> Result<Self> {
        Self::connect_with(address, ResolverConfig::default(), WsConnector).await
    }
}

impl<C: Connector> ResolverClient<C> {
    /// Connects to the bootstrap endpoint through `connector`.
    ///
    /// The bootstrap connection is built with autoconnect disabled and
    /// dialed explicitly; this resolves once it is open.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `config` is invalid
    /// - [`Error::InvalidAddress`] if `address` is not a `ws://`/`wss://` URL
    /// - the transport's error if the bootstrap handshake fails
    pub async fn connect_with(
        address: impl Into<String>,
        config: ResolverConfig,
        connector: C,
    ) -> Result<Self> {
        config.validate()?;

        let bootstrap_address = address.into();
        Endpoint::parse(&bootstrap_address)?;

        let bootstrap = connector
            .open(&bootstrap_address, &config.bootstrap)
            .await?;

        info!(address = %bootstrap_address, "Bootstrap connection established");

        Ok(Self {
            bootstrap,
            bootstrap_address,
            connector,
            config,
            destroyed: AtomicBool::new(false),
        })
    }

    /// Returns the bootstrap address, verbatim.
    #[inline]
    #[must_use]
    pub fn bootstrap_address(&self) -> &str {
        &self.bootstrap_address
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns `true` once [`destroy`](Self::destroy) has run.
    #[inline]
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Resolves `address` to the hosts serving its control RPC.
    ///
    /// Hosts whose ports all fail verification, or whose `info` call fails,
    /// are left out. An empty map is a normal result.
    ///
    /// Every probe connection opened here is closed before this returns;
    /// if the future is dropped early, dropping the probe handles closes
    /// their sockets.
    ///
    /// # Errors
    ///
    /// - [`Error::ClientDestroyed`] if called after [`destroy`](Self::destroy)
    /// - the `lookup` call's own error, unchanged
    /// - [`Error::Protocol`] if the `lookup` result is not an array
    pub async fn lookup(&self, address: &str) -> Result<HostInfoMap> {
        if self.is_destroyed() {
            return Err(Error::ClientDestroyed);
        }

        let announcements = self.fetch_announcements(address).await?;
        let candidates = group_by_host(&announcements);
        let candidate_count = candidates.len();

        debug!(
            address,
            announcements = announcements.len(),
            hosts = candidate_count,
            "Classifying announced hosts"
        );

        let resolved: HostInfoMap = stream::iter(candidates)
            .map(|candidate| self.resolve_host(candidate, address))
            .buffer_unordered(self.config.max_concurrent_hosts)
            .filter_map(future::ready)
            .collect()
            .await;

        info!(
            address,
            candidates = candidate_count,
            resolved = resolved.len(),
            "Lookup complete"
        );

        Ok(resolved)
    }

    /// Closes the bootstrap connection.
    ///
    /// Runs once; later calls only log a warning.
    pub async fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            warn!(address = %self.bootstrap_address, "Resolver client already destroyed");
            return;
        }

        self.bootstrap.close().await;
        info!(address = %self.bootstrap_address, "Resolver client destroyed");
    }

    /// Issues `lookup(address)` on the bootstrap connection.
    async fn fetch_announcements(&self, address: &str) -> Result<Vec<Announcement>> {
        let method = Method::lookup(address);
        let result = self
            .bootstrap
            .call(method.name(), method.params())
            .await?;

        parse_announcements(result)
    }

    /// Classifies one host, then fetches its info.
    async fn resolve_host(&self, candidate: HostCandidate, address: &str) -> Option<(String, Value)> {
        let verified = probe::classify(
            candidate,
            &self.connector,
            &self.bootstrap_address,
            &self.config,
        )
        .await?;

        aggregate::fetch_info(
            verified,
            &self.bootstrap,
            &self.connector,
            address,
            &self.config,
        )
        .await
    }
}

/// Decodes the `lookup` result, skipping entries that are not announcements.
fn parse_announcements(result: Value) -> Result<Vec<Announcement>> {
    let Value::Array(entries) = result else {
        return Err(Error::protocol(format!(
            "lookup returned {result} instead of an array"
        )));
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Announcement>(entry) {
            Ok(announcement) => Some(announcement),
            Err(e) => {
                warn!(error = %e, "Skipping malformed announcement");
                None
            }
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
