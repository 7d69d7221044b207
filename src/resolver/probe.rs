//! Port classification.
//!
//! Decides which of a host's announced ports speaks the control RPC
//! protocol:
//!
//! 1. If any announced `ws://host:port` equals the bootstrap address, that
//!    port is verified without any I/O, wherever it sits in the list.
//! 2. Otherwise ports are dialed in announcement order with a bounded
//!    handshake. The first completed handshake verifies the host; a
//!    refusal or timeout just moves on to the next port.
//!
//! A host whose ports all fail is dropped without an error.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::Error;
use crate::transport::{ConnectionOptions, Connector, RpcClient};

use super::{Endpoint, HostCandidate, ResolverConfig};

// ============================================================================
// ProbeOutcome
// ============================================================================

/// Result of dialing one candidate port.
pub(crate) enum ProbeOutcome<T> {
    /// Handshake completed; the open client is handed back.
    Verified(T),
    /// Dial failed.
    Refused(Error),
    /// The wrapper timer fired before the handshake finished.
    TimedOut,
}

/// Dials `url` once, bounded by both the transport's handshake timeout
/// (inside `options`) and an outer `budget` timer.
///
/// When the outer timer wins, the in-flight dial is dropped, which closes
/// its socket.
pub(crate) async fn probe_port<C: Connector>(
    connector: &C,
    url: &str,
    options: &ConnectionOptions,
    budget: Duration,
) -> ProbeOutcome<C::Client> {
    match timeout(budget, connector.open(url, options)).await {
        Ok(Ok(client)) => ProbeOutcome::Verified(client),
        Ok(Err(e)) => ProbeOutcome::Refused(e),
        Err(_) => ProbeOutcome::TimedOut,
    }
}

// ============================================================================
// Classification
// ============================================================================

/// How the `info` call for a verified host will be carried.
pub(crate) enum InfoRoute<T> {
    /// Over the shared bootstrap connection.
    Bootstrap,
    /// Over the still-open probe connection that verified the port.
    Probe(T),
    /// Over a new connection, dialed for the `info` call alone.
    Fresh,
}

/// A host with a verified control port.
pub(crate) struct VerifiedHost<T> {
    /// Host and verified control port.
    pub(crate) endpoint: Endpoint,
    pub(crate) route: InfoRoute<T>,
}

/// Classifies one host's ports, returning the host once a port verifies.
pub(crate) async fn classify<C: Connector>(
    mut candidate: HostCandidate,
    connector: &C,
    bootstrap_address: &str,
    config: &ResolverConfig,
) -> Option<VerifiedHost<C::Client>> {
    let endpoints: Vec<_> = candidate.endpoints().collect();

    if let Some(endpoint) = endpoints
        .iter()
        .find(|endpoint| endpoint.ws_url() == bootstrap_address)
    {
        let verified = candidate.mark_verified(endpoint.port);
        debug_assert!(verified, "announced port rejected");
        debug!(host = %endpoint.host, port = endpoint.port, "Control port matches bootstrap");
        return Some(VerifiedHost {
            endpoint: endpoint.clone(),
            route: InfoRoute::Bootstrap,
        });
    }

    let options = config.probe_options();
    for endpoint in endpoints {
        let url = endpoint.ws_url();

        match probe_port(connector, &url, &options, config.probe_timeout).await {
            ProbeOutcome::Verified(client) => {
                let verified = candidate.mark_verified(endpoint.port);
                debug_assert!(verified, "announced port rejected");
                debug!(host = %endpoint.host, port = endpoint.port, "Control port verified by probe");

                let route = if config.reuse_probe_connection {
                    InfoRoute::Probe(client)
                } else {
                    client.close().await;
                    InfoRoute::Fresh
                };
                return Some(VerifiedHost { endpoint, route });
            }
            ProbeOutcome::Refused(e) => {
                trace!(host = %endpoint.host, port = endpoint.port, error = %e, "Probe refused");
            }
            ProbeOutcome::TimedOut => {
                trace!(host = %endpoint.host, port = endpoint.port, "Probe timed out");
            }
        }
    }

    debug!(host = %candidate.host(), ports = ?candidate.ports(), "No control port found");
    None
}
