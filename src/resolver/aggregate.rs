//! Info aggregation.
//!
//! Fetches the `info` payload from each verified host. A failed `info`
//! call drops that host only; the endpoint was reachable a moment ago and
//! may simply have gone away since.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::Method;
use crate::transport::{Connector, RpcClient};

use super::ResolverConfig;
use super::probe::{InfoRoute, ProbeOutcome, VerifiedHost, probe_port};

// ============================================================================
// Aggregation
// ============================================================================

/// Calls `info(address)` on a verified host.
///
/// Returns `(host, payload)` on success and `None` if the call failed.
/// Any connection used here other than the bootstrap one is closed before
/// returning.
pub(crate) async fn fetch_info<C, B>(
    verified: VerifiedHost<C::Client>,
    bootstrap: &B,
    connector: &C,
    address: &str,
    config: &ResolverConfig,
) -> Option<(String, Value)>
where
    C: Connector,
    B: RpcClient + ?Sized,
{
    let method = Method::info(address);
    let VerifiedHost { endpoint, route } = verified;

    let outcome = match route {
        InfoRoute::Bootstrap => call(bootstrap, &method).await,
        InfoRoute::Probe(client) => call_then_close(&client, &method).await,
        InfoRoute::Fresh => {
            let options = config.probe_options();
            match probe_port(connector, &endpoint.ws_url(), &options, config.probe_timeout).await {
                ProbeOutcome::Verified(client) => call_then_close(&client, &method).await,
                ProbeOutcome::Refused(e) => Err(e),
                ProbeOutcome::TimedOut => Err(Error::connection_timeout(
                    config.probe_timeout.as_millis() as u64,
                )),
            }
        }
    };

    match outcome {
        Ok(payload) => {
            debug!(%endpoint, "Info received");
            Some((endpoint.host, payload))
        }
        Err(e) => {
            debug!(%endpoint, error = %e, "Info failed, dropping host");
            None
        }
    }
}

async fn call<B: RpcClient + ?Sized>(client: &B, method: &Method) -> Result<Value> {
    client.call(method.name(), method.params()).await
}

async fn call_then_close<B: RpcClient + ?Sized>(client: &B, method: &Method) -> Result<Value> {
    let result = call(client, method).await;
    client.close().await;
    result
}
