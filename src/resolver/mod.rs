//! Endpoint discovery and verification.
//!
//! Given a content address, the resolver asks the DHT (over the bootstrap
//! connection) who announced it, works out which announced port on each
//! host actually speaks the control RPC, and collects each verified
//! host's `info` payload.
//!
//! # Flow
//!
//! ```text
//! lookup(address)
//!   └─► bootstrap.call("lookup", [address])      fatal on failure
//!         └─► group_by_host                       one candidate per host
//!               └─► probe::classify (per host)    first verified port wins
//!                     └─► aggregate::fetch_info   failures drop the host
//!                           └─► { host → info }
//! ```
//!
//! Hosts are processed concurrently up to
//! [`ResolverConfig::max_concurrent_hosts`]; ports within a host are
//! always tried in announcement order.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `client` | [`ResolverClient`] lifecycle and `lookup` |
//! | `config` | [`ResolverConfig`] |
//! | `endpoint` | [`Endpoint`] and [`Announcement`] |
//! | `grouping` | [`HostCandidate`] and [`group_by_host`] |

// ============================================================================
// Submodules
// ============================================================================

/// Info aggregation.
mod aggregate;

/// Resolver client.
pub mod client;

/// Resolver configuration.
pub mod config;

/// Endpoint and announcement types.
pub mod endpoint;

/// Host grouping.
pub mod grouping;

/// Port classification.
mod probe;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{HostInfoMap, ResolverClient};
pub use config::ResolverConfig;
pub use endpoint::{Announcement, Endpoint};
pub use grouping::{HostCandidate, group_by_host};
