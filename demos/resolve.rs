//! Resolve a content address to its control endpoints.
//!
//! Demonstrates:
//! - Connecting a resolver to a bootstrap endpoint
//! - Looking up one or more content addresses
//! - Destroying the client
//!
//! Usage:
//!   cargo run --example resolve -- ws://10.0.0.1:9944 Qm123
//!   cargo run --example resolve -- ws://10.0.0.1:9944 Qm123 Qm456 --debug
//!   cargo run --example resolve -- ws://10.0.0.1:9944 Qm123 --sequential

// ============================================================================
// Imports
// ============================================================================

use dht_rpc_resolver::{ResolverClient, ResolverConfig, Result, WsConnector};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Args
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    bootstrap: String,
    addresses: Vec<String>,
    debug: bool,
    sequential: bool,
}

impl Args {
    fn parse() -> Option<Self> {
        let (flags, positional): (Vec<String>, Vec<String>) =
            std::env::args().skip(1).partition(|a| a.starts_with("--"));

        let mut positional = positional.into_iter();
        let bootstrap = positional.next()?;
        let addresses: Vec<String> = positional.collect();
        if addresses.is_empty() {
            return None;
        }

        Some(Self {
            bootstrap,
            addresses,
            debug: flags.iter().any(|f| f == "--debug"),
            sequential: flags.iter().any(|f| f == "--sequential"),
        })
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "dht_rpc_resolver=debug"
    } else {
        "dht_rpc_resolver=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let Some(args) = Args::parse() else {
        eprintln!("usage: resolve <ws://bootstrap:port> <address>... [--debug] [--sequential]");
        std::process::exit(2);
    };
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Resolve ===\n");

    let mut config = ResolverConfig::new();
    if args.sequential {
        config = config.with_max_concurrent_hosts(1);
    }

    println!("[Setup] Connecting to {}...", args.bootstrap);
    let client = ResolverClient::connect_with(&args.bootstrap, config, WsConnector).await?;
    println!("        ✓ Bootstrap connection open\n");

    for address in &args.addresses {
        println!("[Lookup] {address}");
        match client.lookup(address).await {
            Ok(hosts) if hosts.is_empty() => println!("        (no verified hosts)"),
            Ok(hosts) => {
                for (host, info) in &hosts {
                    println!("        {host} -> {info}");
                }
            }
            Err(e) => println!("        ✗ {e}"),
        }
        println!();
    }

    client.destroy().await;
    println!("[Done] Client destroyed");

    Ok(())
}
