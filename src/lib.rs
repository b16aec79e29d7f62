//! Orderly Connector: Orderly Network EVM account, wallet and key-management client.
//!
//! This is the root crate that ties the workspace together for integration
//! tests and benchmarks. For actual functionality, use the individual crates:
//!
//! - `orderly-core`: validation, EIP-712 signing, request assembly, REST client
//! - `auth`: wallet key custody and Orderly ed25519 key pairs

pub use auth;
pub use orderly_core as core;

pub use orderly_core::{ClientConfig, Error, OrderlyClient, Result};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "orderly_core=info,auth=info,hyper=warn,reqwest=warn";

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}
