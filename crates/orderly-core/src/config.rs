//! Configuration management for the Orderly connector.

use crate::signing::NetworkMode;
use crate::{Error, Result};
use serde::Deserialize;
use std::env;

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Client configuration.
///
/// Secrets are optional so that a read-only client (public endpoints only)
/// can be built from the same configuration.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub network: NetworkMode,
    /// Overrides the network's default REST base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    /// Orderly key secret (`ed25519:<base58>`). `ORDERLY_SECRET` lands here.
    #[serde(default, alias = "secret")]
    pub orderly_secret: Option<String>,
    /// Wallet private key used for EIP-712 signatures.
    #[serde(default)]
    pub wallet_private_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: NetworkMode::default(),
            base_url: None,
            account_id: None,
            orderly_secret: None,
            wallet_private_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables (and `.env`, if present).
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let network = match env::var("ORDERLY_NETWORK") {
            Ok(value) => value.parse()?,
            Err(_) => NetworkMode::default(),
        };

        Ok(Self {
            network,
            base_url: env::var("ORDERLY_BASE_URL").ok(),
            account_id: env::var("ORDERLY_ACCOUNT_ID").ok(),
            orderly_secret: env::var("ORDERLY_SECRET").ok(),
            wallet_private_key: env::var("ORDERLY_WALLET_PRIVATE_KEY").ok(),
            timeout_secs: env::var("ORDERLY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_timeout_secs),
            max_retries: env::var("ORDERLY_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_retries),
        })
    }

    /// Load configuration from a file (any format the `config` crate
    /// understands), overlaid with `ORDERLY_*` environment variables.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &str) -> Result<Self> {
        Self::layered(
            config::File::with_name(path),
            config::Environment::with_prefix("ORDERLY"),
        )
    }

    #[allow(clippy::result_large_err)]
    fn layered<S>(file: S, environment: config::Environment) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// REST base URL, falling back to the network default.
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.network.default_base_url().to_string())
    }

    #[allow(clippy::result_large_err)]
    pub(crate) fn require_account_id(&self) -> Result<&str> {
        self.account_id.as_deref().ok_or_else(|| Error::Config {
            message: "account_id is required for Orderly key authentication".to_string(),
        })
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("ClientConfig")
            .field("network", &self.network)
            .field("base_url", &self.resolved_base_url())
            .field("account_id", &self.account_id)
            .field("orderly_secret", &redact(&self.orderly_secret))
            .field("wallet_private_key", &redact(&self.wallet_private_key))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
