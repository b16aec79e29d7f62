//! Trading wallet management for EIP-712 request signing.
//!
//! Provides wallet loading from environment variables for the account,
//! key-management and withdrawal flows that must be signed by the wallet
//! owner.

use alloy_primitives::{Address, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{Context, Result};
use std::str::FromStr;

/// Environment variable holding the wallet private key.
pub const WALLET_KEY_ENV: &str = "ORDERLY_WALLET_PRIVATE_KEY";

/// A wallet with private key access for signing typed messages.
///
/// The wallet can be loaded from an environment variable or directly
/// from a hex-encoded private key.
#[derive(Clone)]
pub struct TradingWallet {
    signer: PrivateKeySigner,
    address: Address,
}

impl TradingWallet {
    /// Load wallet from the `ORDERLY_WALLET_PRIVATE_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set or
    /// if the private key format is invalid.
    pub fn from_env() -> Result<Self> {
        let private_key = std::env::var(WALLET_KEY_ENV)
            .with_context(|| format!("{WALLET_KEY_ENV} environment variable not set"))?;

        Self::from_private_key(&private_key)
    }

    /// Create a wallet from a hex-encoded private key.
    ///
    /// # Arguments
    ///
    /// * `key` - A 64-character hex string, optionally prefixed with "0x"
    pub fn from_private_key(key: &str) -> Result<Self> {
        let key_clean = key.trim().trim_start_matches("0x");

        let signer = PrivateKeySigner::from_str(key_clean)
            .context("Invalid private key format - expected 64 hex characters")?;

        let address = signer.address();

        Ok(Self { signer, address })
    }

    /// Get the wallet's Ethereum address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the wallet address as a checksummed hex string.
    pub fn address_string(&self) -> String {
        self.address.to_checksum(None)
    }

    /// Sign a prehashed 32-byte digest (an EIP-712 signing hash).
    ///
    /// Returns the 65-byte `r || s || v` signature.
    pub async fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>> {
        let signature = self
            .signer
            .sign_hash(&B256::from(*digest))
            .await
            .context("Failed to sign digest")?;
        Ok(signature.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for TradingWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the private key in debug output
        f.debug_struct("TradingWallet")
            .field("address", &self.address_string())
            .finish()
    }
}
