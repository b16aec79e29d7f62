//! Wallet signatures over structured messages.

use alloy_primitives::Address;
use async_trait::async_trait;
use auth::TradingWallet;
use tracing::debug;

use super::typed_data::StructuredMessage;
use crate::{Error, Result};

/// Produces EIP-712 signatures for the wallet that owns the account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Sign `message`, returning a `0x`-prefixed 65-byte hex signature.
    async fn sign(&self, message: &StructuredMessage) -> Result<String>;

    /// Address the signatures recover to.
    fn address(&self) -> Address;
}

/// [`SignatureProvider`] backed by a local private key.
#[derive(Debug, Clone)]
pub struct WalletSigner {
    wallet: TradingWallet,
}

impl WalletSigner {
    pub fn new(wallet: TradingWallet) -> Self {
        Self { wallet }
    }

    /// Create a signer from a hex private key.
    #[allow(clippy::result_large_err)]
    pub fn from_private_key(key: &str) -> Result<Self> {
        let wallet = TradingWallet::from_private_key(key).map_err(|e| Error::Auth {
            message: format!("{:#}", e),
        })?;
        Ok(Self::new(wallet))
    }

    pub fn wallet(&self) -> &TradingWallet {
        &self.wallet
    }
}

#[async_trait]
impl SignatureProvider for WalletSigner {
    async fn sign(&self, message: &StructuredMessage) -> Result<String> {
        let digest = message.signing_hash().map_err(|e| Error::Signing {
            message: e.to_string(),
        })?;

        let signature = self
            .wallet
            .sign_digest(&digest.0)
            .await
            .map_err(|e| Error::Signing {
                message: format!("{:#}", e),
            })?;

        debug!(
            primary_type = %message.primary_type,
            signer = %self.wallet.address_string(),
            "Signed typed message"
        );

        Ok(format!("0x{}", hex::encode(signature)))
    }

    fn address(&self) -> Address {
        self.wallet.address()
    }
}
