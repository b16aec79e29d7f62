//! The Orderly client: one method per endpoint.
//!
//! Endpoint methods live in [`super::account`] and [`super::wallet`]; this
//! module holds construction and the shared sign-then-dispatch pipeline.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use super::assembler::{assemble, DispatchRoute};
use super::http::{Dispatcher, HttpDispatcher};
use crate::config::ClientConfig;
use crate::signing::{
    NetworkMode, OperationKind, SignatureProvider, StructuredMessage, TypedMessageBuilder,
    WalletSigner,
};
use crate::types::Payload;
use crate::{Error, Result};

/// Orderly Network REST client.
///
/// The network mode selects the withdrawal verifying contract and may be
/// changed between calls with [`OrderlyClient::set_network`]. The base URL
/// is fixed by the dispatcher at construction.
pub struct OrderlyClient {
    network: NetworkMode,
    dispatcher: Arc<dyn Dispatcher>,
    signer: Option<Arc<dyn SignatureProvider>>,
}

impl OrderlyClient {
    /// Create a client from its parts.
    pub fn with_parts(
        network: NetworkMode,
        dispatcher: Arc<dyn Dispatcher>,
        signer: Option<Arc<dyn SignatureProvider>>,
    ) -> Self {
        Self {
            network,
            dispatcher,
            signer,
        }
    }

    /// Create a client over HTTP from configuration.
    ///
    /// The wallet signer is attached when a wallet private key is
    /// configured; the Orderly key when a secret and account id are.
    #[allow(clippy::result_large_err)]
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let dispatcher = HttpDispatcher::from_config(config)?;
        let signer = config
            .wallet_private_key
            .as_deref()
            .map(WalletSigner::from_private_key)
            .transpose()?
            .map(|signer| Arc::new(signer) as Arc<dyn SignatureProvider>);

        info!(
            network = %config.network,
            base_url = %dispatcher.base_url(),
            wallet = signer.is_some(),
            orderly_key = dispatcher.has_credentials(),
            "Orderly client configured"
        );

        Ok(Self::with_parts(config.network, Arc::new(dispatcher), signer))
    }

    /// Create a client from `ORDERLY_*` environment variables.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    pub fn network(&self) -> NetworkMode {
        self.network
    }

    /// Switch network mode. Applies to the next message built.
    pub fn set_network(&mut self, network: NetworkMode) {
        debug!(from = %self.network, to = %network, "Switching network mode");
        self.network = network;
    }

    pub(crate) fn builder(&self) -> TypedMessageBuilder {
        TypedMessageBuilder::new(self.network)
    }

    #[allow(clippy::result_large_err)]
    fn signer(&self) -> Result<&dyn SignatureProvider> {
        self.signer.as_deref().ok_or_else(|| Error::Auth {
            message: "Wallet signer not configured".to_string(),
        })
    }

    /// Unauthenticated request.
    pub(crate) async fn public(&self, method: Method, path: &str, payload: Payload) -> Result<Value> {
        self.dispatcher.public_request(method, path, payload).await
    }

    /// Orderly-key authenticated request.
    pub(crate) async fn keyed(&self, method: Method, path: &str, payload: Payload) -> Result<Value> {
        self.dispatcher.signed_request(method, path, payload).await
    }

    /// Sign `message`, assemble the payload and POST it on the operation's route.
    ///
    /// Callers validate and build first; nothing is sent if signing fails.
    pub(crate) async fn submit_signed(
        &self,
        kind: OperationKind,
        path: &str,
        message: StructuredMessage,
        user_address: &str,
        extras: Payload,
    ) -> Result<Value> {
        let signature = self.signer()?.sign(&message).await.map_err(|e| match e {
            Error::Signing { .. } => e,
            other => Error::Signing {
                message: other.to_string(),
            },
        })?;

        let payload = assemble(kind, &message, signature, user_address, extras);
        let route = DispatchRoute::for_operation(kind);

        debug!(
            operation = kind.primary_type(),
            path,
            route = ?route,
            network = %self.network,
            "Submitting signed request"
        );

        let response = match route {
            DispatchRoute::Public => self.public(Method::POST, path, payload).await?,
            DispatchRoute::Keyed => self.keyed(Method::POST, path, payload).await?,
        };

        info!(
            operation = kind.primary_type(),
            user_address,
            "Signed request accepted"
        );

        Ok(response)
    }
}

impl std::fmt::Debug for OrderlyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderlyClient")
            .field("network", &self.network)
            .field("signer", &self.signer.as_ref().map(|s| s.address()))
            .finish()
    }
}
