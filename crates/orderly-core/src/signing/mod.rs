//! EIP-712 signing for Orderly account operations.
//!
//! # Architecture
//!
//! ```text
//! request args ──► TypedMessageBuilder ──► StructuredMessage
//!                  (domain, schema,              │
//!                   fresh timestamp)             ▼
//!                                       SignatureProvider
//!                                       (TradingWallet)
//!                                                │
//!                                                ▼
//!                                    0x-prefixed signature
//! ```
//!
//! # Example
//!
//! ```ignore
//! use orderly_core::signing::{NetworkMode, SignatureProvider, TypedMessageBuilder, WalletSigner};
//! use orderly_core::types::RegistrationRequest;
//!
//! let builder = TypedMessageBuilder::new(NetworkMode::Testnet);
//! let message = builder.registration(&RegistrationRequest {
//!     broker_id: "woofi_dex".into(),
//!     chain_id: 421614,
//!     registration_nonce: nonce,
//!     user_address: address.clone(),
//! })?;
//!
//! let signer = WalletSigner::from_private_key("0x...")?;
//! let signature = signer.sign(&message).await?;
//! ```

pub mod builder;
pub mod domain;
pub mod signer;
pub mod typed_data;

pub use builder::{current_timestamp_ms, schema, TypedMessageBuilder};

pub use domain::{
    resolve_verifying_contract, ContractResolution, DomainSeparator, NetworkMode,
    OperationKind, DOMAIN_NAME, DOMAIN_VERSION, LEDGER_VERIFYING_CONTRACT,
    MAINNET_WITHDRAW_VERIFYING_CONTRACT, TESTNET_WITHDRAW_VERIFYING_CONTRACT,
};

pub use signer::{SignatureProvider, WalletSigner};

pub use typed_data::{
    compute_typed_data_hash, FieldType, StructuredMessage, TypeSchema, TypedField,
};
