//! Key custody
//!
//! Wallet keys for EIP-712 signing and Orderly ed25519 keys for private
//! API authentication.

pub mod orderly_key;
pub mod wallet;

pub use orderly_key::OrderlyKeyPair;
pub use wallet::TradingWallet;
