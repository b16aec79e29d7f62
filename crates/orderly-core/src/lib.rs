//! Orderly Core Library
//!
//! Parameter validation, EIP-712 request signing and REST clients for the
//! Orderly Network account, wallet and key-management endpoints.

pub mod api;
pub mod config;
pub mod error;
pub mod signing;
pub mod types;
pub mod validation;

pub use api::OrderlyClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
