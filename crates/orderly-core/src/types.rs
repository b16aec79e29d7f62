//! Request types and enumerated parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validation::ParamEnum;

/// Extra top-level payload fields merged into a request after the required ones.
pub type Payload = Map<String, Value>;

macro_rules! param_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl ParamEnum for $name {
            const VARIANTS: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

param_enum! {
    /// Direction of an asset movement.
    WalletSide {
        Deposit => "DEPOSIT",
        Withdraw => "WITHDRAW",
    }
}

param_enum! {
    /// Processing status of a deposit or withdrawal.
    AssetStatus {
        New => "NEW",
        Confirm => "CONFIRM",
        Processing => "PROCESSING",
        Completed => "COMPLETED",
        Failed => "FAILED",
    }
}

param_enum! {
    /// Lifecycle status of an Orderly key.
    KeyStatus {
        Active => "ACTIVE",
        Removing => "REMOVING",
        Removed => "REMOVED",
    }
}

param_enum! {
    /// Mode an Orderly key's IP restriction can be reset to.
    IpRestrictionResetMode {
        AllowAllIps => "ALLOW_ALL_IPS",
        DisallowAllIps => "DISALLOW_ALL_IPS",
    }
}

/// Arguments of `POST /v1/register_account`.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub broker_id: String,
    pub chain_id: u64,
    /// Nonce from `GET /v1/registration_nonce`, valid for 2 minutes.
    pub registration_nonce: String,
    pub user_address: String,
}

/// Arguments of `POST /v1/orderly_key`.
#[derive(Debug, Clone, Default)]
pub struct AddOrderlyKeyRequest {
    pub broker_id: String,
    pub chain_id: u64,
    /// Public key in `ed25519:<base58>` form.
    pub orderly_key: String,
    /// Comma-separated scopes, e.g. `read,trading`.
    pub scope: String,
    /// Key expiry, Unix milliseconds.
    pub expiration: u64,
    pub user_address: String,
}

/// Arguments of `POST /v1/withdraw_request`.
#[derive(Debug, Clone, Default)]
pub struct WithdrawRequest {
    pub broker_id: String,
    pub chain_id: u64,
    pub receiver: String,
    /// Token symbol, e.g. `USDC`.
    pub token: String,
    /// Amount in the token's base units, as a decimal uint256 string.
    pub amount: String,
    /// Nonce from `GET /v1/withdraw_nonce`.
    pub withdraw_nonce: u64,
    pub user_address: String,
}

/// Filters of `GET /v1/asset/history`. All optional.
#[derive(Debug, Clone, Default)]
pub struct AssetHistoryQuery {
    pub token: Option<String>,
    /// `DEPOSIT` or `WITHDRAW`.
    pub side: Option<String>,
    /// `NEW`, `CONFIRM`, `PROCESSING`, `COMPLETED` or `FAILED`.
    pub status: Option<String>,
    /// 13-digit millisecond timestamp.
    pub start_t: Option<u64>,
    pub end_t: Option<u64>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Build a payload from `(key, value)` pairs, dropping `None`/null values.
pub fn payload_of<I, K>(pairs: I) -> Payload
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.into(), value))
        .collect()
}
