//! Final payload assembly for wallet-signed operations.

use serde_json::Value;
use tracing::warn;

use crate::signing::{OperationKind, StructuredMessage};
use crate::types::Payload;

/// Payload keys owned by the assembler. Caller extras never override them.
pub const RESERVED_KEYS: [&str; 5] = [
    "message",
    "signature",
    "userAddress",
    "timestamp",
    "verifyingContract",
];

/// Which dispatcher path an operation goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchRoute {
    /// No Orderly key; the EIP-712 signature is the credential.
    Public,
    /// Orderly key envelope attached.
    Keyed,
}

impl DispatchRoute {
    pub fn for_operation(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Registration | OperationKind::AddOrderlyKey => DispatchRoute::Public,
            OperationKind::Withdraw => DispatchRoute::Keyed,
        }
    }
}

/// Merge the signed message, its signature and the signing address into a
/// request payload, followed by any extras.
///
/// `message` is the exact field map that was signed. Withdrawals also echo
/// the resolved verifying contract.
pub fn assemble(
    kind: OperationKind,
    message: &StructuredMessage,
    signature: String,
    user_address: &str,
    extras: Payload,
) -> Payload {
    let mut payload = Payload::new();
    payload.insert(
        "message".to_string(),
        Value::Object(message.message.clone()),
    );
    payload.insert("signature".to_string(), Value::String(signature));
    payload.insert(
        "userAddress".to_string(),
        Value::String(user_address.to_string()),
    );

    if kind == OperationKind::Withdraw {
        payload.insert(
            "verifyingContract".to_string(),
            Value::String(message.domain.verifying_contract.to_checksum(None)),
        );
    }

    merge_extras(&mut payload, extras);
    payload
}

/// Merge extras into `payload`, dropping reserved and already-present keys.
pub fn merge_extras(payload: &mut Payload, extras: Payload) {
    for (key, value) in extras {
        if RESERVED_KEYS.contains(&key.as_str()) || payload.contains_key(&key) {
            warn!(key = %key, "Ignoring extra that would override a reserved payload field");
            continue;
        }
        if value.is_null() {
            continue;
        }
        payload.insert(key, value);
    }
}
