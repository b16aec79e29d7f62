//! Typed-message construction for the signable Orderly operations.

use serde_json::json;
use tracing::debug;

use super::domain::{DomainSeparator, NetworkMode, OperationKind};
use super::typed_data::{
    domain_fields, FieldType, StructuredMessage, TypeSchema, TypedField, EIP712_DOMAIN_TYPE,
};
use crate::types::{payload_of, AddOrderlyKeyRequest, Payload, RegistrationRequest, WithdrawRequest};
use crate::Result;

/// Get the current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Ordered field list of an operation's primary type.
pub fn primary_fields(kind: OperationKind) -> Vec<TypedField> {
    use FieldType::{Address, String, Uint};

    match kind {
        OperationKind::Registration => vec![
            TypedField::new("brokerId", String),
            TypedField::new("chainId", Uint(256)),
            TypedField::new("timestamp", Uint(64)),
            TypedField::new("registrationNonce", Uint(256)),
        ],
        OperationKind::AddOrderlyKey => vec![
            TypedField::new("brokerId", String),
            TypedField::new("chainId", Uint(256)),
            TypedField::new("orderlyKey", String),
            TypedField::new("scope", String),
            TypedField::new("timestamp", Uint(64)),
            TypedField::new("expiration", Uint(64)),
        ],
        OperationKind::Withdraw => vec![
            TypedField::new("brokerId", String),
            TypedField::new("chainId", Uint(256)),
            TypedField::new("receiver", Address),
            TypedField::new("token", String),
            TypedField::new("amount", Uint(256)),
            TypedField::new("withdrawNonce", Uint(64)),
            TypedField::new("timestamp", Uint(64)),
        ],
    }
}

/// Full type schema (`EIP712Domain` plus the primary type) for an operation.
pub fn schema(kind: OperationKind) -> TypeSchema {
    let mut types = TypeSchema::new();
    types.insert(EIP712_DOMAIN_TYPE.to_string(), domain_fields());
    types.insert(kind.primary_type().to_string(), primary_fields(kind));
    types
}

/// Builds fresh [`StructuredMessage`]s.
///
/// The network mode is read on every build so the withdrawal verifying
/// contract always reflects the current mode. Timestamps are stamped at
/// build time and never taken from the caller.
#[derive(Debug, Clone, Copy)]
pub struct TypedMessageBuilder {
    network: NetworkMode,
}

impl TypedMessageBuilder {
    pub fn new(network: NetworkMode) -> Self {
        Self { network }
    }

    pub fn network(&self) -> NetworkMode {
        self.network
    }

    pub fn set_network(&mut self, network: NetworkMode) {
        self.network = network;
    }

    #[allow(clippy::result_large_err)]
    pub fn registration(&self, request: &RegistrationRequest) -> Result<StructuredMessage> {
        let message = payload_of([
            ("brokerId", json!(request.broker_id)),
            ("chainId", json!(request.chain_id)),
            ("timestamp", json!(current_timestamp_ms())),
            ("registrationNonce", json!(request.registration_nonce)),
        ]);
        self.build(OperationKind::Registration, request.chain_id, message)
    }

    #[allow(clippy::result_large_err)]
    pub fn add_orderly_key(&self, request: &AddOrderlyKeyRequest) -> Result<StructuredMessage> {
        let message = payload_of([
            ("brokerId", json!(request.broker_id)),
            ("chainId", json!(request.chain_id)),
            ("orderlyKey", json!(request.orderly_key)),
            ("scope", json!(request.scope)),
            ("timestamp", json!(current_timestamp_ms())),
            ("expiration", json!(request.expiration)),
        ]);
        self.build(OperationKind::AddOrderlyKey, request.chain_id, message)
    }

    #[allow(clippy::result_large_err)]
    pub fn withdraw(&self, request: &WithdrawRequest) -> Result<StructuredMessage> {
        let message = payload_of([
            ("brokerId", json!(request.broker_id)),
            ("chainId", json!(request.chain_id)),
            ("receiver", json!(request.receiver)),
            ("token", json!(request.token)),
            ("amount", json!(request.amount)),
            ("withdrawNonce", json!(request.withdraw_nonce)),
            ("timestamp", json!(current_timestamp_ms())),
        ]);
        self.build(OperationKind::Withdraw, request.chain_id, message)
    }

    #[allow(clippy::result_large_err)]
    fn build(&self, kind: OperationKind, chain_id: u64, fields: Payload) -> Result<StructuredMessage> {
        let domain = DomainSeparator::for_operation(kind, chain_id, self.network);

        debug!(
            primary_type = kind.primary_type(),
            chain_id,
            network = %self.network,
            verifying_contract = %domain.verifying_contract,
            "Built typed message"
        );

        StructuredMessage::new(domain, kind.primary_type(), schema(kind), fields)
    }
}
