//! Integration tests for the signed-request pipeline.
//!
//! These tests run the client end to end against a recording dispatcher
//! with a real wallet signer, so no network access is needed.

use std::sync::{Arc, Mutex};

use alloy_primitives::Signature;
use async_trait::async_trait;
use orderly_connector::auth::{orderly_key, OrderlyKeyPair};
use orderly_connector::core::api::Dispatcher;
use orderly_connector::core::signing::{
    schema, DomainSeparator, NetworkMode, OperationKind, StructuredMessage, WalletSigner,
    LEDGER_VERIFYING_CONTRACT, MAINNET_WITHDRAW_VERIFYING_CONTRACT,
    TESTNET_WITHDRAW_VERIFYING_CONTRACT,
};
use orderly_connector::core::types::{
    AddOrderlyKeyRequest, AssetHistoryQuery, Payload, RegistrationRequest, WithdrawRequest,
};
use orderly_connector::{Error, OrderlyClient, Result};
use reqwest::Method;
use serde_json::{json, Value};

// Well-known test private key (DO NOT USE IN PRODUCTION)
const TEST_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Public,
    Keyed,
}

#[derive(Debug, Clone)]
struct Recorded {
    route: Route,
    method: Method,
    path: String,
    payload: Payload,
}

/// Dispatcher that records every request and answers `success: true`.
#[derive(Default, Clone)]
struct RecordingDispatcher {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingDispatcher {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, route: Route, method: Method, path: &str, payload: Payload) -> Result<Value> {
        self.requests.lock().unwrap().push(Recorded {
            route,
            method,
            path: path.to_string(),
            payload,
        });
        Ok(json!({"success": true, "data": {}}))
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn public_request(&self, method: Method, path: &str, payload: Payload) -> Result<Value> {
        self.record(Route::Public, method, path, payload)
    }

    async fn signed_request(&self, method: Method, path: &str, payload: Payload) -> Result<Value> {
        self.record(Route::Keyed, method, path, payload)
    }
}

fn client(network: NetworkMode) -> (OrderlyClient, RecordingDispatcher) {
    let dispatcher = RecordingDispatcher::default();
    let signer = WalletSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
    let client = OrderlyClient::with_parts(
        network,
        Arc::new(dispatcher.clone()),
        Some(Arc::new(signer)),
    );
    (client, dispatcher)
}

/// Rebuild the signed message the way the server does, from the payload alone.
fn server_view(
    kind: OperationKind,
    chain_id: u64,
    network: NetworkMode,
    payload: &Payload,
) -> StructuredMessage {
    StructuredMessage::new(
        DomainSeparator::for_operation(kind, chain_id, network),
        kind.primary_type(),
        schema(kind),
        payload["message"].as_object().unwrap().clone(),
    )
    .unwrap()
}

fn recover_signer(message: &StructuredMessage, payload: &Payload) -> String {
    let signature = payload["signature"].as_str().unwrap();
    let bytes = hex::decode(signature.trim_start_matches("0x")).unwrap();
    let signature = Signature::try_from(bytes.as_slice()).unwrap();
    signature
        .recover_address_from_prehash(&message.signing_hash().unwrap())
        .unwrap()
        .to_checksum(None)
}

#[tokio::test]
async fn test_register_account_signature_verifies_from_payload() {
    let (client, dispatcher) = client(NetworkMode::Testnet);

    client
        .register_account(&RegistrationRequest {
            broker_id: "woofi_dex".to_string(),
            chain_id: 421614,
            registration_nonce: "194528949540".to_string(),
            user_address: TEST_ADDRESS.to_string(),
        })
        .await
        .unwrap();

    let requests = dispatcher.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.route, Route::Public);
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/v1/register_account");

    let message = server_view(
        OperationKind::Registration,
        421614,
        NetworkMode::Testnet,
        &request.payload,
    );
    assert_eq!(message.domain.verifying_contract, LEDGER_VERIFYING_CONTRACT);
    assert_eq!(recover_signer(&message, &request.payload), TEST_ADDRESS);
    assert_eq!(request.payload["userAddress"], TEST_ADDRESS);
}

#[tokio::test]
async fn test_add_generated_orderly_key() {
    let (client, dispatcher) = client(NetworkMode::Mainnet);
    let key = OrderlyKeyPair::generate();

    client
        .add_orderly_key(
            &AddOrderlyKeyRequest {
                broker_id: "woofi_dex".to_string(),
                chain_id: 42161,
                orderly_key: key.public_key(),
                scope: "read,trading".to_string(),
                expiration: 1_900_000_000_000,
                user_address: TEST_ADDRESS.to_string(),
            },
            Payload::from_iter([("tag".to_string(), json!("integration"))]),
        )
        .await
        .unwrap();

    let requests = dispatcher.requests();
    let payload = &requests[0].payload;
    assert_eq!(requests[0].route, Route::Public);
    assert_eq!(payload["message"]["orderlyKey"], key.public_key());
    assert_eq!(payload["tag"], "integration");

    let message = server_view(OperationKind::AddOrderlyKey, 42161, NetworkMode::Mainnet, payload);
    assert_eq!(recover_signer(&message, payload), TEST_ADDRESS);

    // The registered key can then authenticate requests
    let signature = key.sign_base64(b"1700000000000GET/v1/client/info");
    orderly_key::verify_base64(&key.public_key(), b"1700000000000GET/v1/client/info", &signature)
        .unwrap();
}

#[tokio::test]
async fn test_withdraw_follows_network_switch() {
    let (mut client, dispatcher) = client(NetworkMode::Testnet);
    let request = WithdrawRequest {
        broker_id: "woofi_dex".to_string(),
        chain_id: 421614,
        receiver: TEST_ADDRESS.to_string(),
        token: "USDC".to_string(),
        amount: "2500000".to_string(),
        withdraw_nonce: 4,
        user_address: TEST_ADDRESS.to_string(),
    };

    client.withdraw_request(&request).await.unwrap();
    client.set_network(NetworkMode::Mainnet);
    client.withdraw_request(&request).await.unwrap();

    let requests = dispatcher.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.route == Route::Keyed));

    let testnet = server_view(OperationKind::Withdraw, 421614, NetworkMode::Testnet, &requests[0].payload);
    let mainnet = server_view(OperationKind::Withdraw, 421614, NetworkMode::Mainnet, &requests[1].payload);
    assert_eq!(testnet.domain.verifying_contract, TESTNET_WITHDRAW_VERIFYING_CONTRACT);
    assert_eq!(mainnet.domain.verifying_contract, MAINNET_WITHDRAW_VERIFYING_CONTRACT);
    assert_eq!(recover_signer(&testnet, &requests[0].payload), TEST_ADDRESS);
    assert_eq!(recover_signer(&mainnet, &requests[1].payload), TEST_ADDRESS);
    assert_eq!(
        requests[1].payload["verifyingContract"],
        MAINNET_WITHDRAW_VERIFYING_CONTRACT.to_checksum(None)
    );
}

#[tokio::test]
async fn test_withdraw_amount_beyond_u64_round_trips() {
    let (client, dispatcher) = client(NetworkMode::Mainnet);
    let request = WithdrawRequest {
        broker_id: "woofi_dex".to_string(),
        chain_id: 42161,
        receiver: TEST_ADDRESS.to_string(),
        token: "USDC".to_string(),
        amount: "340282366920938463463374607431768211456".to_string(),
        withdraw_nonce: 9,
        user_address: TEST_ADDRESS.to_string(),
    };

    client.withdraw_request(&request).await.unwrap();

    let requests = dispatcher.requests();
    let payload = &requests[0].payload;
    assert_eq!(
        payload["message"]["amount"],
        "340282366920938463463374607431768211456"
    );

    let message = server_view(OperationKind::Withdraw, 42161, NetworkMode::Mainnet, payload);
    assert_eq!(recover_signer(&message, payload), TEST_ADDRESS);
}

#[tokio::test]
async fn test_invalid_input_sends_nothing() {
    let (client, dispatcher) = client(NetworkMode::Testnet);

    let err = client
        .register_account(&RegistrationRequest {
            broker_id: "woofi_dex".to_string(),
            chain_id: 421614,
            registration_nonce: String::new(),
            user_address: TEST_ADDRESS.to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MissingParameter {
            field: "registrationNonce"
        }
    ));

    let err = client
        .get_asset_history(&AssetHistoryQuery {
            status: Some("DONE".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidEnumValue { field: "status", .. }));

    assert!(dispatcher.requests().is_empty());
}

#[tokio::test]
async fn test_private_endpoints_route_keyed() {
    let (client, dispatcher) = client(NetworkMode::Testnet);

    client.get_withdraw_nonce().await.unwrap();
    client.get_account_information().await.unwrap();
    client.update_leverage_configuration(10).await.unwrap();
    client.get_registration_nonce().await.unwrap();

    let requests = dispatcher.requests();
    let routes: Vec<_> = requests.iter().map(|r| (r.route, r.path.as_str())).collect();
    assert_eq!(
        routes,
        vec![
            (Route::Keyed, "/v1/withdraw_nonce"),
            (Route::Keyed, "/v1/client/info"),
            (Route::Keyed, "/v1/client/leverage"),
            (Route::Public, "/v1/registration_nonce"),
        ]
    );
    assert_eq!(requests[2].payload["leverage"], 10);
}

#[test]
fn test_init_tracing_is_single_shot() {
    let _ = orderly_connector::init_tracing();
    assert!(orderly_connector::init_tracing().is_err());
}
