//! Signing benchmarks for the request pipeline.
//!
//! Run with: `cargo bench --bench signing`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use orderly_connector::auth::OrderlyKeyPair;
use orderly_connector::core::api::http::{request_target, signing_message};
use orderly_connector::core::signing::{
    NetworkMode, SignatureProvider, StructuredMessage, TypedMessageBuilder, WalletSigner,
};
use orderly_connector::core::types::{payload_of, WithdrawRequest};
use reqwest::Method;
use serde_json::json;

// Well-known test private key (DO NOT USE IN PRODUCTION)
const TEST_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

fn withdraw_request() -> WithdrawRequest {
    WithdrawRequest {
        broker_id: "woofi_dex".to_string(),
        chain_id: 421614,
        receiver: TEST_ADDRESS.to_string(),
        token: "USDC".to_string(),
        amount: "1000000".to_string(),
        withdraw_nonce: 12,
        user_address: TEST_ADDRESS.to_string(),
    }
}

fn withdraw_message() -> StructuredMessage {
    TypedMessageBuilder::new(NetworkMode::Testnet)
        .withdraw(&withdraw_request())
        .unwrap()
}

fn bench_typed_messages(c: &mut Criterion) {
    let mut group = c.benchmark_group("typed_messages");
    group.throughput(Throughput::Elements(1));

    let builder = TypedMessageBuilder::new(NetworkMode::Testnet);
    let request = withdraw_request();
    group.bench_function("build_withdraw", |b| {
        b.iter(|| builder.withdraw(black_box(&request)).unwrap())
    });

    let message = withdraw_message();
    group.bench_function("struct_hash", |b| {
        b.iter(|| black_box(&message).struct_hash().unwrap())
    });
    group.bench_function("signing_hash", |b| {
        b.iter(|| black_box(&message).signing_hash().unwrap())
    });

    group.finish();
}

fn bench_wallet_signature(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let signer = WalletSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
    let message = withdraw_message();

    c.bench_function("wallet_sign_withdraw", |b| {
        b.iter(|| runtime.block_on(signer.sign(black_box(&message))).unwrap())
    });
}

fn bench_orderly_key_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("orderly_key_envelope");
    let key = OrderlyKeyPair::generate();

    let payload = payload_of([
        ("token", json!("USDC")),
        ("side", json!("DEPOSIT")),
        ("page", json!(1)),
        ("size", json!(25)),
    ]);
    group.bench_function("get_query_and_sign", |b| {
        b.iter(|| {
            let (target, body) =
                request_target(&Method::GET, "/v1/asset/history", black_box(&payload)).unwrap();
            let message = signing_message("1700000000000", &Method::GET, &target, body.as_deref());
            key.sign_base64(message.as_bytes())
        })
    });

    let body = payload_of([("leverage", json!(10))]);
    group.bench_function("post_body_and_sign", |b| {
        b.iter(|| {
            let (target, body) =
                request_target(&Method::POST, "/v1/client/leverage", black_box(&body)).unwrap();
            let message = signing_message("1700000000000", &Method::POST, &target, body.as_deref());
            key.sign_base64(message.as_bytes())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_typed_messages,
    bench_wallet_signature,
    bench_orderly_key_envelope,
);
criterion_main!(benches);
