//! Asset history and withdrawal endpoints.

use reqwest::Method;
use serde_json::{json, Value};

use super::client::OrderlyClient;
use crate::signing::OperationKind;
use crate::types::{payload_of, AssetHistoryQuery, AssetStatus, Payload, WalletSide, WithdrawRequest};
use crate::validation::{check_address, check_required, parse_optional_enum};
use crate::Result;

impl OrderlyClient {
    /// `GET /v1/asset/history`: deposits and withdrawals.
    pub async fn get_asset_history(&self, query: &AssetHistoryQuery) -> Result<Value> {
        let side = parse_optional_enum::<WalletSide>("side", query.side.as_deref())?;
        let status = parse_optional_enum::<AssetStatus>("status", query.status.as_deref())?;

        let payload = payload_of([
            ("token", json!(query.token)),
            ("side", json!(side)),
            ("status", json!(status)),
            ("start_t", json!(query.start_t)),
            ("end_t", json!(query.end_t)),
            ("page", json!(query.page)),
            ("size", json!(query.size)),
        ]);
        self.keyed(Method::GET, "/v1/asset/history", payload).await
    }

    /// `GET /v1/withdraw_nonce`. Each nonce can be used once.
    pub async fn get_withdraw_nonce(&self) -> Result<Value> {
        self.keyed(Method::GET, "/v1/withdraw_nonce", Payload::new())
            .await
    }

    /// Request a withdrawal: `POST /v1/withdraw_request`.
    ///
    /// The verifying contract follows the client's current network mode and
    /// is echoed in the payload. Cross-chain eligibility is checked by the
    /// server (error 22).
    pub async fn withdraw_request(&self, request: &WithdrawRequest) -> Result<Value> {
        check_required(&[
            (&request.broker_id, "brokerId"),
            (&request.chain_id, "chainId"),
            (&request.receiver, "receiver"),
            (&request.token, "token"),
            (&request.amount, "amount"),
            (&request.withdraw_nonce, "withdrawNonce"),
            (&request.user_address, "userAddress"),
        ])?;
        check_address("receiver", &request.receiver)?;
        check_address("userAddress", &request.user_address)?;

        let message = self.builder().withdraw(request)?;
        self.submit_signed(
            OperationKind::Withdraw,
            "/v1/withdraw_request",
            message,
            &request.user_address,
            Payload::new(),
        )
        .await
    }
}
