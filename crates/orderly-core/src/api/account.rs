//! Account and Orderly key endpoints.

use reqwest::Method;
use serde_json::{json, Value};
use tracing::info;

use super::client::OrderlyClient;
use crate::signing::OperationKind;
use crate::types::{
    payload_of, AddOrderlyKeyRequest, IpRestrictionResetMode, KeyStatus, Payload,
    RegistrationRequest,
};
use crate::validation::{
    check_address, check_date_range, check_required, parse_enum, parse_optional_enum,
};
use crate::Result;

/// Longest span accepted by the daily volume endpoint.
pub const DAILY_VOLUME_MAX_DAYS: i64 = 90;

impl OrderlyClient {
    /// `GET /v1/registration_nonce`. Nonces are single-use and valid for 2 minutes.
    pub async fn get_registration_nonce(&self) -> Result<Value> {
        self.public(Method::GET, "/v1/registration_nonce", Payload::new())
            .await
    }

    /// `GET /v1/public/account`
    pub async fn get_account_details(&self, account_id: &str) -> Result<Value> {
        check_required(&[(&account_id, "account_id")])?;
        let payload = payload_of([("account_id", json!(account_id))]);
        self.public(Method::GET, "/v1/public/account", payload).await
    }

    /// `GET /v1/get_account`: whether `address` has an account with `broker_id`.
    pub async fn get_account(&self, address: &str, broker_id: &str) -> Result<Value> {
        check_required(&[(&address, "address"), (&broker_id, "broker_id")])?;
        let payload = payload_of([("address", json!(address)), ("broker_id", json!(broker_id))]);
        self.public(Method::GET, "/v1/get_account", payload).await
    }

    /// `GET /v1/get_broker`
    pub async fn get_broker(&self, address: &str) -> Result<Value> {
        check_required(&[(&address, "address")])?;
        let payload = payload_of([("address", json!(address))]);
        self.public(Method::GET, "/v1/get_broker", payload).await
    }

    /// Register an account: `POST /v1/register_account`.
    ///
    /// An account is unique per wallet address and broker id. The
    /// registration message is signed by the wallet and submitted without an
    /// Orderly key.
    pub async fn register_account(&self, request: &RegistrationRequest) -> Result<Value> {
        check_required(&[
            (&request.broker_id, "brokerId"),
            (&request.chain_id, "chainId"),
            (&request.registration_nonce, "registrationNonce"),
            (&request.user_address, "userAddress"),
        ])?;
        check_address("userAddress", &request.user_address)?;

        let message = self.builder().registration(request)?;
        self.submit_signed(
            OperationKind::Registration,
            "/v1/register_account",
            message,
            &request.user_address,
            Payload::new(),
        )
        .await
    }

    /// `GET /v1/get_orderly_key`: validity of an Orderly key on an account.
    pub async fn get_orderly_key(&self, account_id: &str, orderly_key: &str) -> Result<Value> {
        check_required(&[(&account_id, "account_id"), (&orderly_key, "orderly_key")])?;
        let payload = payload_of([
            ("account_id", json!(account_id)),
            ("orderly_key", json!(orderly_key)),
        ]);
        self.public(Method::GET, "/v1/get_orderly_key", payload).await
    }

    /// Add an Orderly key to an account: `POST /v1/orderly_key`.
    ///
    /// `extras` carries optional fields such as `tag`.
    pub async fn add_orderly_key(
        &self,
        request: &AddOrderlyKeyRequest,
        extras: Payload,
    ) -> Result<Value> {
        check_required(&[
            (&request.broker_id, "brokerId"),
            (&request.chain_id, "chainId"),
            (&request.orderly_key, "orderlyKey"),
            (&request.scope, "scope"),
            (&request.expiration, "expiration"),
            (&request.user_address, "userAddress"),
        ])?;
        check_address("userAddress", &request.user_address)?;

        let message = self.builder().add_orderly_key(request)?;
        self.submit_signed(
            OperationKind::AddOrderlyKey,
            "/v1/orderly_key",
            message,
            &request.user_address,
            extras,
        )
        .await
    }

    /// `POST /v1/client/remove_orderly_key`
    pub async fn remove_orderly_key(&self, orderly_key: &str) -> Result<Value> {
        check_required(&[(&orderly_key, "orderly_key")])?;
        let payload = payload_of([("orderly_key", json!(orderly_key))]);
        let response = self
            .keyed(Method::POST, "/v1/client/remove_orderly_key", payload)
            .await?;
        info!(orderly_key, "Orderly key removed");
        Ok(response)
    }

    /// `POST /v1/client/leverage`. Accepted values are set by the exchange
    /// (currently 1, 2, 3, 4, 5 and 10).
    pub async fn update_leverage_configuration(&self, leverage: u32) -> Result<Value> {
        check_required(&[(&leverage, "leverage")])?;
        let payload = payload_of([("leverage", json!(leverage))]);
        self.keyed(Method::POST, "/v1/client/leverage", payload).await
    }

    /// `GET /v1/client/holding`. With `all`, empty balances are included.
    pub async fn get_current_holdings(&self, all: Option<bool>) -> Result<Value> {
        let payload = payload_of([("all", json!(all))]);
        self.keyed(Method::GET, "/v1/client/holding", payload).await
    }

    /// `GET /v1/client/info`: account information including fee rates.
    pub async fn get_account_information(&self) -> Result<Value> {
        self.keyed(Method::GET, "/v1/client/info", Payload::new())
            .await
    }

    /// `POST /v1/client/maintenance_config`: whether pending orders are
    /// cancelled during maintenance.
    pub async fn set_maintenance_config(&self, maintenance_cancel_order_flag: bool) -> Result<Value> {
        let payload = payload_of([(
            "maintenance_cancel_order_flag",
            json!(maintenance_cancel_order_flag),
        )]);
        self.keyed(Method::POST, "/v1/client/maintenance_config", payload)
            .await
    }

    /// `GET /v1/client/statistics/daily`. Dates are `YYYY-MM-DD`.
    pub async fn get_user_daily_statistics(
        &self,
        start_date: &str,
        end_date: &str,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<Value> {
        check_required(&[(&start_date, "start_date"), (&end_date, "end_date")])?;
        check_date_range(start_date, end_date, None)?;

        let payload = payload_of([
            ("start_date", json!(start_date)),
            ("end_date", json!(end_date)),
            ("page", json!(page)),
            ("size", json!(size)),
        ]);
        self.keyed(Method::GET, "/v1/client/statistics/daily", payload)
            .await
    }

    /// `GET /v1/volume/user/daily`. The range may span at most 90 days.
    pub async fn get_user_daily_volume(&self, start_date: &str, end_date: &str) -> Result<Value> {
        check_required(&[(&start_date, "start_date"), (&end_date, "end_date")])?;
        check_date_range(start_date, end_date, Some(DAILY_VOLUME_MAX_DAYS))?;

        let payload = payload_of([
            ("start_date", json!(start_date)),
            ("end_date", json!(end_date)),
        ]);
        self.keyed(Method::GET, "/v1/volume/user/daily", payload)
            .await
    }

    /// `GET /v1/volume/user/stats`
    pub async fn get_user_volume_statistics(&self) -> Result<Value> {
        self.keyed(Method::GET, "/v1/volume/user/stats", Payload::new())
            .await
    }

    /// `GET /v1/client/key_info`, optionally filtered by `ACTIVE`, `REMOVING` or `REMOVED`.
    pub async fn get_current_orderly_key_info(&self, key_status: Option<&str>) -> Result<Value> {
        let key_status = parse_optional_enum::<KeyStatus>("key_status", key_status)?;
        let payload = payload_of([("key_status", json!(key_status))]);
        self.keyed(Method::GET, "/v1/client/key_info", payload).await
    }

    /// `GET /v1/client/orderly_key_ip_restriction`
    pub async fn get_orderly_key_ip_restriction(&self, orderly_key: &str) -> Result<Value> {
        check_required(&[(&orderly_key, "orderly_key")])?;
        let payload = payload_of([("orderly_key", json!(orderly_key))]);
        self.keyed(Method::GET, "/v1/client/orderly_key_ip_restriction", payload)
            .await
    }

    /// `POST /v1/client/set_orderly_key_ip_restriction`.
    ///
    /// `ip_restriction_list` is a comma-separated list of IPs or ranges
    /// allowed to use the key.
    pub async fn set_orderly_key_ip_restriction(
        &self,
        orderly_key: &str,
        ip_restriction_list: &str,
    ) -> Result<Value> {
        check_required(&[
            (&orderly_key, "orderly_key"),
            (&ip_restriction_list, "ip_restriction_list"),
        ])?;
        let payload = payload_of([
            ("orderly_key", json!(orderly_key)),
            ("ip_restriction_list", json!(ip_restriction_list)),
        ]);
        self.keyed(
            Method::POST,
            "/v1/client/set_orderly_key_ip_restriction",
            payload,
        )
        .await
    }

    /// `POST /v1/client/reset_orderly_key_ip_restriction` with
    /// `ALLOW_ALL_IPS` or `DISALLOW_ALL_IPS`.
    pub async fn reset_orderly_key_ip_restriction(
        &self,
        orderly_key: &str,
        reset_mode: &str,
    ) -> Result<Value> {
        check_required(&[(&orderly_key, "orderly_key"), (&reset_mode, "reset_mode")])?;
        let reset_mode = parse_enum::<IpRestrictionResetMode>("reset_mode", reset_mode)?;

        let payload = payload_of([
            ("orderly_key", json!(orderly_key)),
            ("reset_mode", json!(reset_mode)),
        ]);
        self.keyed(
            Method::POST,
            "/v1/client/reset_orderly_key_ip_restriction",
            payload,
        )
        .await
    }

    /// `GET /v1/position_history`
    pub async fn get_position_history(
        &self,
        symbol: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Value> {
        let payload = payload_of([("symbol", json!(symbol)), ("limit", json!(limit))]);
        self.keyed(Method::GET, "/v1/position_history", payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_support::*;
    use crate::api::http::MockDispatcher;
    use crate::signing::{NetworkMode, LEDGER_VERIFYING_CONTRACT};
    use crate::Error;
    use std::sync::{Arc, Mutex};

    fn registration() -> RegistrationRequest {
        RegistrationRequest {
            broker_id: "woofi_dex".to_string(),
            chain_id: 421614,
            registration_nonce: "194528949540".to_string(),
            user_address: USER.to_string(),
        }
    }

    fn add_key() -> AddOrderlyKeyRequest {
        AddOrderlyKeyRequest {
            broker_id: "woofi_dex".to_string(),
            chain_id: 421614,
            orderly_key: "ed25519:8tm7dnKYkSc3Xt8bM2SLyUfSs2cDxb3gLANQd1GxbvRs".to_string(),
            scope: "read,trading".to_string(),
            expiration: 1_800_000_000_000,
            user_address: USER.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_account_payload_matches_signed_message() {
        let (signer, signed) = recording_signer();
        let sent: Arc<Mutex<Vec<Payload>>> = Arc::default();
        let sent_clone = sent.clone();

        let mut dispatcher = MockDispatcher::new();
        dispatcher
            .expect_public_request()
            .withf(|method, path, _| *method == Method::POST && path == "/v1/register_account")
            .times(1)
            .returning(move |_, _, payload| {
                sent_clone.lock().unwrap().push(payload);
                ok()
            });
        dispatcher.expect_signed_request().never();

        let client = client(NetworkMode::Testnet, dispatcher, signer);
        client.register_account(&registration()).await.unwrap();

        let signed = signed.lock().unwrap();
        let sent = sent.lock().unwrap();
        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].domain.verifying_contract, LEDGER_VERIFYING_CONTRACT);
        assert_eq!(sent[0]["message"], Value::Object(signed[0].message.clone()));
        assert_eq!(sent[0]["signature"], "0xsignature");
        assert_eq!(sent[0]["userAddress"], USER);
    }

    #[tokio::test]
    async fn test_register_account_missing_nonce() {
        let mut request = registration();
        request.registration_nonce = String::new();

        let client = client(NetworkMode::Testnet, silent_dispatcher(), silent_signer());
        let err = client.register_account(&request).await.unwrap_err();

        assert!(matches!(
            err,
            Error::MissingParameter {
                field: "registrationNonce"
            }
        ));
    }

    #[tokio::test]
    async fn test_register_account_zero_chain_id() {
        let mut request = registration();
        request.chain_id = 0;

        let client = client(NetworkMode::Testnet, silent_dispatcher(), silent_signer());
        let err = client.register_account(&request).await.unwrap_err();
        assert!(matches!(err, Error::MissingParameter { field: "chainId" }));
    }

    #[tokio::test]
    async fn test_add_orderly_key_keeps_tag_and_fresh_timestamp() {
        let (signer, signed) = recording_signer();
        let sent: Arc<Mutex<Vec<Payload>>> = Arc::default();
        let sent_clone = sent.clone();

        let mut dispatcher = MockDispatcher::new();
        dispatcher
            .expect_public_request()
            .withf(|_, path, _| path == "/v1/orderly_key")
            .times(1)
            .returning(move |_, _, payload| {
                sent_clone.lock().unwrap().push(payload);
                ok()
            });

        let request = AddOrderlyKeyRequest {
            broker_id: "woofi_dex".to_string(),
            chain_id: 421614,
            orderly_key: auth::OrderlyKeyPair::generate().public_key(),
            scope: "read,trading".to_string(),
            expiration: 1_800_000_000_000,
            user_address: USER.to_string(),
        };
        let extras = payload_of([("tag", json!("manualAddedKey")), ("timestamp", json!(42))]);

        let client = client(NetworkMode::Testnet, dispatcher, signer);
        client.add_orderly_key(&request, extras).await.unwrap();

        let signed = signed.lock().unwrap();
        let sent = sent.lock().unwrap();
        let timestamp = signed[0].message["timestamp"].as_u64().unwrap();
        let now = crate::signing::current_timestamp_ms();
        assert!(now - timestamp < 5_000);
        assert_eq!(sent[0]["message"]["timestamp"], timestamp);
        assert_eq!(sent[0]["tag"], "manualAddedKey");
        assert!(!sent[0].contains_key("timestamp"));
    }

    #[tokio::test]
    async fn test_add_orderly_key_missing_scope() {
        let mut request = add_key();
        request.scope = String::new();

        let client = client(NetworkMode::Testnet, silent_dispatcher(), silent_signer());
        let err = client
            .add_orderly_key(&request, Payload::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingParameter { field: "scope" }));
    }

    #[tokio::test]
    async fn test_add_orderly_key_zero_expiration() {
        let mut request = add_key();
        request.expiration = 0;

        let client = client(NetworkMode::Testnet, silent_dispatcher(), silent_signer());
        let err = client
            .add_orderly_key(&request, Payload::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingParameter { field: "expiration" }));
    }

    #[tokio::test]
    async fn test_private_endpoints_use_keyed_path() {
        let mut dispatcher = MockDispatcher::new();
        dispatcher
            .expect_signed_request()
            .withf(|method, path, payload| {
                *method == Method::GET
                    && path == "/v1/client/holding"
                    && payload.get("all") == Some(&json!(true))
            })
            .times(1)
            .returning(|_, _, _| ok());
        dispatcher.expect_public_request().never();

        let client = client(NetworkMode::Testnet, dispatcher, silent_signer());
        client.get_current_holdings(Some(true)).await.unwrap();
    }

    #[tokio::test]
    async fn test_public_lookup_sends_query_payload() {
        let mut dispatcher = MockDispatcher::new();
        dispatcher
            .expect_public_request()
            .withf(|method, path, payload| {
                *method == Method::GET
                    && path == "/v1/get_account"
                    && payload["address"] == USER
                    && payload["broker_id"] == "woofi_dex"
            })
            .times(1)
            .returning(|_, _, _| ok());

        let client = client(NetworkMode::Testnet, dispatcher, silent_signer());
        client.get_account(USER, "woofi_dex").await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_orderly_key_requires_key() {
        let client = client(NetworkMode::Testnet, silent_dispatcher(), silent_signer());
        let err = client.remove_orderly_key("  ").await.unwrap_err();
        assert!(matches!(err, Error::MissingParameter { field: "orderly_key" }));
    }

    #[tokio::test]
    async fn test_reset_ip_restriction_validates_mode() {
        let client = client(NetworkMode::Testnet, silent_dispatcher(), silent_signer());
        let err = client
            .reset_orderly_key_ip_restriction("ed25519:key", "ALLOW_SOME_IPS")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEnumValue { field: "reset_mode", .. }));
    }

    #[tokio::test]
    async fn test_key_info_filter() {
        let mut dispatcher = MockDispatcher::new();
        dispatcher
            .expect_signed_request()
            .withf(|_, path, payload| path == "/v1/client/key_info" && payload["key_status"] == "ACTIVE")
            .times(1)
            .returning(|_, _, _| ok());

        let client = client(NetworkMode::Testnet, dispatcher, silent_signer());
        client.get_current_orderly_key_info(Some("ACTIVE")).await.unwrap();
        assert!(client.get_current_orderly_key_info(Some("active")).await.is_err());
    }

    #[tokio::test]
    async fn test_daily_volume_range_limit() {
        let client = client(NetworkMode::Testnet, silent_dispatcher(), silent_signer());
        let err = client
            .get_user_daily_volume("2024-01-01", "2024-06-01")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn test_maintenance_flag_false_is_sent() {
        let mut dispatcher = MockDispatcher::new();
        dispatcher
            .expect_signed_request()
            .withf(|method, _, payload| {
                *method == Method::POST && payload["maintenance_cancel_order_flag"] == false
            })
            .times(1)
            .returning(|_, _, _| ok());

        let client = client(NetworkMode::Testnet, dispatcher, silent_signer());
        client.set_maintenance_config(false).await.unwrap();
    }
}
