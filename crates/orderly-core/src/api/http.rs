//! HTTP transport for the Orderly REST API.
//!
//! Public requests are sent as-is. Keyed requests carry the Orderly key
//! envelope: an ed25519 signature over
//! `{timestamp}{METHOD}{path[?query]}{body}` plus the account id and public
//! key headers.

use std::time::Duration;

use async_trait::async_trait;
use auth::OrderlyKeyPair;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::signing::current_timestamp_ms;
use crate::types::Payload;
use crate::{Error, Result};

pub const HEADER_TIMESTAMP: &str = "orderly-timestamp";
pub const HEADER_ACCOUNT_ID: &str = "orderly-account-id";
pub const HEADER_KEY: &str = "orderly-key";
pub const HEADER_SIGNATURE: &str = "orderly-signature";

/// Upper bound on GET attempts, whatever the configuration asks for.
pub const MAX_RETRY_LIMIT: u32 = 10;

/// Sends payloads to the API and returns the parsed response body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Unauthenticated request.
    async fn public_request(&self, method: Method, path: &str, payload: Payload) -> Result<Value>;

    /// Request authenticated with the Orderly key envelope.
    async fn signed_request(&self, method: Method, path: &str, payload: Payload) -> Result<Value>;
}

/// Account id and ed25519 key used for keyed requests.
#[derive(Debug, Clone)]
pub struct OrderlyKeyCredentials {
    pub account_id: String,
    pub key: OrderlyKeyPair,
}

/// [`Dispatcher`] over `reqwest`.
pub struct HttpDispatcher {
    base_url: String,
    http_client: reqwest::Client,
    max_retries: u32,
    credentials: Option<OrderlyKeyCredentials>,
}

impl HttpDispatcher {
    /// Create a dispatcher without Orderly key credentials.
    #[allow(clippy::result_large_err)]
    pub fn new(base_url: impl Into<String>, timeout: Duration, max_retries: u32) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            max_retries: max_retries.clamp(1, MAX_RETRY_LIMIT),
            credentials: None,
        })
    }

    /// Attach Orderly key credentials for keyed requests.
    pub fn with_credentials(mut self, account_id: impl Into<String>, key: OrderlyKeyPair) -> Self {
        self.credentials = Some(OrderlyKeyCredentials {
            account_id: account_id.into(),
            key,
        });
        self
    }

    /// Build a dispatcher from client configuration.
    ///
    /// Credentials are attached only when an Orderly secret is configured,
    /// in which case the account id is required too.
    #[allow(clippy::result_large_err)]
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let dispatcher = Self::new(
            config.resolved_base_url(),
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )?;

        match config.orderly_secret.as_deref() {
            Some(secret) => {
                let account_id = config.require_account_id()?;
                let key = OrderlyKeyPair::from_secret(secret).map_err(|e| Error::Auth {
                    message: format!("{:#}", e),
                })?;
                Ok(dispatcher.with_credentials(account_id, key))
            }
            None => Ok(dispatcher),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Attach the Orderly key headers to `request`.
    #[allow(clippy::result_large_err)]
    fn authenticate(
        &self,
        request: RequestBuilder,
        method: &Method,
        target: &str,
        body: Option<&str>,
    ) -> Result<RequestBuilder> {
        let credentials = self.credentials.as_ref().ok_or_else(|| Error::Auth {
            message: "Orderly key credentials not set".to_string(),
        })?;

        let timestamp = current_timestamp_ms().to_string();
        let message = signing_message(&timestamp, method, target, body);
        let signature = credentials.key.sign_base64(message.as_bytes());

        Ok(request
            .header(HEADER_TIMESTAMP, &timestamp)
            .header(HEADER_ACCOUNT_ID, &credentials.account_id)
            .header(HEADER_KEY, credentials.key.public_key())
            .header(HEADER_SIGNATURE, signature))
    }

    /// Execute a request, retrying GETs on 429 and 5xx with exponential backoff.
    ///
    /// Keyed requests are re-signed on every attempt so the timestamp stays
    /// fresh.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: &Payload,
        keyed: bool,
    ) -> Result<Value> {
        let (target, body) = request_target(&method, path, payload)?;
        let url = format!("{}{}", self.base_url, target);
        let attempts = if method == Method::GET {
            self.max_retries
        } else {
            1
        };

        debug!(method = %method, target = %target, keyed, "Dispatching request");

        let mut last_error = None;

        for attempt in 0..attempts {
            let mut request = self
                .http_client
                .request(method.clone(), &url)
                .header(CONTENT_TYPE, content_type(&method));
            if keyed {
                request = self.authenticate(request, &method, &target, body.as_deref())?;
            }
            if let Some(body) = &body {
                request = request.body(body.clone());
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let is_rate_limited = status.as_u16() == 429;
                    if (is_rate_limited || status.is_server_error()) && attempt + 1 < attempts {
                        warn!(
                            attempt = attempt + 1,
                            status = %status,
                            url = %url,
                            rate_limited = is_rate_limited,
                            "Retryable API error, backing off"
                        );
                        tokio::time::sleep(backoff(attempt, is_rate_limited)).await;
                        continue;
                    }

                    let text = response.text().await?;
                    return parse_response(status.as_u16(), &text);
                }
                Err(e) => {
                    warn!(
                        attempt = attempt + 1,
                        error = %e,
                        url = %url,
                        "HTTP request failed, backing off"
                    );
                    last_error = Some(Error::Http(e));
                }
            }

            if attempt + 1 < attempts {
                tokio::time::sleep(backoff(attempt, false)).await;
            }
        }

        Err(last_error.unwrap_or(Error::Api {
            status: 0,
            body: "Max retries exceeded".to_string(),
        }))
    }
}

impl std::fmt::Debug for HttpDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDispatcher")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field(
                "account_id",
                &self.credentials.as_ref().map(|c| c.account_id.as_str()),
            )
            .finish()
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn public_request(&self, method: Method, path: &str, payload: Payload) -> Result<Value> {
        self.execute(method, path, &payload, false).await
    }

    async fn signed_request(&self, method: Method, path: &str, payload: Payload) -> Result<Value> {
        self.execute(method, path, &payload, true).await
    }
}

/// 2s, 4s, 8s for rate limits; 500ms, 1s, 2s otherwise.
fn backoff(attempt: u32, rate_limited: bool) -> Duration {
    let base: u64 = if rate_limited { 2000 } else { 500 };
    Duration::from_millis(base.saturating_mul(2u64.saturating_pow(attempt)))
}

/// Whether a method sends its payload as a JSON body.
fn has_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT
}

pub fn content_type(method: &Method) -> &'static str {
    if has_body(method) {
        "application/json"
    } else {
        "application/x-www-form-urlencoded"
    }
}

/// Form-encode a payload as a query string. Null values are dropped.
pub fn encode_query(payload: &Payload) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in payload {
        match value {
            Value::Null => continue,
            Value::String(s) => serializer.append_pair(key, s),
            other => serializer.append_pair(key, &other.to_string()),
        };
    }
    serializer.finish()
}

/// Split a request into its signed target (`path[?query]`) and optional body.
#[allow(clippy::result_large_err)]
pub fn request_target(
    method: &Method,
    path: &str,
    payload: &Payload,
) -> Result<(String, Option<String>)> {
    if has_body(method) {
        let body: Payload = payload
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        return Ok((path.to_string(), Some(serde_json::to_string(&body)?)));
    }

    let query = encode_query(payload);
    if query.is_empty() {
        Ok((path.to_string(), None))
    } else {
        Ok((format!("{}?{}", path, query), None))
    }
}

/// The string an Orderly key signs.
pub fn signing_message(timestamp: &str, method: &Method, target: &str, body: Option<&str>) -> String {
    format!(
        "{}{}{}{}",
        timestamp,
        method.as_str(),
        target,
        body.unwrap_or_default()
    )
}

/// Map a response to its JSON body, or to `Error::Api` for non-2xx statuses
/// and `success: false` bodies.
#[allow(clippy::result_large_err)]
pub fn parse_response(status: u16, text: &str) -> Result<Value> {
    if !(200..300).contains(&status) {
        return Err(Error::Api {
            status,
            body: text.to_string(),
        });
    }

    let value: Value = serde_json::from_str(text)?;
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(Error::Api {
            status,
            body: text.to_string(),
        });
    }
    Ok(value)
}
