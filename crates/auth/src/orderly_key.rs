//! Orderly access keys.
//!
//! An Orderly key is an ed25519 key pair registered against an account via
//! the wallet-signed `AddOrderlyKey` flow. Private API calls are then
//! authenticated with the key alone, without touching the wallet.
//!
//! Keys are exchanged as `ed25519:<base58>` strings: the secret carries the
//! 32-byte seed, the public form carries the 32-byte verifying key.

use anyhow::{bail, Context, Result};
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Prefix used by Orderly for ed25519 key strings.
pub const KEY_PREFIX: &str = "ed25519:";

/// Environment variable holding the Orderly key secret.
pub const ORDERLY_SECRET_ENV: &str = "ORDERLY_SECRET";

/// An ed25519 Orderly key pair.
#[derive(Clone)]
pub struct OrderlyKeyPair {
    signing_key: SigningKey,
}

impl OrderlyKeyPair {
    /// Generate a fresh key pair, ready to be registered with `add_orderly_key`.
    pub fn generate() -> Self {
        let seed: [u8; 32] = rand::random();
        let key = Self {
            signing_key: SigningKey::from_bytes(&seed),
        };
        tracing::debug!(public_key = %key.public_key(), "Generated Orderly key pair");
        key
    }

    /// Load from the `ORDERLY_SECRET` environment variable.
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var(ORDERLY_SECRET_ENV)
            .with_context(|| format!("{ORDERLY_SECRET_ENV} environment variable not set"))?;
        Self::from_secret(&secret)
    }

    /// Parse an `ed25519:<base58 seed>` secret. The prefix is optional.
    pub fn from_secret(secret: &str) -> Result<Self> {
        let encoded = secret.trim();
        let encoded = encoded.strip_prefix(KEY_PREFIX).unwrap_or(encoded);

        let bytes = bs58::decode(encoded)
            .into_vec()
            .context("Orderly secret is not valid base58")?;

        let seed: [u8; 32] = match bytes.as_slice().try_into() {
            Ok(seed) => seed,
            Err(_) => bail!(
                "Orderly secret must decode to 32 bytes, got {}",
                bytes.len()
            ),
        };

        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// Public key in Orderly's `ed25519:<base58>` form (the `orderly-key` header).
    pub fn public_key(&self) -> String {
        format!(
            "{}{}",
            KEY_PREFIX,
            bs58::encode(self.signing_key.verifying_key().as_bytes()).into_string()
        )
    }

    /// Secret in Orderly's `ed25519:<base58>` form, for persisting a generated key.
    pub fn secret(&self) -> String {
        format!(
            "{}{}",
            KEY_PREFIX,
            bs58::encode(self.signing_key.to_bytes()).into_string()
        )
    }

    /// Sign `message` and return the signature as URL-safe base64.
    pub fn sign_base64(&self, message: &[u8]) -> String {
        let signature = self.signing_key.sign(message);
        base64::engine::general_purpose::URL_SAFE.encode(signature.to_bytes())
    }

    /// Verifying half of the key pair.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

/// Verify a URL-safe base64 signature produced by [`OrderlyKeyPair::sign_base64`].
pub fn verify_base64(public_key: &str, message: &[u8], signature: &str) -> Result<()> {
    let encoded = public_key.strip_prefix(KEY_PREFIX).unwrap_or(public_key);
    let key_bytes = bs58::decode(encoded)
        .into_vec()
        .context("Orderly public key is not valid base58")?;
    let key_bytes: [u8; 32] = match key_bytes.as_slice().try_into() {
        Ok(bytes) => bytes,
        Err(_) => bail!("Orderly public key must decode to 32 bytes"),
    };
    let verifying_key =
        VerifyingKey::from_bytes(&key_bytes).context("Invalid ed25519 public key")?;

    let sig_bytes = base64::engine::general_purpose::URL_SAFE
        .decode(signature)
        .context("Signature is not valid URL-safe base64")?;
    let signature = ed25519_dalek::Signature::from_slice(&sig_bytes)
        .context("Signature must be 64 bytes")?;

    verifying_key
        .verify(message, &signature)
        .context("Signature does not match message")
}

impl std::fmt::Debug for OrderlyKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderlyKeyPair")
            .field("public_key", &self.public_key())
            .finish()
    }
}
