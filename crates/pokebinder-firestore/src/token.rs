//! OAuth access tokens for the Firestore REST API.
//!
//! [`ServiceAccountTokenSource`] implements the two-legged JWT bearer flow:
//! sign an RS256 assertion with the service account's private key, exchange
//! it at `token_uri`, and reuse the returned access token until shortly
//! before it expires. [`StaticToken`] hands out a fixed string, which is what
//! the Firestore emulator expects (`"owner"`).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::credentials::ServiceAccountKey;
use crate::error::FirestoreError;

pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token's stated expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Supplies a bearer token for each Firestore request.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a token valid for at least the next request.
    ///
    /// # Errors
    ///
    /// Returns a [`FirestoreError`] when no token can be obtained.
    async fn access_token(&self) -> Result<String, FirestoreError>;
}

/// A fixed bearer token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, FirestoreError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Access tokens minted from a service-account key, cached until near expiry.
pub struct ServiceAccountTokenSource {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    /// # Errors
    ///
    /// Returns [`FirestoreError::Jwt`] if the key's `private_key` is not an
    /// RSA PEM, or [`FirestoreError::Http`] if the HTTP client cannot be built.
    pub fn new(key: ServiceAccountKey, timeout_secs: u64) -> Result<Self, FirestoreError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// Signs the RS256 assertion exchanged for an access token.
    pub(crate) fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, FirestoreError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key.private_key_id);
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: DATASTORE_SCOPE.to_owned(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken, FirestoreError> {
        let assertion = self.sign_assertion(now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FirestoreError::TokenExchange {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| FirestoreError::Deserialize {
                context: self.key.token_uri.clone(),
                source: e,
            })?;
        let Some(expires_at) = TimeDelta::try_seconds(token.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
        else {
            return Err(FirestoreError::TokenExchange {
                status: status.as_u16(),
                body: format!("expires_in out of range: {}", token.expires_in),
            });
        };
        tracing::debug!(expires_in = token.expires_in, "obtained Firestore access token");

        Ok(CachedToken {
            value: token.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, FirestoreError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - TimeDelta::seconds(EXPIRY_MARGIN_SECS) > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}
