//! Firestore REST client for whole-document writes.
//!
//! A document is written with `PATCH .../documents/{collection}/{id}` and no
//! `updateMask`. Firestore treats that as create-or-replace, so the stored
//! document ends up exactly equal to the request body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::json;

use crate::credentials::ServiceAccountKey;
use crate::error::FirestoreError;
use crate::store::{Document, DocumentStore};
use crate::token::{ServiceAccountTokenSource, StaticToken, TokenSource};
use crate::value::encode_fields;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_DATABASE: &str = "(default)";

/// Writes documents into one Firestore project's default database.
pub struct FirestoreClient {
    client: Client,
    base_url: Url,
    project_id: String,
    tokens: Box<dyn TokenSource>,
}

impl FirestoreClient {
    /// Creates a client against `base_url` (for example the emulator's
    /// `http://localhost:8080/v1`) that authenticates through `tokens`.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreError::Http`] if the HTTP client cannot be built or
    /// [`FirestoreError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        project_id: &str,
        timeout_secs: u64,
        tokens: Box<dyn TokenSource>,
    ) -> Result<Self, FirestoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            FirestoreError::InvalidUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            client,
            base_url,
            project_id: project_id.to_owned(),
            tokens,
        })
    }

    /// Builds a production client from a service-account key.
    ///
    /// When `base_url_override` is set the client targets that root instead
    /// and authenticates with the emulator's static `owner` token.
    ///
    /// # Errors
    ///
    /// Same as [`FirestoreClient::new`], plus [`FirestoreError::Jwt`] for an
    /// unusable private key.
    pub fn from_service_account(
        key: ServiceAccountKey,
        base_url_override: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, FirestoreError> {
        let project_id = key.project_id.clone();
        match base_url_override {
            Some(base_url) => Self::new(
                base_url,
                &project_id,
                timeout_secs,
                Box::new(StaticToken("owner".to_owned())),
            ),
            None => {
                let tokens = ServiceAccountTokenSource::new(key, timeout_secs)?;
                Self::new(
                    DEFAULT_BASE_URL,
                    &project_id,
                    timeout_secs,
                    Box::new(tokens),
                )
            }
        }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Full REST URL of one document.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreError::InvalidUrl`] if the base URL cannot carry a path.
    pub fn document_url(&self, collection: &str, document_id: &str) -> Result<Url, FirestoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FirestoreError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "base URL cannot have path segments".to_owned(),
            })?
            .pop_if_empty()
            .extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                DEFAULT_DATABASE,
                "documents",
                collection,
                document_id,
            ]);
        Ok(url)
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn upsert(
        &self,
        collection: &str,
        document_id: &str,
        document: &Document,
    ) -> Result<(), FirestoreError> {
        let url = self.document_url(collection, document_id)?;
        let token = self.tokens.access_token().await?;
        let body = json!({ "fields": encode_fields(document) });

        let response = self
            .client
            .patch(url.clone())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FirestoreError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        tracing::trace!(%collection, %document_id, "document upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> FirestoreClient {
        FirestoreClient::new(
            base_url,
            "pokebinder-test",
            5,
            Box::new(StaticToken("owner".to_owned())),
        )
        .expect("client construction should not fail")
    }

    #[test]
    fn document_url_includes_project_database_and_collection() {
        let client = test_client(DEFAULT_BASE_URL);
        let url = client.document_url("cards", "42382").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/pokebinder-test/databases/(default)/documents/cards/42382"
        );
    }

    #[test]
    fn document_url_tolerates_trailing_slash() {
        let client = test_client("http://localhost:8080/v1/");
        let url = client.document_url("cards", "1").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1/projects/pokebinder-test/databases/(default)/documents/cards/1"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = FirestoreClient::new(
            "::not a url::",
            "p",
            5,
            Box::new(StaticToken("owner".to_owned())),
        );
        assert!(matches!(result, Err(FirestoreError::InvalidUrl { .. })));
    }
}
