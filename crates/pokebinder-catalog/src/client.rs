//! HTTP client for the card catalog REST API.
//!
//! Three endpoints are consumed, all relative to a category base URL such as
//! `https://tcgcsv.com/tcgplayer/3`:
//!
//! - `GET {base}/groups`
//! - `GET {base}/{groupId}/products`
//! - `GET {base}/{groupId}/prices`
//!
//! Every call goes through [`retry_with_backoff`] with the client's
//! [`RetryPolicy`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use pokebinder_core::{AppConfig, Group, PriceEntry, Product};

use crate::error::CatalogError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::ResultsEnvelope;

/// Client for the catalog API.
///
/// Use [`CatalogClient::new`] with an explicit base URL (production or a
/// wiremock server) or [`CatalogClient::from_config`] for the CLI.
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    policy: RetryPolicy,
}

impl CatalogClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        policy: RetryPolicy,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so relative joins append to the path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            policy,
        })
    }

    /// Builds a client from the catalog settings in [`AppConfig`], with the
    /// retry policy chosen by [`RetryPolicy::from_config`].
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        Self::new(
            &config.catalog_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            RetryPolicy::from_config(config),
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Lists every product group (card set) in the category.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::UnexpectedStatus`] or [`CatalogError::Http`] once
    ///   retries are exhausted.
    /// - [`CatalogError::Deserialize`] if the body is not a results envelope
    ///   of groups.
    pub async fn fetch_groups(&self) -> Result<Vec<Group>, CatalogError> {
        let url = self.endpoint("groups")?;
        self.fetch_results(&url).await
    }

    /// Lists the products of one group.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::fetch_groups`].
    pub async fn fetch_products(&self, group_id: u64) -> Result<Vec<Product>, CatalogError> {
        let url = self.endpoint(&format!("{group_id}/products"))?;
        self.fetch_results(&url).await
    }

    /// Lists the price entries of one group.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::fetch_groups`].
    pub async fn fetch_prices(&self, group_id: u64) -> Result<Vec<PriceEntry>, CatalogError> {
        let url = self.endpoint(&format!("{group_id}/prices"))?;
        self.fetch_results(&url).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    async fn fetch_results<T: DeserializeOwned>(&self, url: &Url) -> Result<Vec<T>, CatalogError> {
        retry_with_backoff(self.policy, || async move {
            let body = self.request_text(url).await?;
            let envelope: ResultsEnvelope<T> =
                serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
                    context: url.to_string(),
                    source: e,
                })?;
            Ok(envelope.results)
        })
        .await
    }

    /// Sends a GET request and returns the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnexpectedStatus`] for any non-2xx status and
    /// [`CatalogError::Http`] on network failure.
    async fn request_text(&self, url: &Url) -> Result<String, CatalogError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}
