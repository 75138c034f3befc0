//! Catalog API client
//!
//! Pulls the merchant's item collection page by page. A refresh cycle either
//! returns every page or fails as a whole; nothing partial leaves this module.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::models::{Page, RawItem};

/// Errors that abort a catalog fetch cycle
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request did not complete within the configured timeout
    #[error("request to {0} timed out")]
    Timeout(String),

    /// Connection, TLS or body transfer failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("catalog API returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    /// The response body was not the JSON we expected
    #[error("failed to parse catalog response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Every page came back full up to the page cap
    #[error("catalog still had items after {0} pages")]
    TooManyPages(usize),
}

/// Connection settings for the catalog API
#[derive(Clone)]
pub struct CatalogSettings {
    pub base_url: String,
    pub merchant_id: String,
    pub token: String,
    pub page_limit: usize,
    pub max_pages: usize,
    pub timeout: Duration,
}

/// Client for the merchant catalog endpoints
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    settings: CatalogSettings,
}

impl CatalogClient {
    /// Builds a client whose every request carries the configured timeout.
    pub fn new(settings: CatalogSettings) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn merchant_id(&self) -> &str {
        &self.settings.merchant_id
    }

    fn merchant_url(&self, resource: &str) -> String {
        format!(
            "{}/v3/merchants/{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.merchant_id,
            resource
        )
    }

    /// Issues one authenticated GET and decodes the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.settings.token)
            .query(query)
            .send()
            .await
            .map_err(|e| classify(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status,
                url: url.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| classify(e, url))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetches the full item collection.
    ///
    /// Page `n` is requested at `offset = n * limit`; the loop ends on the
    /// first empty or short page. With `expand_categories` each item carries
    /// its expanded category references.
    pub async fn fetch_items(&self, expand_categories: bool) -> Result<Vec<RawItem>, CatalogError> {
        let url = self.merchant_url("items");
        let limit = self.settings.page_limit.max(1);
        let mut all_items = Vec::new();

        for page in 0..self.settings.max_pages {
            let offset = page * limit;
            let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
            if expand_categories {
                query.push(("expand", "categories".to_string()));
            }

            debug!(page = page + 1, offset, limit, "requesting catalog page");
            let body: Page<RawItem> = self.get_json(&url, &query).await?;
            let received = body.elements.len();

            if received == 0 {
                debug!("no more items");
                return Ok(all_items);
            }

            all_items.extend(body.elements);
            info!(
                page = page + 1,
                received,
                total = all_items.len(),
                "fetched catalog page"
            );

            if received < limit {
                return Ok(all_items);
            }
        }

        Err(CatalogError::TooManyPages(self.settings.max_pages))
    }

    /// Raw category listing, for diagnostics.
    pub async fn fetch_categories(&self) -> Result<Value, CatalogError> {
        self.get_json(&self.merchant_url("categories"), &[]).await
    }

    /// First `limit` items with categories expanded, for diagnostics.
    pub async fn fetch_sample_items(&self, limit: usize) -> Result<Value, CatalogError> {
        let query = [("limit", limit.to_string()), ("expand", "categories".to_string())];
        self.get_json(&self.merchant_url("items"), &query).await
    }
}

fn classify(err: reqwest::Error, url: &str) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Timeout(url.to_string())
    } else {
        CatalogError::Request(err)
    }
}
