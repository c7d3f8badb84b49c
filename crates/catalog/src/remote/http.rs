//! HTTP client for the product and discount endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use shopcart_core::DiscountConfig;
use tracing::instrument;
use url::Url;

use crate::config::CatalogConfig;
use crate::error::CatalogError;

use super::{DiscountSource, ProductSource, ProductsPayload};

/// Characters of a response body kept in logs.
const LOGGED_BODY_CHARS: usize = 500;
/// Characters of a response body kept in error messages.
const ERROR_BODY_CHARS: usize = 200;

/// Client for the JSON catalog endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpCatalogClient {
    inner: Arc<HttpCatalogClientInner>,
}

struct HttpCatalogClientInner {
    client: reqwest::Client,
    products_url: Url,
    discounts_url: Url,
}

impl HttpCatalogClient {
    /// Create a client for the given endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (e.g. the TLS
    /// backend fails to initialize).
    pub fn new(
        products_url: Url,
        discounts_url: Url,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpCatalogClientInner {
                client,
                products_url,
                discounts_url,
            }),
        })
    }

    /// Create a client from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Self::new(
            config.products_url.clone(),
            config.discounts_url.clone(),
            config.request_timeout,
        )
    }

    /// GET `url` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, CatalogError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %truncate(&body, LOGGED_BODY_CHARS),
                "Catalog endpoint returned non-success status"
            );
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            } else {
                truncate(&body, ERROR_BODY_CHARS)
            };
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %truncate(&body, LOGGED_BODY_CHARS),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }
}

#[async_trait]
impl ProductSource for HttpCatalogClient {
    #[instrument(skip(self), fields(url = %self.inner.products_url))]
    async fn fetch_products(&self) -> Result<ProductsPayload, CatalogError> {
        let payload: ProductsPayload = self.get_json(&self.inner.products_url).await?;
        tracing::debug!(count = payload.products.len(), "Fetched products");
        Ok(payload)
    }
}

#[async_trait]
impl DiscountSource for HttpCatalogClient {
    #[instrument(skip(self), fields(url = %self.inner.discounts_url))]
    async fn fetch_discount_rules(&self) -> Result<DiscountConfig, CatalogError> {
        let config: DiscountConfig = self.get_json(&self.inner.discounts_url).await?;
        tracing::debug!(count = config.len(), "Fetched discount rules");
        Ok(config)
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
