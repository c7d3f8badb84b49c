//! Command implementations.

pub mod checkout;
pub mod discounts;
pub mod products;

use std::sync::Arc;

use shopcart_catalog::files::{BundledResources, LocalFileCache};
use shopcart_catalog::remote::HttpCatalogClient;
use shopcart_catalog::store::{JsonFileProductStore, StoreError};
use shopcart_catalog::{CatalogConfig, CatalogError, ProductRepository};
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Could not load products: {0}")]
    Products(String),

    #[error("Unknown product code: {0}")]
    UnknownProduct(String),

    #[error("Cart total is too large to compute")]
    Overflow,

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Wire the repository to the configured endpoints and cache directory.
pub async fn build_repository(config: &CatalogConfig) -> Result<ProductRepository, CommandError> {
    let client = Arc::new(HttpCatalogClient::from_config(config)?);
    let store = JsonFileProductStore::open(config.products_path()).await?;

    Ok(ProductRepository::new(
        client.clone(),
        client,
        Arc::new(store),
        Arc::new(LocalFileCache::new(&config.cache_dir)),
        Arc::new(BundledResources),
    )
    .with_freshness(config.freshness))
}
