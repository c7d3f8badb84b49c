//! Remote catalog sources.
//!
//! The repository only sees the two source traits; [`HttpCatalogClient`]
//! implements both against JSON endpoints.

mod http;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use shopcart_core::{DiscountConfig, ProductCode};

use crate::error::CatalogError;

pub use http::HttpCatalogClient;

/// Product catalog as served by the products endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductsPayload {
    pub products: Vec<ProductPayload>,
}

/// A single product before it has been assigned a storage id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub code: ProductCode,
    pub name: String,
    /// Unit price; negative prices fail the whole payload.
    #[serde(deserialize_with = "non_negative_price")]
    pub price: Decimal,
}

fn non_negative_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let price = <Decimal as Deserialize>::deserialize(deserializer)?;
    if price < Decimal::ZERO {
        return Err(de::Error::custom(format!("negative price: {price}")));
    }
    Ok(price)
}

/// Source of the product catalog.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetch the full product list.
    async fn fetch_products(&self) -> Result<ProductsPayload, CatalogError>;
}

/// Source of the discount rule table.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DiscountSource: Send + Sync {
    /// Fetch the full discount table.
    async fn fetch_discount_rules(&self) -> Result<DiscountConfig, CatalogError>;
}
