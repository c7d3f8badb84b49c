//! Catalog product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ProductCode, ProductId};

/// A product as shown in the catalog and added to carts.
///
/// Products are immutable once constructed; a catalog refresh replaces them
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Storage identity assigned when the catalog was persisted.
    pub id: ProductId,
    /// Business key used for cart merging and discount lookup.
    pub code: ProductCode,
    /// Display name (e.g., "Cabify Coffee Mug").
    pub name: String,
    /// Unit price in the store currency.
    pub price: Decimal,
}

impl Product {
    /// Create a new product.
    #[must_use]
    pub fn new(id: ProductId, code: ProductCode, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            code,
            name: name.into(),
            price,
        }
    }
}
