//! In-memory cart with quantity merging.
//!
//! The cart holds at most one line per product code. It is owned by a single
//! consumer and mutated serially, so it carries no synchronization.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Product, ProductCode};

/// A product and how many units of it are in the cart.
///
/// The quantity is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    product: Product,
    quantity: u32,
}

impl CartItem {
    /// Create a line holding a single unit.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// Create a line with an explicit quantity.
    ///
    /// Returns `None` for a zero quantity.
    #[must_use]
    pub fn with_quantity(product: Product, quantity: u32) -> Option<Self> {
        if quantity == 0 {
            return None;
        }
        Some(Self { product, quantity })
    }

    /// The product on this line.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Number of units on this line.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Undiscounted cost of the line, or `None` if it overflows.
    #[must_use]
    pub fn full_price(&self) -> Option<Decimal> {
        self.product.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// The user's in-progress selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add one unit of `product`, merging with an existing line of the same code.
    pub fn add(&mut self, product: &Product) {
        if let Some(item) = self.find_mut(&product.code) {
            item.quantity = item.quantity.saturating_add(1);
        } else {
            self.items.push(CartItem::new(product.clone()));
        }
    }

    /// Remove one unit of `product`, dropping the line when it reaches zero.
    ///
    /// Returns `false` if no line with that code was in the cart.
    pub fn remove(&mut self, product: &Product) -> bool {
        let Some(index) = self.position(&product.code) else {
            return false;
        };

        if let Some(item) = self.items.get_mut(index).filter(|item| item.quantity > 1) {
            item.quantity -= 1;
        } else {
            self.items.remove(index);
        }
        true
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of the line with the given code (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, code: &str) -> u32 {
        self.items
            .iter()
            .find(|item| item.product.code.as_str() == code)
            .map_or(0, CartItem::quantity)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Quantities for a fixed set of tracked codes.
    ///
    /// Every tracked code appears in the result (zero when absent from the
    /// cart). Lines whose code is not tracked are ignored.
    #[must_use]
    pub fn count_by_code(&self, tracked: &[ProductCode]) -> BTreeMap<ProductCode, u32> {
        tracked
            .iter()
            .map(|code| (code.clone(), self.quantity_of(code.as_str())))
            .collect()
    }

    /// Quantities for every code present in the cart.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<ProductCode, u32> {
        self.items
            .iter()
            .map(|item| (item.product.code.clone(), item.quantity))
            .collect()
    }

    /// Undiscounted total of the cart, or `None` if it overflows.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.full_price()?))
    }

    fn position(&self, code: &ProductCode) -> Option<usize> {
        self.items.iter().position(|item| &item.product.code == code)
    }

    fn find_mut(&mut self, code: &ProductCode) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| &item.product.code == code)
    }
}
