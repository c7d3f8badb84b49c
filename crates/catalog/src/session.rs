//! View state for a shopping session.
//!
//! [`ShopSession`] folds the repository streams into the state a front end
//! renders and owns the cart the user is building.

use std::pin::pin;

use futures::{Stream, StreamExt};
use rust_decimal::Decimal;
use shopcart_core::{
    Cart, CheckoutSummary, DiscountConfig, Product, ProductCode, Resource, calculate_total,
    summarize,
};

use crate::repository::ProductRepository;

const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// What the product list shows.
///
/// Each state replaces the previous one entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListState {
    pub is_loading: bool,
    pub products: Vec<Product>,
    pub error: Option<String>,
}

impl ProductListState {
    /// Whether a final result (products or error) has arrived.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !self.is_loading
    }
}

impl From<Resource<Vec<Product>>> for ProductListState {
    fn from(resource: Resource<Vec<Product>>) -> Self {
        match resource {
            Resource::Loading => Self {
                is_loading: true,
                ..Self::default()
            },
            Resource::Success(products) => Self {
                products,
                ..Self::default()
            },
            Resource::Error(message) => Self {
                error: Some(if message.is_empty() {
                    UNEXPECTED_ERROR.to_string()
                } else {
                    message
                }),
                ..Self::default()
            },
        }
    }
}

/// A user's session: catalog, discount rules and cart.
#[derive(Debug, Clone, Default)]
pub struct ShopSession {
    product_list: ProductListState,
    discount_rules: DiscountConfig,
    discount_error: Option<String>,
    cart: Cart,
    selected: Vec<Product>,
    tracked_codes: Vec<ProductCode>,
}

impl ShopSession {
    /// Start an empty session that reports `tracked_codes` at checkout.
    #[must_use]
    pub fn new(tracked_codes: Vec<ProductCode>) -> Self {
        Self {
            tracked_codes,
            ..Self::default()
        }
    }

    /// Apply the latest product list state.
    pub fn apply_products(&mut self, resource: Resource<Vec<Product>>) {
        self.product_list = resource.into();
    }

    /// Apply the latest discount rule state.
    ///
    /// Rules only change on success. The latest error is kept alongside them
    /// so a fallback table can be shown together with the failure that caused
    /// it.
    pub fn apply_discounts(&mut self, resource: Resource<DiscountConfig>) {
        match resource {
            Resource::Loading => {}
            Resource::Success(config) => {
                tracing::debug!(rules = config.len(), "Discount rules updated");
                self.discount_rules = config;
            }
            Resource::Error(message) => self.discount_error = Some(message),
        }
    }

    /// Drive `stream` until the product list settles on products or an error.
    ///
    /// Returns the settled state.
    pub async fn load_products(
        &mut self,
        stream: impl Stream<Item = Resource<Vec<Product>>>,
    ) -> &ProductListState {
        let mut stream = pin!(stream);
        while let Some(resource) = stream.next().await {
            self.apply_products(resource);
            if self.product_list.is_settled() {
                break;
            }
        }
        &self.product_list
    }

    /// Drive `stream` to completion.
    pub async fn load_discounts(&mut self, stream: impl Stream<Item = Resource<DiscountConfig>>) {
        let mut stream = pin!(stream);
        while let Some(resource) = stream.next().await {
            self.apply_discounts(resource);
        }
    }

    /// Load discount rules and the first settled product list from `repo`.
    pub async fn load(&mut self, repo: &ProductRepository) {
        self.load_discounts(repo.discount_rules()).await;
        self.load_products(repo.products()).await;
    }

    /// Current product list state.
    #[must_use]
    pub const fn product_list(&self) -> &ProductListState {
        &self.product_list
    }

    /// Rules used for pricing (empty until a table has loaded).
    #[must_use]
    pub const fn discount_rules(&self) -> &DiscountConfig {
        &self.discount_rules
    }

    /// Latest discount error, if any fetch failed.
    #[must_use]
    pub fn discount_error(&self) -> Option<&str> {
        self.discount_error.as_deref()
    }

    /// Look up a listed product by code.
    #[must_use]
    pub fn find_product(&self, code: &str) -> Option<&Product> {
        self.product_list
            .products
            .iter()
            .find(|product| product.code.as_str() == code)
    }

    /// Add one unit of `product` to the cart.
    pub fn add_to_cart(&mut self, product: &Product) {
        self.selected.push(product.clone());
        self.cart.add(product);
    }

    /// Remove one unit of `product` from the cart.
    ///
    /// Returns `false` if the product was not in the cart.
    pub fn remove_from_cart(&mut self, product: &Product) -> bool {
        if let Some(index) = self
            .selected
            .iter()
            .rposition(|selected| selected.code == product.code)
        {
            self.selected.remove(index);
        }
        self.cart.remove(product)
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.selected.clear();
        self.cart.clear();
    }

    /// The cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Products in the order they were added, one entry per unit.
    #[must_use]
    pub fn selected(&self) -> &[Product] {
        &self.selected
    }

    /// Discounted cart total, or `None` if it overflows.
    #[must_use]
    pub fn total(&self) -> Option<Decimal> {
        calculate_total(self.cart.items(), &self.discount_rules)
    }

    /// Checkout summary for the current cart, or `None` if a total overflows.
    #[must_use]
    pub fn summary(&self) -> Option<CheckoutSummary> {
        summarize(&self.cart, &self.discount_rules, &self.tracked_codes)
    }
}
