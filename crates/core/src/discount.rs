//! Discount rules keyed by product code.
//!
//! The wire format is the one served by the discounts endpoint and written to
//! the local cache file:
//!
//! ```json
//! {
//!   "discounts": {
//!     "VOUCHER": { "type": "BuyXGetYFree", "x": 2, "y": 1 },
//!     "TSHIRT": { "type": "BulkDiscount", "threshold": 3, "discountedPrice": 19.00 }
//!   }
//! }
//! ```

use core::fmt;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductCode;

/// A pricing adjustment applied to every unit of one product code.
///
/// The set of variants is closed: adding one forces every `match` in the
/// pricing engine to handle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DiscountRule {
    /// In every complete group of `x + y` units, `y` units are free.
    BuyXGetYFree {
        /// Paid units per group.
        x: u32,
        /// Free units per group.
        y: u32,
    },
    /// At `threshold` units or more, every unit costs `discounted_price`.
    BulkDiscount {
        /// Minimum quantity for the discounted price.
        threshold: u32,
        /// Unit price once the threshold is reached.
        #[serde(rename = "discountedPrice")]
        discounted_price: Decimal,
    },
}

impl DiscountRule {
    /// Number of units that are paid for out of `quantity`.
    ///
    /// Only [`DiscountRule::BuyXGetYFree`] makes units free; a rule whose group
    /// size is zero charges every unit.
    #[must_use]
    pub const fn charged_units(&self, quantity: u32) -> u32 {
        match self {
            Self::BuyXGetYFree { x, y } => {
                let (x, y) = (*x, *y);
                let group = x.saturating_add(y);
                if group == 0 {
                    return quantity;
                }
                let free = (quantity / group).saturating_mul(y);
                quantity.saturating_sub(free)
            }
            Self::BulkDiscount { .. } => quantity,
        }
    }

    /// Cost of `quantity` units at `unit_price` under this rule.
    ///
    /// Returns `None` if the cost does not fit in a [`Decimal`].
    #[must_use]
    pub fn line_cost(&self, unit_price: Decimal, quantity: u32) -> Option<Decimal> {
        match *self {
            Self::BuyXGetYFree { .. } => {
                unit_price.checked_mul(Decimal::from(self.charged_units(quantity)))
            }
            Self::BulkDiscount {
                threshold,
                discounted_price,
            } => {
                let price = if quantity >= threshold {
                    discounted_price
                } else {
                    unit_price
                };
                price.checked_mul(Decimal::from(quantity))
            }
        }
    }
}

impl fmt::Display for DiscountRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuyXGetYFree { x, y } => write!(f, "buy {x}, get {y} free"),
            Self::BulkDiscount {
                threshold,
                discounted_price,
            } => write!(f, "{threshold} or more for {discounted_price:.2} each"),
        }
    }
}

/// The full discount table, one rule per product code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountConfig {
    /// Rules keyed by product code.
    pub discounts: BTreeMap<ProductCode, DiscountRule>,
}

impl DiscountConfig {
    /// Create a config from a rule table.
    #[must_use]
    pub const fn new(discounts: BTreeMap<ProductCode, DiscountRule>) -> Self {
        Self { discounts }
    }

    /// Look up the rule for a product code.
    #[must_use]
    pub fn rule_for(&self, code: &str) -> Option<&DiscountRule> {
        self.discounts.get(code)
    }

    /// Number of rules in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.discounts.len()
    }

    /// Returns `true` if the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.discounts.is_empty()
    }

    /// Parse a config from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or does not match the
    /// discount table shape (including unknown `type` tags).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the config to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
