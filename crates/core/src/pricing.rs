//! Discounted cart totals.
//!
//! Everything here is a pure function of the cart lines and the discount
//! table, so calling it twice with the same inputs yields the same result.
//! Amounts that do not fit in a [`Decimal`] come back as `None`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::{Cart, CartItem};
use crate::discount::DiscountConfig;
use crate::types::ProductCode;

/// Cost of a single cart line after applying its discount rule, if any.
#[must_use]
pub fn line_total(item: &CartItem, rules: &DiscountConfig) -> Option<Decimal> {
    let product = item.product();
    rules.rule_for(product.code.as_str()).map_or_else(
        || item.full_price(),
        |rule| rule.line_cost(product.price, item.quantity()),
    )
}

/// Total cost of `cart` after applying `rules`.
///
/// Lines without a rule are charged at full price.
#[must_use]
pub fn calculate_total(cart: &[CartItem], rules: &DiscountConfig) -> Option<Decimal> {
    cart.iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(line_total(item, rules)?))
}

/// Everything shown when the user reviews the cart before paying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    /// Units per tracked product code.
    pub counts: BTreeMap<ProductCode, u32>,
    /// Total before discounts.
    pub subtotal: Decimal,
    /// Total after discounts.
    pub total: Decimal,
}

impl CheckoutSummary {
    /// Amount saved by discounts.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        self.subtotal.saturating_sub(self.total)
    }
}

/// Build the checkout summary for `cart`.
///
/// With no `tracked` codes every code in the cart is counted. Returns `None`
/// if either total overflows.
#[must_use]
pub fn summarize(
    cart: &Cart,
    rules: &DiscountConfig,
    tracked: &[ProductCode],
) -> Option<CheckoutSummary> {
    let counts = if tracked.is_empty() {
        cart.counts()
    } else {
        cart.count_by_code(tracked)
    };

    Some(CheckoutSummary {
        counts,
        subtotal: cart.subtotal()?,
        total: calculate_total(cart.items(), rules)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::discount::DiscountRule;
    use crate::types::{Product, ProductId};

    fn code(code: &str) -> ProductCode {
        ProductCode::parse(code).unwrap()
    }

    fn product(code_str: &str, price: Decimal) -> Product {
        Product::new(ProductId::new(1), code(code_str), code_str, price)
    }

    fn line(code_str: &str, price: Decimal, quantity: u32) -> CartItem {
        CartItem::with_quantity(product(code_str, price), quantity).unwrap()
    }

    fn rules() -> DiscountConfig {
        DiscountConfig::new(BTreeMap::from([
            (code("VOUCHER"), DiscountRule::BuyXGetYFree { x: 2, y: 1 }),
            (
                code("TSHIRT"),
                DiscountRule::BulkDiscount {
                    threshold: 3,
                    discounted_price: dec!(19.00),
                },
            ),
        ]))
    }

    #[test]
    fn test_voucher_buy_two_get_one_free() {
        let cart = [line("VOUCHER", dec!(5.0), 4)];
        assert_eq!(calculate_total(&cart, &rules()), Some(dec!(15.0)));
    }

    #[test]
    fn test_tshirt_bulk_discount() {
        let cart = [line("TSHIRT", dec!(20.0), 3)];
        assert_eq!(calculate_total(&cart, &rules()), Some(dec!(57.0)));
    }

    #[test]
    fn test_tshirt_below_threshold_full_price() {
        let cart = [line("TSHIRT", dec!(20.0), 2)];
        assert_eq!(calculate_total(&cart, &rules()), Some(dec!(40.0)));
    }

    #[test]
    fn test_no_rule_full_price() {
        let cart = [line("MUG", dec!(7.50), 3)];
        assert_eq!(calculate_total(&cart, &rules()), Some(dec!(22.50)));
    }

    #[test]
    fn test_mixed_cart() {
        // Classic checkout examples for this discount table.
        let cart = [
            line("VOUCHER", dec!(5), 3),
            line("TSHIRT", dec!(20), 3),
            line("MUG", dec!(7.5), 1),
        ];
        assert_eq!(calculate_total(&cart, &rules()), Some(dec!(74.50)));
    }

    #[test]
    fn test_empty_cart_is_zero() {
        assert_eq!(calculate_total(&[], &rules()), Some(Decimal::ZERO));
    }

    #[test]
    fn test_empty_rules_charge_full_price() {
        let cart = [line("VOUCHER", dec!(5), 4), line("TSHIRT", dec!(20), 3)];
        assert_eq!(
            calculate_total(&cart, &DiscountConfig::default()),
            Some(dec!(80))
        );
    }

    #[test]
    fn test_idempotent() {
        let cart = [line("VOUCHER", dec!(5), 7), line("TSHIRT", dec!(20), 5)];
        let rules = rules();
        assert_eq!(calculate_total(&cart, &rules), calculate_total(&cart, &rules));
    }

    #[test]
    fn test_bulk_cost_matches_threshold_rule() {
        let rules = rules();
        for quantity in 1..20_u32 {
            let cost = line_total(&line("TSHIRT", dec!(20), quantity), &rules);
            let unit = if quantity < 3 { dec!(20) } else { dec!(19) };
            assert_eq!(cost, Some(unit * Decimal::from(quantity)));
        }
    }

    #[test]
    fn test_no_currency_drift() {
        // 0.1 * 3 must be exactly 0.3.
        let cart = [line("CANDY", dec!(0.1), 3)];
        assert_eq!(calculate_total(&cart, &rules()), Some(dec!(0.3)));
    }

    #[test]
    fn test_summarize_tracked_codes() {
        let mut cart = Cart::new();
        for _ in 0..3 {
            cart.add(&product("VOUCHER", dec!(5)));
        }
        cart.add(&product("MUG", dec!(7.5)));

        let summary = summarize(&cart, &rules(), &[code("VOUCHER"), code("TSHIRT")]).unwrap();

        assert_eq!(summary.counts.get("VOUCHER"), Some(&3));
        assert_eq!(summary.counts.get("TSHIRT"), Some(&0));
        assert_eq!(summary.counts.get("MUG"), None);
        assert_eq!(summary.subtotal, dec!(22.5));
        assert_eq!(summary.total, dec!(17.5));
        assert_eq!(summary.savings(), dec!(5));
    }

    #[test]
    fn test_summarize_without_tracked_counts_everything() {
        let mut cart = Cart::new();
        cart.add(&product("MUG", dec!(7.5)));

        let summary = summarize(&cart, &rules(), &[]).unwrap();
        assert_eq!(summary.counts.get("MUG"), Some(&1));
    }

    #[test]
    fn test_overflowing_total_is_none() {
        let cart = [line("GOLD", Decimal::MAX, 2)];
        assert_eq!(calculate_total(&cart, &rules()), None);

        let cart = [line("GOLD", Decimal::MAX, 1), line("MUG", dec!(7.5), 1)];
        assert_eq!(calculate_total(&cart, &rules()), None);
    }

    #[test]
    fn test_summarize_overflow_is_none() {
        let mut cart = Cart::new();
        cart.add(&product("GOLD", Decimal::MAX));
        cart.add(&product("GOLD", Decimal::MAX));

        assert_eq!(summarize(&cart, &rules(), &[]), None);
    }
}
