use std::collections::HashMap;

use super::{DISCOUNTS_RESOURCE, ResourceBundle};

const BUNDLED_DISCOUNTS: &str = include_str!("../../resources/discounts.json");

/// Resources compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledResources;

impl ResourceBundle for BundledResources {
    fn read_bundled(&self, id: &str) -> Option<String> {
        match id {
            DISCOUNTS_RESOURCE => Some(BUNDLED_DISCOUNTS.to_string()),
            _ => None,
        }
    }
}

/// Resources supplied at runtime, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct StaticResources {
    resources: HashMap<String, String>,
}

impl StaticResources {
    /// Create an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource.
    #[must_use]
    pub fn with(mut self, id: &str, text: &str) -> Self {
        self.resources.insert(id.to_string(), text.to_string());
        self
    }
}

impl ResourceBundle for StaticResources {
    fn read_bundled(&self, id: &str) -> Option<String> {
        self.resources.get(id).cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopcart_core::{DiscountConfig, DiscountRule};

    use super::*;

    #[test]
    fn test_bundled_discounts_parse() {
        let text = BundledResources.read_bundled(DISCOUNTS_RESOURCE).unwrap();
        let config = DiscountConfig::from_json(&text).unwrap();

        assert_eq!(config.len(), 2);
        assert_eq!(
            config.rule_for("VOUCHER"),
            Some(&DiscountRule::BuyXGetYFree { x: 2, y: 1 })
        );
        assert!(matches!(
            config.rule_for("TSHIRT"),
            Some(DiscountRule::BulkDiscount { threshold: 3, .. })
        ));
    }

    #[test]
    fn test_unknown_resource() {
        assert_eq!(BundledResources.read_bundled("products"), None);
        assert_eq!(StaticResources::new().read_bundled(DISCOUNTS_RESOURCE), None);
    }

    #[test]
    fn test_static_resources() {
        let bundle = StaticResources::new().with(DISCOUNTS_RESOURCE, "{}");
        assert_eq!(bundle.read_bundled(DISCOUNTS_RESOURCE).as_deref(), Some("{}"));
    }
}
