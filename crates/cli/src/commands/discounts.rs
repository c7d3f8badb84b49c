//! `shopcart discounts`

use shopcart_catalog::{CatalogConfig, ShopSession};

use super::{CommandError, build_repository};

/// Print the discount rules in effect.
#[allow(clippy::print_stdout)]
pub async fn list(config: &CatalogConfig) -> Result<(), CommandError> {
    let repo = build_repository(config).await?;
    let mut session = ShopSession::new(config.tracked_codes.clone());

    session.load_discounts(repo.discount_rules()).await;
    if let Some(error) = session.discount_error() {
        tracing::warn!(error, "Discount endpoint unavailable, showing fallback rules");
    }

    let rules = session.discount_rules();
    if rules.is_empty() {
        println!("No discount rules.");
        return Ok(());
    }

    for (code, rule) in &rules.discounts {
        println!("{:<10} {rule}", code.as_str());
    }
    Ok(())
}
