//! `shopcart checkout CODE...`

use shopcart_catalog::{CatalogConfig, ShopSession};
use shopcart_core::CheckoutSummary;

use super::{CommandError, build_repository};

/// Price a cart holding one unit per listed code.
pub async fn run(config: &CatalogConfig, codes: &[String], json: bool) -> Result<(), CommandError> {
    let repo = build_repository(config).await?;
    let mut session = ShopSession::new(config.tracked_codes.clone());
    session.load(&repo).await;

    if let Some(error) = &session.product_list().error {
        return Err(CommandError::Products(error.clone()));
    }
    if let Some(error) = session.discount_error() {
        tracing::warn!(error, "Discount endpoint unavailable, pricing with fallback rules");
    }

    for code in codes {
        let product = session
            .find_product(code)
            .cloned()
            .ok_or_else(|| CommandError::UnknownProduct(code.clone()))?;
        session.add_to_cart(&product);
    }

    let summary = session.summary().ok_or(CommandError::Overflow)?;
    if json {
        print_json(&summary)
    } else {
        print_summary(&session, &summary);
        Ok(())
    }
}

#[allow(clippy::print_stdout)]
fn print_json(summary: &CheckoutSummary) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_summary(session: &ShopSession, summary: &CheckoutSummary) {
    println!(
        "Items: {}",
        session
            .selected()
            .iter()
            .map(|product| product.code.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    for (code, count) in &summary.counts {
        println!("  {:<10} x{count}", code.as_str());
    }
    println!("Subtotal: {:.2}", summary.subtotal);
    if !summary.savings().is_zero() {
        println!("Savings:  {:.2}", summary.savings());
    }
    println!("Total:    {:.2}", summary.total);
}
