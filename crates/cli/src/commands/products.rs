//! `shopcart products`

use shopcart_catalog::{CatalogConfig, ShopSession};

use super::{CommandError, build_repository};

/// Print the product catalog.
#[allow(clippy::print_stdout)]
pub async fn list(config: &CatalogConfig) -> Result<(), CommandError> {
    let repo = build_repository(config).await?;
    let mut session = ShopSession::new(config.tracked_codes.clone());

    let state = session.load_products(repo.products()).await;
    if let Some(error) = &state.error {
        return Err(CommandError::Products(error.clone()));
    }

    if state.products.is_empty() {
        println!("No products.");
        return Ok(());
    }

    println!("{:<10} {:<24} {:>8}", "CODE", "NAME", "PRICE");
    for product in &state.products {
        println!(
            "{:<10} {:<24} {:>8.2}",
            product.code.as_str(),
            product.name,
            product.price
        );
    }
    Ok(())
}
