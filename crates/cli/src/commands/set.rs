//! Override authoring command.

use role_pricing_cli::CliConfig;
use role_pricing_cli::db::{self, ProductRepository};
use role_pricing_core::{OverrideSubmission, ProductId};
use tracing::info;

/// Set or clear one override of a product.
///
/// The value is normalized before anything is written; an empty value
/// clears the override.
///
/// # Errors
///
/// Returns an error if the field or value is invalid, the product does not
/// exist or the database write fails.
pub async fn run(
    config: &CliConfig,
    product: ProductId,
    field: &str,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut submission = OverrideSubmission::new();
    submission.push_meta(field, value)?;
    let changes = submission.normalize()?;

    let pool = db::create_pool(config.require_database_url()?).await?;
    let repo = ProductRepository::new(&pool);

    for (field, value) in &changes {
        repo.set_override(product, field, value.as_ref()).await?;
        match value {
            Some(price) => info!(product = %product, field = %field, price = %price, "Override set"),
            None => info!(product = %product, field = %field, "Override cleared"),
        }
    }

    Ok(())
}
