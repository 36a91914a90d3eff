//! Override summary command.

use std::path::Path;

use role_pricing_cli::CliConfig;
use role_pricing_core::{PricingSummary, ProductId};

use super::load_product;

/// Print the override summary of one product.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded.
pub async fn run(
    config: &CliConfig,
    product: ProductId,
    catalog: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pricing = load_product(config, product, catalog).await?;
    let summary = PricingSummary::build(&pricing.overrides, &pricing.roles);

    #[allow(clippy::print_stdout)]
    {
        println!("{summary}");
    }

    Ok(())
}
