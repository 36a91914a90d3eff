//! Subcommand implementations.

use std::path::Path;

use role_pricing_cli::db::{self, ProductRepository};
use role_pricing_cli::{Catalog, CliConfig};
use role_pricing_core::{BasePrice, PriceOverrideSet, ProductId, RoleKey};

pub mod import;
pub mod migrate;
pub mod resolve;
pub mod set;
pub mod summary;

/// Everything needed to price one product.
struct ProductPricing {
    base: BasePrice,
    overrides: PriceOverrideSet,
    /// Roles known to the source, in display order.
    roles: Vec<RoleKey>,
}

/// Load a product from a catalog file when given, otherwise from `PostgreSQL`.
async fn load_product(
    config: &CliConfig,
    product: ProductId,
    catalog: Option<&Path>,
) -> Result<ProductPricing, Box<dyn std::error::Error>> {
    if let Some(path) = catalog {
        let catalog = Catalog::load(path).await?;
        let base = catalog.product(product)?.base_price();
        let overrides = catalog.all_overrides(product)?;
        let roles = if catalog.roles().is_empty() {
            overrides.roles().map(|(role, _)| role.clone()).collect()
        } else {
            catalog.roles().to_vec()
        };
        return Ok(ProductPricing {
            base,
            overrides,
            roles,
        });
    }

    let pool = db::create_pool(config.require_database_url()?).await?;
    let repo = ProductRepository::new(&pool);
    let base = repo.get_base_price(product).await?;
    let overrides = repo.get_overrides(product).await?;
    let roles = overrides.roles().map(|(role, _)| role.clone()).collect();

    Ok(ProductPricing {
        base,
        overrides,
        roles,
    })
}
