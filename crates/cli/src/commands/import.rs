//! Catalog import command.
//!
//! Reads a YAML catalog, validates its override meta and upserts base
//! prices and meta into `PostgreSQL`.

use std::path::Path;

use role_pricing_cli::db;
use role_pricing_cli::{Catalog, CliConfig};
use tracing::{error, info};

/// Import a catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, validation fails or a
/// database operation fails.
pub async fn run(config: &CliConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    // Read and validate before connecting to the database
    let catalog = Catalog::load(path).await?;

    let errors = catalog.validate();
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Catalog validated successfully");

    let pool = db::create_pool(config.require_database_url()?).await?;
    info!("Connected to database");

    let result = db::import_catalog(&pool, &catalog).await?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Imported {} products ({} overrides)",
            result.products, result.overrides
        );
    }

    Ok(())
}
