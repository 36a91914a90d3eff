//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! rp-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ROLE_PRICING_DATABASE_URL` - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! `crates/cli/migrations/`

use role_pricing_cli::CliConfig;
use role_pricing_cli::db;
use tracing::info;

/// Run the role pricing migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails
/// or a migration fails.
pub async fn run(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Connecting to database...");
    let pool = db::create_pool(config.require_database_url()?).await?;

    info!("Running migrations...");
    db::run_migrations(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
