//! Role Pricing CLI - migrations, override authoring and price lookup.
//!
//! # Usage
//!
//! ```bash
//! # Create the role pricing tables
//! rp-cli migrate
//!
//! # Resolve prices for a guest, from a YAML catalog
//! rp-cli resolve --product 42 --catalog catalog.yaml
//!
//! # Resolve prices for a user holding two roles, from the database
//! rp-cli resolve --product 42 --role wholesale --role vip
//!
//! # Show the override summary of a product
//! rp-cli summary --product 42
//!
//! # Set or clear one override
//! rp-cli set --product 42 --field _role_sale_price_vip --value 39,90
//! rp-cli set --product 42 --field _role_sale_price_vip --value ""
//!
//! # Load a catalog into the database
//! rp-cli import --catalog catalog.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use role_pricing_cli::CliConfig;
use role_pricing_core::{ProductId, StaticIdentity};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "rp-cli")]
#[command(author, version, about = "Role pricing CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Resolve regular, sale and effective prices for a requester
    Resolve {
        /// Product ID
        #[arg(short, long)]
        product: i32,

        /// Role held by the requester, in priority order (repeatable)
        #[arg(short, long = "role")]
        roles: Vec<String>,

        /// Treat the requester as logged in even without roles
        #[arg(long)]
        authenticated: bool,

        /// Read the product from a YAML catalog instead of the database
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the override summary of a product
    Summary {
        /// Product ID
        #[arg(short, long)]
        product: i32,

        /// Read the product from a YAML catalog instead of the database
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Set or clear one price override
    Set {
        /// Product ID
        #[arg(short, long)]
        product: i32,

        /// Override meta key, e.g. `_role_sale_price_vip`
        #[arg(short, long)]
        field: String,

        /// New price; an empty value clears the override
        #[arg(short, long, allow_hyphen_values = true)]
        value: String,
    },
    /// Import a YAML catalog into the database
    Import {
        /// Path to the catalog file
        #[arg(short, long)]
        catalog: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "role_pricing_cli=info,rp_cli=info,role_pricing_core=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::from_env()?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&config).await?,
        Commands::Resolve {
            product,
            roles,
            authenticated,
            catalog,
            json,
        } => {
            let identity = commands::resolve::identity(&roles, authenticated)?;
            let provider = StaticIdentity::new(identity);
            commands::resolve::run(
                &config,
                ProductId::new(product),
                &provider,
                catalog.as_deref(),
                json,
            )
            .await?;
        }
        Commands::Summary { product, catalog } => {
            commands::summary::run(&config, ProductId::new(product), catalog.as_deref()).await?;
        }
        Commands::Set {
            product,
            field,
            value,
        } => commands::set::run(&config, ProductId::new(product), &field, &value).await?,
        Commands::Import { catalog } => commands::import::run(&config, &catalog).await?,
    }
    Ok(())
}
