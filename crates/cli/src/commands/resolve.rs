//! Price lookup command.

use std::path::Path;

use role_pricing_cli::CliConfig;
use role_pricing_core::{
    Identity, IdentityProvider, PriceQuery, PriceResolver, PriceSource, ProductId, Resolution,
    RoleKey, RoleKeyError,
};
use serde::Serialize;

use super::load_product;

/// Build the requester identity from command-line roles.
///
/// No roles and no `authenticated` flag means a guest.
///
/// # Errors
///
/// Returns an error if a role key is invalid.
pub fn identity(roles: &[String], authenticated: bool) -> Result<Identity, RoleKeyError> {
    if roles.is_empty() && !authenticated {
        return Ok(Identity::Guest);
    }
    let roles = roles
        .iter()
        .map(|role| RoleKey::parse(role))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Identity::authenticated(roles))
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    product: ProductId,
    identity: &'a Identity,
    regular: Resolution,
    sale: Resolution,
    effective: Resolution,
    on_sale: bool,
    original: Option<String>,
}

/// Resolve and print the prices of one product.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded.
pub async fn run(
    config: &CliConfig,
    product: ProductId,
    provider: &dyn IdentityProvider,
    catalog: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pricing = load_product(config, product, catalog).await?;
    let identity = provider.current_identity();
    let resolver = PriceResolver::new(config.settings);

    let detailed = |query: PriceQuery| {
        resolver.resolve_detailed(query, &pricing.overrides, &identity, &pricing.base)
    };
    let prices = resolver.resolve_all(&pricing.overrides, &identity, &pricing.base);
    let output = ResolveOutput {
        product,
        identity: &identity,
        regular: detailed(PriceQuery::Regular),
        sale: detailed(PriceQuery::Sale),
        effective: detailed(PriceQuery::Effective),
        on_sale: prices.is_on_sale(),
        original: prices
            .display_original(config.settings.display_format)
            .map(ToString::to_string),
    };

    #[allow(clippy::print_stdout)]
    {
        if json {
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Product {product} ({})", describe(&identity));
        for (label, resolution) in [
            ("regular", &output.regular),
            ("sale", &output.sale),
            ("effective", &output.effective),
        ] {
            println!("  {label:<10} {}", render(resolution));
        }
        if let Some(original) = &output.original {
            println!("  {:<10} {original}", "original");
        }
    }

    Ok(())
}

fn describe(identity: &Identity) -> String {
    match identity {
        Identity::Guest => "guest".to_string(),
        Identity::Authenticated { roles } if roles.is_empty() => "no roles".to_string(),
        Identity::Authenticated { roles } => roles
            .iter()
            .map(RoleKey::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn render(resolution: &Resolution) -> String {
    let price = resolution
        .price
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);
    match &resolution.source {
        PriceSource::Override { field } => format!("{price:<10} {field}"),
        PriceSource::Base => format!("{price:<10} base"),
    }
}
