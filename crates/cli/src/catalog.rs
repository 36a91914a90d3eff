//! YAML product catalogs.
//!
//! A catalog file lists products with their base prices and raw override
//! meta, in the same key/value layout the database uses:
//!
//! ```yaml
//! roles: [wholesale, vip]
//! products:
//!   - id: 42
//!     name: Dried Mango
//!     regular_price: "100.00"
//!     sale_price: ~
//!     meta:
//!       _guest_regular_price: "80.00"
//!       _role_regular_price_wholesale: "50.00"
//!       _role_sale_price_vip: "40.00"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use role_pricing_core::{
    BasePrice, MemoryOverrideStore, MetaKeyError, Money, OverrideField, OverrideStore,
    PriceOverrideSet, ProductId, RoleKey,
};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),
    #[error("product {0} not found in catalog")]
    ProductNotFound(ProductId),
}

/// One catalog product.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub regular_price: Option<Money>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub sale_price: Option<Money>,
    /// Raw product meta, override keys and anything else.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl CatalogProduct {
    /// The product's base prices.
    #[must_use]
    pub fn base_price(&self) -> BasePrice {
        BasePrice::new(self.regular_price.clone(), self.sale_price.clone())
    }
}

/// Base prices accept `""` as unset, like stored meta does.
fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => Money::parse(text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    roles: Vec<RoleKey>,
    #[serde(default)]
    products: Vec<CatalogProduct>,
}

/// A loaded catalog with its override meta in a [`MemoryOverrideStore`].
#[derive(Debug, Clone)]
pub struct Catalog {
    roles: Vec<RoleKey>,
    products: Vec<CatalogProduct>,
    store: MemoryOverrideStore,
}

impl Catalog {
    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or a product id repeats.
    pub fn from_yaml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(content)?;

        let mut seen = HashSet::new();
        let mut store = MemoryOverrideStore::new();
        for product in &file.products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
            for (key, value) in &product.meta {
                store.set_meta(product.id, key.clone(), value.clone());
            }
        }

        Ok(Self {
            roles: file.roles,
            products: file.products,
            store,
        })
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_yaml(&content)?;
        tracing::info!(
            path = %path.display(),
            products = catalog.products.len(),
            roles = catalog.roles.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Roles declared by the catalog, in declaration order.
    #[must_use]
    pub fn roles(&self) -> &[RoleKey] {
        &self.roles
    }

    /// All products.
    #[must_use]
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    /// Look up a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the id is not in the catalog.
    pub fn product(&self, id: ProductId) -> Result<&CatalogProduct, CatalogError> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// The override store holding every product's meta.
    #[must_use]
    pub const fn store(&self) -> &MemoryOverrideStore {
        &self.store
    }

    /// Overrides of one product that matter for `roles`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the id is not in the catalog.
    pub fn overrides_for<'a>(
        &self,
        id: ProductId,
        roles: impl IntoIterator<Item = &'a RoleKey>,
    ) -> Result<PriceOverrideSet, CatalogError> {
        self.product(id)?;
        Ok(self.store.override_set(id, roles))
    }

    /// Every override of one product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the id is not in the catalog.
    pub fn all_overrides(&self, id: ProductId) -> Result<PriceOverrideSet, CatalogError> {
        self.product(id)?;
        Ok(self.store.product_overrides(id))
    }

    /// Check override meta for problems the resolver would silently ignore.
    ///
    /// Returns one message per problem; an empty list means the catalog is clean.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let known: HashSet<&RoleKey> = self.roles.iter().collect();
        let mut errors = Vec::new();

        for product in &self.products {
            for (key, value) in &product.meta {
                let field = match OverrideField::from_meta_key(key) {
                    Ok(field) => field,
                    Err(MetaKeyError::Unknown(_)) => continue,
                    Err(e) => {
                        errors.push(format!("product {}: {key}: {e}", product.id));
                        continue;
                    }
                };

                if let Some(role) = field.role() {
                    if !known.is_empty() && !known.contains(role) {
                        errors.push(format!(
                            "product {}: {key}: role {role} is not declared",
                            product.id
                        ));
                    }
                }

                if !value.trim().is_empty() {
                    if let Err(e) = Money::parse(value) {
                        errors.push(format!("product {}: {key}: {e}", product.id));
                    }
                }
            }
        }

        errors
    }
}
