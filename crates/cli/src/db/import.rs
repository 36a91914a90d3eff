//! Bulk import of a YAML catalog into `PostgreSQL`.

use role_pricing_core::{MetaKeyError, Money, OverrideField};
use sqlx::PgPool;

use super::RepositoryError;
use super::products::{upsert_meta, upsert_product};
use crate::catalog::Catalog;

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub products: usize,
    pub overrides: usize,
    /// Override rows skipped because their key is unusable (administrator
    /// role or an invalid role key).
    pub skipped: usize,
}

/// Upsert every catalog product and its meta in a single transaction.
///
/// Override values are written normalized; non-override meta is stored as-is.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any statement fails. Nothing is
/// committed in that case.
pub async fn import_catalog(
    pool: &PgPool,
    catalog: &Catalog,
) -> Result<ImportResult, RepositoryError> {
    let mut tx = pool.begin().await?;
    let mut result = ImportResult::default();

    for product in catalog.products() {
        upsert_product(
            &mut *tx,
            product.id,
            product.name.as_deref(),
            &product.base_price(),
        )
        .await?;
        result.products += 1;

        for (key, value) in &product.meta {
            let stored = match OverrideField::from_meta_key(key) {
                Ok(_) => {
                    result.overrides += 1;
                    Money::from_stored(value).map(Money::into_inner).unwrap_or_default()
                }
                Err(MetaKeyError::Unknown(_)) => value.clone(),
                Err(e) => {
                    tracing::warn!(product = %product.id, key = %key, error = %e, "Skipping meta row");
                    result.skipped += 1;
                    continue;
                }
            };

            upsert_meta(&mut *tx, product.id, key, &stored).await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        products = result.products,
        overrides = result.overrides,
        skipped = result.skipped,
        "Catalog imported"
    );
    Ok(result)
}
