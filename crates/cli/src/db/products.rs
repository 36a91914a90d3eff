//! Product and product-meta repository.
//!
//! Meta values are read back as raw text and parsed by the core, so an
//! empty or malformed row simply reads as "no override".

use role_pricing_core::{BasePrice, Money, OverrideField, PriceOverrideSet, ProductId};
use sqlx::{PgExecutor, PgPool};

use super::RepositoryError;

/// Repository for products and their meta.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product's base prices.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_base_price(&self, id: ProductId) -> Result<BasePrice, RepositoryError> {
        let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(
            r"
            SELECT regular_price, sale_price
            FROM role_pricing.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let (regular, sale) = row.ok_or(RepositoryError::NotFound(id))?;
        Ok(BasePrice::new(
            regular.as_deref().and_then(Money::from_stored),
            sale.as_deref().and_then(Money::from_stored),
        ))
    }

    /// Get every price override stored for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_overrides(&self, id: ProductId) -> Result<PriceOverrideSet, RepositoryError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r"
            SELECT meta_key, meta_value
            FROM role_pricing.product_meta
            WHERE product_id = $1
              AND (meta_key LIKE '\_guest\_%' OR meta_key LIKE '\_role\_%')
            ORDER BY meta_key
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(PriceOverrideSet::from_meta(
            rows.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))
    }

    /// Store a raw meta value. An empty value marks the field unset.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_meta(
        &self,
        id: ProductId,
        key: &str,
        value: &str,
    ) -> Result<(), RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM role_pricing.products WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        if !exists {
            return Err(RepositoryError::NotFound(id));
        }

        upsert_meta(self.pool, id, key, value).await
    }

    /// Store or clear one override.
    ///
    /// Administrator fields are never written.
    ///
    /// # Errors
    ///
    /// See [`ProductRepository::set_meta`].
    pub async fn set_override(
        &self,
        id: ProductId,
        field: &OverrideField,
        value: Option<&Money>,
    ) -> Result<(), RepositoryError> {
        if field.is_administrator() {
            tracing::warn!(product = %id, "Refusing to store administrator price override");
            return Ok(());
        }
        let raw = value.map(Money::as_str).unwrap_or_default();
        self.set_meta(id, &field.meta_key(), raw).await
    }
}

/// Insert or update a product and its base prices on any executor.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn upsert_product<'e, E>(
    executor: E,
    id: ProductId,
    name: Option<&str>,
    base: &BasePrice,
) -> Result<(), RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r"
        INSERT INTO role_pricing.products (id, name, regular_price, sale_price)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO UPDATE
        SET name = $2, regular_price = $3, sale_price = $4, updated_at = NOW()
        ",
    )
    .bind(id)
    .bind(name)
    .bind(base.regular.as_ref().map(Money::as_str))
    .bind(base.sale.as_ref().map(Money::as_str))
    .execute(executor)
    .await?;

    Ok(())
}

/// Insert or update one meta row on any executor.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn upsert_meta<'e, E>(
    executor: E,
    id: ProductId,
    key: &str,
    value: &str,
) -> Result<(), RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r"
        INSERT INTO role_pricing.product_meta (product_id, meta_key, meta_value)
        VALUES ($1, $2, $3)
        ON CONFLICT (product_id, meta_key) DO UPDATE
        SET meta_value = $3, updated_at = NOW()
        ",
    )
    .bind(id)
    .bind(key)
    .bind(value)
    .execute(executor)
    .await?;

    Ok(())
}
