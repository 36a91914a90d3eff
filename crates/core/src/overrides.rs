//! Per-product price overrides and the key/value layout they are stored in.
//!
//! Overrides live in a flat product-meta store, one row per field:
//!
//! | Field                  | Meta key                      |
//! |------------------------|-------------------------------|
//! | guest regular          | `_guest_regular_price`        |
//! | guest sale             | `_guest_sale_price`           |
//! | role regular           | `_role_regular_price_<role>`  |
//! | role sale              | `_role_sale_price_<role>`     |
//!
//! An empty value means "unset". The administrator role never has a slot.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId, RoleKey, RoleKeyError};

const GUEST_REGULAR_KEY: &str = "_guest_regular_price";
const GUEST_SALE_KEY: &str = "_guest_sale_price";
const ROLE_REGULAR_PREFIX: &str = "_role_regular_price_";
const ROLE_SALE_PREFIX: &str = "_role_sale_price_";

/// Which of the two configurable prices a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceKind {
    Regular,
    Sale,
}

impl PriceKind {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Sale => "sale",
        }
    }
}

impl std::fmt::Display for PriceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when decoding a meta key.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MetaKeyError {
    /// The key is not one of the override key shapes.
    #[error("not a price override key: {0}")]
    Unknown(String),
    /// The role suffix is not a valid role key.
    #[error("invalid role in meta key {key}: {source}")]
    InvalidRole {
        /// The full meta key.
        key: String,
        /// Why the role suffix was rejected.
        source: RoleKeyError,
    },
    /// The key names the administrator role, which has no override slot.
    #[error("administrator has no price override slot")]
    Administrator,
}

/// One configurable override slot for a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverrideField {
    /// Price shown to guests.
    Guest(PriceKind),
    /// Price shown to holders of a role.
    Role(RoleKey, PriceKind),
}

impl OverrideField {
    /// The price kind this field holds.
    #[must_use]
    pub const fn kind(&self) -> PriceKind {
        match self {
            Self::Guest(kind) | Self::Role(_, kind) => *kind,
        }
    }

    /// The role this field belongs to, if any.
    #[must_use]
    pub const fn role(&self) -> Option<&RoleKey> {
        match self {
            Self::Guest(_) => None,
            Self::Role(role, _) => Some(role),
        }
    }

    /// Returns true if this field names the administrator role.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.role().is_some_and(RoleKey::is_administrator)
    }

    /// The meta key this field is stored under.
    #[must_use]
    pub fn meta_key(&self) -> String {
        match self {
            Self::Guest(PriceKind::Regular) => GUEST_REGULAR_KEY.to_owned(),
            Self::Guest(PriceKind::Sale) => GUEST_SALE_KEY.to_owned(),
            Self::Role(role, PriceKind::Regular) => format!("{ROLE_REGULAR_PREFIX}{role}"),
            Self::Role(role, PriceKind::Sale) => format!("{ROLE_SALE_PREFIX}{role}"),
        }
    }

    /// Decode a meta key back into a field.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not an override key, if its role
    /// suffix is invalid, or if it names the administrator role.
    pub fn from_meta_key(key: &str) -> Result<Self, MetaKeyError> {
        match key {
            GUEST_REGULAR_KEY => return Ok(Self::Guest(PriceKind::Regular)),
            GUEST_SALE_KEY => return Ok(Self::Guest(PriceKind::Sale)),
            _ => {}
        }

        let (kind, suffix) = if let Some(suffix) = key.strip_prefix(ROLE_REGULAR_PREFIX) {
            (PriceKind::Regular, suffix)
        } else if let Some(suffix) = key.strip_prefix(ROLE_SALE_PREFIX) {
            (PriceKind::Sale, suffix)
        } else {
            return Err(MetaKeyError::Unknown(key.to_owned()));
        };

        let role = RoleKey::parse(suffix).map_err(|source| MetaKeyError::InvalidRole {
            key: key.to_owned(),
            source,
        })?;

        if role.is_administrator() {
            return Err(MetaKeyError::Administrator);
        }

        Ok(Self::Role(role, kind))
    }
}

impl std::fmt::Display for OverrideField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.meta_key())
    }
}

/// The regular/sale override pair for one identity category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale: Option<Money>,
}

impl PricePair {
    /// The price of the given kind.
    #[must_use]
    pub const fn get(&self, kind: PriceKind) -> Option<&Money> {
        match kind {
            PriceKind::Regular => self.regular.as_ref(),
            PriceKind::Sale => self.sale.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: PriceKind) -> &mut Option<Money> {
        match kind {
            PriceKind::Regular => &mut self.regular,
            PriceKind::Sale => &mut self.sale,
        }
    }

    /// Returns true if neither price is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.regular.is_none() && self.sale.is_none()
    }
}

/// All overrides configured for a single product.
///
/// Built by the override store before resolution; the resolver only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOverrideSet {
    /// Guest prices.
    #[serde(default)]
    pub guest: PricePair,
    /// Role prices keyed by role. Never contains the administrator role.
    #[serde(default)]
    roles: BTreeMap<RoleKey, PricePair>,
}

impl PriceOverrideSet {
    /// An empty set with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw meta rows.
    ///
    /// Rows that are not override keys are ignored, as are empty and
    /// malformed values.
    pub fn from_meta<'a>(rows: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut set = Self::new();
        for (key, value) in rows {
            let field = match OverrideField::from_meta_key(key) {
                Ok(field) => field,
                Err(MetaKeyError::Unknown(_)) => continue,
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, "Skipping meta row");
                    continue;
                }
            };
            set.set(&field, Money::from_stored(value));
        }
        set
    }

    /// The override stored for a field.
    ///
    /// Always `None` for the administrator role.
    #[must_use]
    pub fn get(&self, field: &OverrideField) -> Option<&Money> {
        match field {
            OverrideField::Guest(kind) => self.guest.get(*kind),
            OverrideField::Role(role, kind) => self.roles.get(role)?.get(*kind),
        }
    }

    /// Set or clear the override for a field.
    ///
    /// Writes to an administrator field are dropped.
    pub fn set(&mut self, field: &OverrideField, value: Option<Money>) {
        match field {
            OverrideField::Guest(kind) => *self.guest.slot_mut(*kind) = value,
            OverrideField::Role(role, _) if role.is_administrator() => {
                tracing::debug!("Ignoring administrator price override");
            }
            OverrideField::Role(role, kind) => {
                let pair = self.roles.entry(role.clone()).or_default();
                *pair.slot_mut(*kind) = value;
                if pair.is_empty() {
                    self.roles.remove(role);
                }
            }
        }
    }

    /// The override pair for a role, if any price is set.
    #[must_use]
    pub fn role(&self, role: &RoleKey) -> Option<&PricePair> {
        self.roles.get(role)
    }

    /// Iterate over roles with at least one override, in key order.
    pub fn roles(&self) -> impl Iterator<Item = (&RoleKey, &PricePair)> {
        self.roles.iter()
    }

    /// Returns true if no override of any kind is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guest.is_empty() && self.roles.is_empty()
    }
}

/// Lookup contract for an external override store.
///
/// Implementations must keep "unset" (`None`) distinct from a stored zero.
pub trait OverrideStore {
    /// The override stored for one field of one product.
    fn get_override(&self, product: ProductId, field: &OverrideField) -> Option<Money>;

    /// Collect the overrides of one product that matter for `roles`.
    fn override_set<'a>(
        &self,
        product: ProductId,
        roles: impl IntoIterator<Item = &'a RoleKey>,
    ) -> PriceOverrideSet {
        let mut set = PriceOverrideSet::new();
        let mut fields = vec![
            OverrideField::Guest(PriceKind::Regular),
            OverrideField::Guest(PriceKind::Sale),
        ];
        for role in roles {
            fields.push(OverrideField::Role(role.clone(), PriceKind::Regular));
            fields.push(OverrideField::Role(role.clone(), PriceKind::Sale));
        }
        for field in fields {
            let value = self.get_override(product, &field);
            set.set(&field, value);
        }
        set
    }
}

/// In-memory key/value product-meta store.
///
/// Values are kept as raw strings, the way a metadata table holds them, and
/// parsed on every read.
#[derive(Debug, Clone, Default)]
pub struct MemoryOverrideStore {
    meta: HashMap<ProductId, BTreeMap<String, String>>,
}

impl MemoryOverrideStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw meta value. An empty value marks the field unset.
    pub fn set_meta(&mut self, product: ProductId, key: impl Into<String>, value: impl Into<String>) {
        self.meta
            .entry(product)
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Store an override, or clear it with `None`.
    ///
    /// Administrator fields are never written.
    pub fn set_override(&mut self, product: ProductId, field: &OverrideField, value: Option<&Money>) {
        if field.is_administrator() {
            tracing::debug!(product = %product, "Ignoring administrator price override");
            return;
        }
        let raw = value.map(ToString::to_string).unwrap_or_default();
        self.set_meta(product, field.meta_key(), raw);
    }

    /// Raw meta value for a key, if present.
    #[must_use]
    pub fn meta(&self, product: ProductId, key: &str) -> Option<&str> {
        self.meta.get(&product)?.get(key).map(String::as_str)
    }

    /// The full override set of a product, built from every stored row.
    #[must_use]
    pub fn product_overrides(&self, product: ProductId) -> PriceOverrideSet {
        self.meta
            .get(&product)
            .map(|rows| {
                PriceOverrideSet::from_meta(rows.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            })
            .unwrap_or_default()
    }
}

impl OverrideStore for MemoryOverrideStore {
    fn get_override(&self, product: ProductId, field: &OverrideField) -> Option<Money> {
        if field.is_administrator() {
            return None;
        }
        Money::from_stored(self.meta(product, &field.meta_key())?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn role(key: &str) -> RoleKey {
        RoleKey::parse(key).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    #[test]
    fn test_meta_key_encoding() {
        assert_eq!(
            OverrideField::Guest(PriceKind::Regular).meta_key(),
            "_guest_regular_price"
        );
        assert_eq!(
            OverrideField::Guest(PriceKind::Sale).meta_key(),
            "_guest_sale_price"
        );
        assert_eq!(
            OverrideField::Role(role("vip"), PriceKind::Regular).meta_key(),
            "_role_regular_price_vip"
        );
        assert_eq!(
            OverrideField::Role(role("wholesale_buyer"), PriceKind::Sale).meta_key(),
            "_role_sale_price_wholesale_buyer"
        );
    }

    #[test]
    fn test_meta_key_decoding() {
        assert_eq!(
            OverrideField::from_meta_key("_guest_sale_price").unwrap(),
            OverrideField::Guest(PriceKind::Sale)
        );
        assert_eq!(
            OverrideField::from_meta_key("_role_regular_price_vip").unwrap(),
            OverrideField::Role(role("vip"), PriceKind::Regular)
        );
    }

    #[test]
    fn test_meta_key_rejects_unknown_and_administrator() {
        assert!(matches!(
            OverrideField::from_meta_key("_price"),
            Err(MetaKeyError::Unknown(_))
        ));
        assert!(matches!(
            OverrideField::from_meta_key("_role_sale_price_"),
            Err(MetaKeyError::InvalidRole { .. })
        ));
        assert_eq!(
            OverrideField::from_meta_key("_role_sale_price_administrator"),
            Err(MetaKeyError::Administrator)
        );
    }

    #[test]
    fn test_from_meta_skips_empty_and_malformed() {
        let set = PriceOverrideSet::from_meta([
            ("_guest_regular_price", "80.00"),
            ("_guest_sale_price", ""),
            ("_role_regular_price_vip", "not-a-price"),
            ("_role_sale_price_vip", "0"),
            ("_role_sale_price_administrator", "1.00"),
            ("_sku", "NP-001"),
        ]);

        assert_eq!(set.guest.regular, Some(money("80.00")));
        assert_eq!(set.guest.sale, None);
        let vip = set.role(&role("vip")).unwrap();
        assert_eq!(vip.regular, None);
        assert_eq!(vip.sale, Some(money("0")));
        assert!(set.role(&RoleKey::administrator()).is_none());
    }

    #[test]
    fn test_set_never_stores_administrator() {
        let mut set = PriceOverrideSet::new();
        let field = OverrideField::Role(RoleKey::administrator(), PriceKind::Regular);
        set.set(&field, Some(money("1.00")));
        assert_eq!(set.get(&field), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_clearing_last_role_price_drops_role() {
        let mut set = PriceOverrideSet::new();
        let field = OverrideField::Role(role("vip"), PriceKind::Sale);
        set.set(&field, Some(money("5")));
        assert!(set.role(&role("vip")).is_some());
        set.set(&field, None);
        assert!(set.role(&role("vip")).is_none());
    }

    #[test]
    fn test_memory_store_unset_is_not_zero() {
        let product = ProductId::new(1);
        let mut store = MemoryOverrideStore::new();
        store.set_meta(product, "_guest_regular_price", "");
        store.set_meta(product, "_guest_sale_price", "0");

        assert_eq!(
            store.get_override(product, &OverrideField::Guest(PriceKind::Regular)),
            None
        );
        assert_eq!(
            store.get_override(product, &OverrideField::Guest(PriceKind::Sale)),
            Some(money("0"))
        );
    }

    #[test]
    fn test_memory_store_hides_administrator_rows() {
        let product = ProductId::new(1);
        let mut store = MemoryOverrideStore::new();
        store.set_meta(product, "_role_regular_price_administrator", "1.00");

        let field = OverrideField::Role(RoleKey::administrator(), PriceKind::Regular);
        assert_eq!(store.get_override(product, &field), None);

        store.set_override(product, &field, Some(&money("2.00")));
        assert_eq!(
            store.meta(product, "_role_regular_price_administrator"),
            Some("1.00")
        );
    }

    #[test]
    fn test_override_set_collects_requested_roles() {
        let product = ProductId::new(3);
        let mut store = MemoryOverrideStore::new();
        store.set_override(
            product,
            &OverrideField::Role(role("vip"), PriceKind::Sale),
            Some(&money("40.00")),
        );
        store.set_override(
            product,
            &OverrideField::Role(role("other"), PriceKind::Sale),
            Some(&money("1.00")),
        );

        let vip = role("vip");
        let set = store.override_set(product, [&vip]);
        assert_eq!(set.role(&vip).unwrap().sale, Some(money("40.00")));
        assert!(set.role(&role("other")).is_none());
    }

    #[test]
    fn test_product_overrides_reads_all_rows() {
        let product = ProductId::new(4);
        let mut store = MemoryOverrideStore::new();
        store.set_meta(product, "_role_regular_price_a", "1");
        store.set_meta(product, "_role_regular_price_b", "2");

        let set = store.product_overrides(product);
        assert_eq!(set.roles().count(), 2);
        assert!(store.product_overrides(ProductId::new(99)).is_empty());
    }
}
