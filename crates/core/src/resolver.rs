//! Price resolution.
//!
//! Picks the price a requester sees for a product out of the product's base
//! prices and its configured overrides.
//!
//! # Precedence
//!
//! | Query     | Guest                                   | Authenticated                                   |
//! |-----------|-----------------------------------------|-------------------------------------------------|
//! | regular   | guest regular > base regular            | role regular (role order) > base regular        |
//! | sale      | guest sale > base sale                  | role sale (role order) > base sale              |
//! | effective | guest sale > guest regular > base regular | role sale (all roles) > role regular (all roles) > current base price |
//!
//! For the effective price every role is checked for a sale override before
//! any role is checked for a regular override, so an earlier role's regular
//! price loses to a later role's sale price.
//!
//! The guest effective path falls back to the base *regular* price, while
//! the authenticated path falls back to the product's current price (base
//! sale when set). Callers rely on both behaviors.
//!
//! Resolution is pure: no I/O, no shared state, safe to call from any thread.

use serde::{Deserialize, Serialize};

use crate::overrides::{OverrideField, PriceKind, PriceOverrideSet};
use crate::settings::{DisplayFormat, PricingSettings};
use crate::types::{Identity, Money};

/// The product's own prices, before any override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePrice {
    #[serde(default)]
    pub regular: Option<Money>,
    #[serde(default)]
    pub sale: Option<Money>,
}

impl BasePrice {
    /// Create base prices.
    #[must_use]
    pub const fn new(regular: Option<Money>, sale: Option<Money>) -> Self {
        Self { regular, sale }
    }

    /// The base price of the given kind.
    #[must_use]
    pub const fn get(&self, kind: PriceKind) -> Option<&Money> {
        match kind {
            PriceKind::Regular => self.regular.as_ref(),
            PriceKind::Sale => self.sale.as_ref(),
        }
    }

    /// The price the product currently sells at: sale if set, else regular.
    #[must_use]
    pub fn current(&self) -> Option<&Money> {
        self.sale.as_ref().or(self.regular.as_ref())
    }
}

/// The three price questions a storefront asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceQuery {
    Regular,
    Sale,
    /// The price actually charged, preferring sale over regular.
    Effective,
}

impl PriceQuery {
    /// Override kinds to scan, one full pass each, in order.
    const fn passes(self) -> &'static [PriceKind] {
        match self {
            Self::Regular => &[PriceKind::Regular],
            Self::Sale => &[PriceKind::Sale],
            Self::Effective => &[PriceKind::Sale, PriceKind::Regular],
        }
    }
}

/// Where a resolved price came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PriceSource {
    /// A guest or role override.
    Override {
        /// The meta key of the winning field.
        field: String,
    },
    /// The product's base price (which may itself be unset).
    Base,
}

/// A resolved price and its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub price: Option<Money>,
    #[serde(flatten)]
    pub source: PriceSource,
}

/// All three resolved prices for one product and requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrices {
    pub regular: Option<Money>,
    pub sale: Option<Money>,
    pub effective: Option<Money>,
    /// The product's base regular price, kept for "show original" display.
    pub original: Option<Money>,
}

impl ResolvedPrices {
    /// Returns true if the effective price is strictly below the resolved
    /// regular price. A sale price equal to or above regular is not a sale.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        match (&self.effective, &self.regular) {
            (Some(effective), Some(regular)) => effective.amount() < regular.amount(),
            _ => false,
        }
    }

    /// The original price to show next to the effective one, if any.
    ///
    /// Only [`DisplayFormat::ShowOriginal`] shows it, and only when it
    /// differs from the effective price.
    #[must_use]
    pub fn display_original(&self, format: DisplayFormat) -> Option<&Money> {
        if format != DisplayFormat::ShowOriginal {
            return None;
        }
        let original = self.original.as_ref()?;
        let effective = self.effective.as_ref()?;
        (original.amount() != effective.amount()).then_some(original)
    }
}

/// Resolves prices for a requester.
///
/// Stateless apart from its settings; cheap to copy and share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceResolver {
    settings: PricingSettings,
}

impl PriceResolver {
    /// Create a resolver with the given settings.
    #[must_use]
    pub const fn new(settings: PricingSettings) -> Self {
        Self { settings }
    }

    /// The settings in effect.
    #[must_use]
    pub const fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    /// Resolve the regular price.
    #[must_use]
    pub fn resolve_regular(
        &self,
        overrides: &PriceOverrideSet,
        identity: &Identity,
        base: &BasePrice,
    ) -> Option<Money> {
        self.resolve(PriceQuery::Regular, overrides, identity, base)
    }

    /// Resolve the sale price.
    #[must_use]
    pub fn resolve_sale(
        &self,
        overrides: &PriceOverrideSet,
        identity: &Identity,
        base: &BasePrice,
    ) -> Option<Money> {
        self.resolve(PriceQuery::Sale, overrides, identity, base)
    }

    /// Resolve the effective (charged) price.
    #[must_use]
    pub fn resolve_effective(
        &self,
        overrides: &PriceOverrideSet,
        identity: &Identity,
        base: &BasePrice,
    ) -> Option<Money> {
        self.resolve(PriceQuery::Effective, overrides, identity, base)
    }

    /// Resolve one query.
    #[must_use]
    pub fn resolve(
        &self,
        query: PriceQuery,
        overrides: &PriceOverrideSet,
        identity: &Identity,
        base: &BasePrice,
    ) -> Option<Money> {
        self.resolve_detailed(query, overrides, identity, base).price
    }

    /// Resolve one query and report which tier produced the price.
    #[must_use]
    pub fn resolve_detailed(
        &self,
        query: PriceQuery,
        overrides: &PriceOverrideSet,
        identity: &Identity,
        base: &BasePrice,
    ) -> Resolution {
        if self.overrides_enabled(identity) {
            if let Some((field, price)) = first_override(query, overrides, identity) {
                tracing::trace!(?query, field = %field, price = %price, "Resolved price override");
                return Resolution {
                    price: Some(price.clone()),
                    source: PriceSource::Override {
                        field: field.meta_key(),
                    },
                };
            }
        }

        Resolution {
            price: base_fallback(query, identity, base).cloned(),
            source: PriceSource::Base,
        }
    }

    /// Resolve all three queries at once.
    #[must_use]
    pub fn resolve_all(
        &self,
        overrides: &PriceOverrideSet,
        identity: &Identity,
        base: &BasePrice,
    ) -> ResolvedPrices {
        ResolvedPrices {
            regular: self.resolve_regular(overrides, identity, base),
            sale: self.resolve_sale(overrides, identity, base),
            effective: self.resolve_effective(overrides, identity, base),
            original: base.regular.clone(),
        }
    }

    const fn overrides_enabled(&self, identity: &Identity) -> bool {
        match identity {
            Identity::Guest => self.settings.enable_guest_pricing,
            Identity::Authenticated { .. } => self.settings.enable_role_pricing,
        }
    }
}

/// First set override for a query: one full pass over the requester's
/// fields per price kind, in the query's pass order.
fn first_override<'a>(
    query: PriceQuery,
    overrides: &'a PriceOverrideSet,
    identity: &Identity,
) -> Option<(OverrideField, &'a Money)> {
    query.passes().iter().find_map(|&kind| match identity {
        Identity::Guest => {
            let field = OverrideField::Guest(kind);
            overrides.get(&field).map(|price| (field, price))
        }
        Identity::Authenticated { .. } => identity.pricing_roles().find_map(|role| {
            let price = overrides.role(role)?.get(kind)?;
            Some((OverrideField::Role(role.clone(), kind), price))
        }),
    })
}

fn base_fallback<'a>(
    query: PriceQuery,
    identity: &Identity,
    base: &'a BasePrice,
) -> Option<&'a Money> {
    match (query, identity) {
        (PriceQuery::Regular, _) => base.get(PriceKind::Regular),
        (PriceQuery::Sale, _) => base.get(PriceKind::Sale),
        (PriceQuery::Effective, Identity::Guest) => base.get(PriceKind::Regular),
        (PriceQuery::Effective, Identity::Authenticated { .. }) => base.current(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::RoleKey;

    fn role(key: &str) -> RoleKey {
        RoleKey::parse(key).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    fn some(s: &str) -> Option<Money> {
        Some(money(s))
    }

    fn base(regular: &str, sale: Option<&str>) -> BasePrice {
        BasePrice::new(some(regular), sale.map(money))
    }

    fn with_role(set: &mut PriceOverrideSet, key: &str, kind: PriceKind, price: &str) {
        set.set(&OverrideField::Role(role(key), kind), some(price));
    }

    fn with_guest(set: &mut PriceOverrideSet, kind: PriceKind, price: &str) {
        set.set(&OverrideField::Guest(kind), some(price));
    }

    fn user(roles: &[&str]) -> Identity {
        Identity::authenticated(roles.iter().map(|r| role(r)))
    }

    #[test]
    fn test_no_overrides_returns_base() {
        let resolver = PriceResolver::default();
        let overrides = PriceOverrideSet::new();
        let base = base("100.00", Some("90.00"));

        for identity in [Identity::Guest, user(&["vip"]), user(&[])] {
            assert_eq!(
                resolver.resolve_regular(&overrides, &identity, &base),
                some("100.00")
            );
            assert_eq!(
                resolver.resolve_sale(&overrides, &identity, &base),
                some("90.00")
            );
        }
    }

    #[test]
    fn test_guest_uses_guest_overrides_only() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::new();
        with_role(&mut overrides, "vip", PriceKind::Regular, "10.00");
        with_role(&mut overrides, "vip", PriceKind::Sale, "5.00");
        let base = base("100.00", None);

        let prices = resolver.resolve_all(&overrides, &Identity::Guest, &base);
        assert_eq!(prices.regular, some("100.00"));
        assert_eq!(prices.sale, None);
        assert_eq!(prices.effective, some("100.00"));
    }

    #[test]
    fn test_guest_regular_override_example() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::new();
        with_guest(&mut overrides, PriceKind::Regular, "80.00");
        let base = base("100.00", None);

        assert_eq!(
            resolver.resolve_effective(&overrides, &Identity::Guest, &base),
            some("80.00")
        );
        assert_eq!(
            resolver.resolve_regular(&overrides, &Identity::Guest, &base),
            some("80.00")
        );
        assert_eq!(resolver.resolve_sale(&overrides, &Identity::Guest, &base), None);
    }

    #[test]
    fn test_guest_effective_prefers_guest_sale() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::new();
        with_guest(&mut overrides, PriceKind::Regular, "80.00");
        with_guest(&mut overrides, PriceKind::Sale, "70.00");

        assert_eq!(
            resolver.resolve_effective(&overrides, &Identity::Guest, &base("100.00", None)),
            some("70.00")
        );
    }

    #[test]
    fn test_guest_effective_falls_back_to_base_regular_even_when_on_sale() {
        let resolver = PriceResolver::default();
        let overrides = PriceOverrideSet::new();
        let base = base("100.00", Some("75.00"));

        assert_eq!(
            resolver.resolve_effective(&overrides, &Identity::Guest, &base),
            some("100.00")
        );
        // The authenticated path falls back to the current (sale) price instead.
        assert_eq!(
            resolver.resolve_effective(&overrides, &user(&["customer"]), &base),
            some("75.00")
        );
    }

    #[test]
    fn test_regular_skips_roles_without_override() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::new();
        with_role(&mut overrides, "b", PriceKind::Regular, "60.00");

        assert_eq!(
            resolver.resolve_regular(&overrides, &user(&["a", "b"]), &base("100.00", None)),
            some("60.00")
        );
    }

    #[test]
    fn test_earliest_role_wins_ties() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::new();
        with_role(&mut overrides, "a", PriceKind::Regular, "60.00");
        with_role(&mut overrides, "b", PriceKind::Regular, "50.00");
        let base = base("100.00", None);

        assert_eq!(
            resolver.resolve_regular(&overrides, &user(&["a", "b"]), &base),
            some("60.00")
        );
        assert_eq!(
            resolver.resolve_regular(&overrides, &user(&["b", "a"]), &base),
            some("50.00")
        );
    }

    #[test]
    fn test_effective_scans_all_sale_overrides_first() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::new();
        with_role(&mut overrides, "wholesale", PriceKind::Regular, "50.00");
        with_role(&mut overrides, "vip", PriceKind::Sale, "40.00");
        let identity = user(&["wholesale", "vip"]);
        let base = base("100.00", None);

        assert_eq!(
            resolver.resolve_effective(&overrides, &identity, &base),
            some("40.00")
        );
        assert_eq!(
            resolver.resolve_regular(&overrides, &identity, &base),
            some("50.00")
        );
        assert_eq!(
            resolver.resolve_sale(&overrides, &identity, &base),
            some("40.00")
        );
    }

    #[test]
    fn test_effective_uses_role_regular_when_no_sale() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::new();
        with_role(&mut overrides, "wholesale", PriceKind::Regular, "50.00");

        assert_eq!(
            resolver.resolve_effective(
                &overrides,
                &user(&["wholesale"]),
                &base("100.00", Some("90.00"))
            ),
            some("50.00")
        );
    }

    #[test]
    fn test_zero_override_is_honored() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::new();
        with_guest(&mut overrides, PriceKind::Regular, "0");

        assert_eq!(
            resolver.resolve_regular(&overrides, &Identity::Guest, &base("100.00", None)),
            some("0")
        );
    }

    #[test]
    fn test_administrator_gets_base_price() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::from_meta([
            ("_role_regular_price_administrator", "1.00"),
            ("_role_sale_price_administrator", "0.50"),
        ]);
        with_role(&mut overrides, "vip", PriceKind::Sale, "40.00");
        let base = base("100.00", None);

        for identity in [user(&["administrator"]), user(&["administrator", "vip"])] {
            let prices = resolver.resolve_all(&overrides, &identity, &base);
            assert_eq!(prices.regular, some("100.00"));
            assert_eq!(prices.sale, None);
            assert_eq!(prices.effective, some("100.00"));
        }
    }

    #[test]
    fn test_missing_base_price_is_none() {
        let resolver = PriceResolver::default();
        let prices = resolver.resolve_all(
            &PriceOverrideSet::new(),
            &user(&["vip"]),
            &BasePrice::default(),
        );
        assert_eq!(prices.regular, None);
        assert_eq!(prices.sale, None);
        assert_eq!(prices.effective, None);
    }

    #[test]
    fn test_disabled_guest_pricing_returns_base() {
        let resolver = PriceResolver::new(PricingSettings {
            enable_guest_pricing: false,
            ..PricingSettings::default()
        });
        let mut overrides = PriceOverrideSet::new();
        with_guest(&mut overrides, PriceKind::Regular, "80.00");
        with_role(&mut overrides, "vip", PriceKind::Regular, "70.00");
        let base = base("100.00", None);

        assert_eq!(
            resolver.resolve_effective(&overrides, &Identity::Guest, &base),
            some("100.00")
        );
        assert_eq!(
            resolver.resolve_effective(&overrides, &user(&["vip"]), &base),
            some("70.00")
        );
    }

    #[test]
    fn test_disabled_role_pricing_returns_base() {
        let resolver = PriceResolver::new(PricingSettings {
            enable_role_pricing: false,
            ..PricingSettings::default()
        });
        let mut overrides = PriceOverrideSet::new();
        with_guest(&mut overrides, PriceKind::Regular, "80.00");
        with_role(&mut overrides, "vip", PriceKind::Regular, "70.00");
        let base = base("100.00", None);

        assert_eq!(
            resolver.resolve_effective(&overrides, &user(&["vip"]), &base),
            some("100.00")
        );
        assert_eq!(
            resolver.resolve_effective(&overrides, &Identity::Guest, &base),
            some("80.00")
        );
    }

    #[test]
    fn test_resolve_detailed_reports_source() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::new();
        with_role(&mut overrides, "vip", PriceKind::Sale, "40.00");
        let base = base("100.00", None);

        let resolution =
            resolver.resolve_detailed(PriceQuery::Effective, &overrides, &user(&["vip"]), &base);
        assert_eq!(resolution.price, some("40.00"));
        assert_eq!(
            resolution.source,
            PriceSource::Override {
                field: "_role_sale_price_vip".to_owned()
            }
        );

        let resolution =
            resolver.resolve_detailed(PriceQuery::Regular, &overrides, &user(&["vip"]), &base);
        assert_eq!(resolution.source, PriceSource::Base);
    }

    #[test]
    fn test_is_on_sale_and_display_original() {
        let resolver = PriceResolver::default();
        let mut overrides = PriceOverrideSet::new();
        with_role(&mut overrides, "vip", PriceKind::Sale, "40.00");
        let prices = resolver.resolve_all(&overrides, &user(&["vip"]), &base("100.00", None));

        assert!(prices.is_on_sale());
        assert_eq!(prices.display_original(DisplayFormat::Normal), None);
        assert_eq!(
            prices.display_original(DisplayFormat::ShowOriginal),
            Some(&money("100.00"))
        );

        let plain = resolver.resolve_all(
            &PriceOverrideSet::new(),
            &Identity::Guest,
            &base("100.00", None),
        );
        assert!(!plain.is_on_sale());
        assert_eq!(plain.display_original(DisplayFormat::ShowOriginal), None);
    }

    #[test]
    fn test_sale_at_or_above_regular_is_not_on_sale() {
        let resolver = PriceResolver::default();
        for sale in ["100.00", "100", "120.00"] {
            let mut overrides = PriceOverrideSet::new();
            with_role(&mut overrides, "vip", PriceKind::Sale, sale);
            let prices = resolver.resolve_all(&overrides, &user(&["vip"]), &base("100.00", None));

            assert_eq!(prices.effective, Some(money(sale)));
            assert!(!prices.is_on_sale(), "{sale}");
        }
    }
}
