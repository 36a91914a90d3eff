//! Role Pricing Core - price resolution for guests and user roles.
//!
//! Given a product's base prices, the overrides configured for it and the
//! identity of whoever is asking, this crate decides which price is shown
//! and charged.
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access. Override data is loaded by the caller (see the `cli`
//! crate for the `PostgreSQL` and YAML stores) and handed to the resolver.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, roles and identities
//! - [`overrides`] - Override fields, their meta-key layout and override stores
//! - [`resolver`] - The price resolution algorithm
//! - [`authoring`] - Normalization of admin-submitted prices
//! - [`summary`] - Per-product override summary
//! - [`settings`] - Store-wide role pricing switches
//!
//! # Example
//!
//! ```
//! use role_pricing_core::{BasePrice, Identity, Money, PriceOverrideSet, PriceResolver, RoleKey};
//!
//! let overrides = PriceOverrideSet::from_meta([
//!     ("_role_regular_price_wholesale", "50.00"),
//!     ("_role_sale_price_vip", "40.00"),
//! ]);
//! let base = BasePrice::new(Some(Money::parse("100.00").unwrap()), None);
//! let identity = Identity::authenticated([
//!     RoleKey::parse("wholesale").unwrap(),
//!     RoleKey::parse("vip").unwrap(),
//! ]);
//!
//! let resolver = PriceResolver::default();
//! let effective = resolver.resolve_effective(&overrides, &identity, &base);
//! assert_eq!(effective.unwrap().as_str(), "40.00");
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod authoring;
pub mod overrides;
pub mod resolver;
pub mod settings;
pub mod summary;
pub mod types;

pub use authoring::{AuthoringError, OverrideSubmission};
pub use overrides::{
    MemoryOverrideStore, MetaKeyError, OverrideField, OverrideStore, PriceKind, PriceOverrideSet,
    PricePair,
};
pub use resolver::{BasePrice, PriceQuery, PriceResolver, PriceSource, Resolution, ResolvedPrices};
pub use settings::{DisplayFormat, PricingSettings};
pub use summary::{Audience, PricingSummary, SummaryLine};
pub use types::*;
