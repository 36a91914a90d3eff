//! Integration tests for role pricing.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p role-pricing-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `resolution` - Resolution scenarios against the in-memory store
//! - `catalog` - YAML catalog loading, summaries and authoring

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use role_pricing_cli::Catalog;
use role_pricing_core::{Identity, RoleKey};

/// Path of a file under `tests/fixtures`.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load the shared shop catalog fixture.
///
/// # Panics
///
/// Panics if the fixture cannot be loaded.
pub async fn shop_catalog() -> Catalog {
    match Catalog::load(&fixture_path("catalog.yaml")).await {
        Ok(catalog) => catalog,
        Err(e) => panic!("failed to load catalog fixture: {e}"),
    }
}

/// A role key from a literal.
///
/// # Panics
///
/// Panics if `key` is not a valid role key.
#[must_use]
pub fn role(key: &str) -> RoleKey {
    match RoleKey::parse(key) {
        Ok(role) => role,
        Err(e) => panic!("invalid role key {key:?}: {e}"),
    }
}

/// An authenticated identity holding `keys`, in order.
#[must_use]
pub fn user(keys: &[&str]) -> Identity {
    Identity::authenticated(keys.iter().copied().map(role))
}
