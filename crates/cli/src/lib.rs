//! Role Pricing CLI library.
//!
//! Holds everything the `rp-cli` binary needs that is worth testing on its
//! own: environment configuration, YAML catalogs and the `PostgreSQL` store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;

pub use catalog::{Catalog, CatalogError, CatalogProduct};
pub use config::{CliConfig, ConfigError};
