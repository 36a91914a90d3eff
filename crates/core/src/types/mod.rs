//! Core types for role pricing.
//!
//! This module provides type-safe wrappers for the domain concepts the
//! resolver works with.

pub mod id;
pub mod money;
pub mod role;

pub use id::*;
pub use money::{Money, MoneyError};
pub use role::{Identity, IdentityProvider, RoleKey, RoleKeyError, StaticIdentity};
