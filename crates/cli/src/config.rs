//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (database commands only)
//! - `ROLE_PRICING_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `ROLE_PRICING_ENABLE_GUEST` - Apply guest prices (default: true)
//! - `ROLE_PRICING_ENABLE_ROLES` - Apply role prices (default: true)
//! - `ROLE_PRICING_DISPLAY_FORMAT` - `normal` or `show_original` (default: normal)

use role_pricing_core::{DisplayFormat, PricingSettings};
use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Role pricing switches
    pub settings: PricingSettings,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an optional variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("ROLE_PRICING_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from);

        let defaults = PricingSettings::default();
        let settings = PricingSettings {
            enable_guest_pricing: parse_bool(
                "ROLE_PRICING_ENABLE_GUEST",
                lookup("ROLE_PRICING_ENABLE_GUEST"),
                defaults.enable_guest_pricing,
            )?,
            enable_role_pricing: parse_bool(
                "ROLE_PRICING_ENABLE_ROLES",
                lookup("ROLE_PRICING_ENABLE_ROLES"),
                defaults.enable_role_pricing,
            )?,
            display_format: match lookup("ROLE_PRICING_DISPLAY_FORMAT") {
                Some(value) => value.parse::<DisplayFormat>().map_err(|e| {
                    ConfigError::InvalidEnvVar("ROLE_PRICING_DISPLAY_FORMAT".to_string(), e)
                })?,
                None => defaults.display_format,
            },
        };

        Ok(Self {
            database_url,
            settings,
        })
    }

    /// The database URL, required by commands that touch `PostgreSQL`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no database URL is configured.
    pub fn require_database_url(&self) -> Result<&SecretString, ConfigError> {
        self.database_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("ROLE_PRICING_DATABASE_URL".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a boolean flag, accepting `true/false`, `1/0`, `yes/no`, `on/off`.
fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}
