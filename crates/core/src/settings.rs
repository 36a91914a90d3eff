//! Store-wide switches for role pricing.

use serde::{Deserialize, Serialize};

/// How a resolved price is presented next to the product's own price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    /// Show only the resolved price.
    #[default]
    Normal,
    /// Show the product's regular price struck through next to the resolved price.
    ShowOriginal,
}

impl DisplayFormat {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::ShowOriginal => "show_original",
        }
    }
}

impl std::fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DisplayFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "show_original" => Ok(Self::ShowOriginal),
            _ => Err(format!("unknown display format: {s}")),
        }
    }
}

/// Role pricing settings.
///
/// Both switches default to on, which leaves resolution untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Apply guest overrides to requesters who are not logged in.
    pub enable_guest_pricing: bool,
    /// Apply role overrides to logged-in requesters.
    pub enable_role_pricing: bool,
    /// Presentation hint for the display layer.
    pub display_format: DisplayFormat,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            enable_guest_pricing: true,
            enable_role_pricing: true,
            display_format: DisplayFormat::Normal,
        }
    }
}
