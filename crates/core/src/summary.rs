//! Per-product summary of configured overrides.
//!
//! This is the data behind the "Role Pricing" column of a product list: one
//! line per identity category that has any override set.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::overrides::{PriceOverrideSet, PricePair};
use crate::types::{Money, RoleKey};

/// Who a summary line applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum Audience {
    Guest,
    Role(RoleKey),
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => f.write_str("Guest"),
            Self::Role(role) => write!(f, "{role}"),
        }
    }
}

/// One summary line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub audience: Audience,
    pub regular: Option<Money>,
    pub sale: Option<Money>,
}

impl fmt::Display for SummaryLine {
    /// `Guest: 80.00` with a regular price only, `vip: 100.00 -> 80.00` when
    /// a sale price is set (regular shown as `-` when unset).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.audience)?;
        match (&self.regular, &self.sale) {
            (regular, Some(sale)) => {
                let regular = regular.as_ref().map_or("-", Money::as_str);
                write!(f, "{regular} -> {sale}")
            }
            (Some(regular), None) => write!(f, "{regular}"),
            (None, None) => f.write_str("-"),
        }
    }
}

/// The override summary of one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSummary {
    pub lines: Vec<SummaryLine>,
}

impl PricingSummary {
    /// Placeholder shown when no override is set.
    pub const EMPTY_MARKER: &'static str = "\u{2014}";

    /// Summarize `overrides` for the known `roles`, in the given order.
    ///
    /// The guest line comes first. Roles without any override and the
    /// administrator role are left out.
    pub fn build<'a>(
        overrides: &PriceOverrideSet,
        roles: impl IntoIterator<Item = &'a RoleKey>,
    ) -> Self {
        let mut lines = Vec::new();

        if !overrides.guest.is_empty() {
            lines.push(line(Audience::Guest, &overrides.guest));
        }

        for role in roles {
            if role.is_administrator() {
                continue;
            }
            if let Some(pair) = overrides.role(role).filter(|pair| !pair.is_empty()) {
                lines.push(line(Audience::Role(role.clone()), pair));
            }
        }

        Self { lines }
    }

    /// Returns true if no line was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn line(audience: Audience, pair: &PricePair) -> SummaryLine {
    SummaryLine {
        audience,
        regular: pair.regular.clone(),
        sale: pair.sale.clone(),
    }
}

impl fmt::Display for PricingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lines.is_empty() {
            return f.write_str(Self::EMPTY_MARKER);
        }
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}
