//! Turning admin form input into stored overrides.
//!
//! The resolver trusts what it reads, so this is where bad input is stopped:
//! prices are normalized, non-prices are rejected and administrator fields
//! are refused.

use crate::overrides::{MetaKeyError, OverrideField, PriceOverrideSet};
use crate::types::{Money, MoneyError};

/// Errors raised while normalizing submitted prices.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthoringError {
    /// The submitted key is not an override field.
    #[error("invalid field: {0}")]
    InvalidField(#[from] MetaKeyError),
    /// The field belongs to the administrator role.
    #[error("administrator prices cannot be set")]
    AdministratorField,
    /// The submitted value is not a valid price.
    #[error("invalid price {input:?} for {field}: {source}")]
    InvalidPrice {
        /// Meta key of the field.
        field: String,
        /// The raw submitted value.
        input: String,
        /// Why the value was rejected.
        source: MoneyError,
    },
}

/// Raw values submitted for a product's override fields.
///
/// Only submitted fields are changed when the submission is applied; fields
/// left out keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct OverrideSubmission {
    entries: Vec<(OverrideField, String)>,
}

impl OverrideSubmission {
    /// Create an empty submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw value for a field.
    pub fn push(&mut self, field: OverrideField, input: impl Into<String>) {
        self.entries.push((field, input.into()));
    }

    /// Add a raw value for a field named by its meta key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not an override field or names the
    /// administrator role.
    pub fn push_meta(&mut self, key: &str, input: impl Into<String>) -> Result<(), AuthoringError> {
        let field = OverrideField::from_meta_key(key).map_err(|e| match e {
            MetaKeyError::Administrator => AuthoringError::AdministratorField,
            other => AuthoringError::InvalidField(other),
        })?;
        self.push(field, input);
        Ok(())
    }

    /// Returns true if nothing was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalize every submitted value.
    ///
    /// Empty input becomes `None` (clear the override).
    ///
    /// # Errors
    ///
    /// Fails on the first administrator field or invalid price. Nothing is
    /// returned for partially valid submissions.
    pub fn normalize(&self) -> Result<Vec<(OverrideField, Option<Money>)>, AuthoringError> {
        self.entries
            .iter()
            .map(|(field, input)| {
                if field.is_administrator() {
                    return Err(AuthoringError::AdministratorField);
                }
                let value =
                    Money::from_input(input).map_err(|source| AuthoringError::InvalidPrice {
                        field: field.meta_key(),
                        input: input.clone(),
                        source,
                    })?;
                Ok((field.clone(), value))
            })
            .collect()
    }

    /// Normalize and write the submission into an override set.
    ///
    /// # Errors
    ///
    /// See [`OverrideSubmission::normalize`]. The set is left untouched on error.
    pub fn apply(&self, overrides: &mut PriceOverrideSet) -> Result<usize, AuthoringError> {
        let changes = self.normalize()?;
        let count = changes.len();
        for (field, value) in changes {
            overrides.set(&field, value);
        }
        tracing::debug!(fields = count, "Applied price override submission");
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::overrides::PriceKind;
    use crate::types::RoleKey;

    fn role(key: &str) -> RoleKey {
        RoleKey::parse(key).unwrap()
    }

    #[test]
    fn test_normalize_accepts_decimal_comma_and_clears_empty() {
        let mut submission = OverrideSubmission::new();
        submission
            .push_meta("_role_regular_price_vip", " 1,5 ")
            .unwrap();
        submission.push_meta("_guest_sale_price", "").unwrap();

        let changes = submission.normalize().unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(
            changes[0],
            (
                OverrideField::Role(role("vip"), PriceKind::Regular),
                Some(Money::parse("1.5").unwrap())
            )
        );
        assert_eq!(changes[1], (OverrideField::Guest(PriceKind::Sale), None));
    }

    #[test]
    fn test_normalize_rejects_non_prices() {
        for bad in ["abc", "-1", "1.2.3"] {
            let mut submission = OverrideSubmission::new();
            submission.push(OverrideField::Guest(PriceKind::Regular), bad);
            let err = submission.normalize().unwrap_err();
            assert!(
                matches!(err, AuthoringError::InvalidPrice { ref input, .. } if input == bad),
                "{bad} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_administrator_fields_are_refused() {
        let mut submission = OverrideSubmission::new();
        assert_eq!(
            submission.push_meta("_role_sale_price_administrator", "1.00"),
            Err(AuthoringError::AdministratorField)
        );

        submission.push(
            OverrideField::Role(RoleKey::administrator(), PriceKind::Sale),
            "1.00",
        );
        assert_eq!(
            submission.normalize(),
            Err(AuthoringError::AdministratorField)
        );
    }

    #[test]
    fn test_unknown_key_is_invalid_field() {
        let mut submission = OverrideSubmission::new();
        assert!(matches!(
            submission.push_meta("_regular_price", "1.00"),
            Err(AuthoringError::InvalidField(_))
        ));
        assert!(submission.is_empty());
    }

    #[test]
    fn test_apply_only_touches_submitted_fields() {
        let mut overrides = PriceOverrideSet::from_meta([
            ("_guest_regular_price", "80.00"),
            ("_role_sale_price_vip", "40.00"),
        ]);

        let mut submission = OverrideSubmission::new();
        submission.push_meta("_role_sale_price_vip", "").unwrap();
        submission.push_meta("_role_regular_price_vip", "55").unwrap();
        assert_eq!(submission.apply(&mut overrides).unwrap(), 2);

        assert_eq!(overrides.guest.regular, Some(Money::parse("80.00").unwrap()));
        let vip = overrides.role(&role("vip")).unwrap();
        assert_eq!(vip.sale, None);
        assert_eq!(vip.regular, Some(Money::parse("55").unwrap()));
    }

    #[test]
    fn test_apply_leaves_set_untouched_on_error() {
        let mut overrides = PriceOverrideSet::from_meta([("_guest_regular_price", "80.00")]);
        let before = overrides.clone();

        let mut submission = OverrideSubmission::new();
        submission.push_meta("_guest_regular_price", "10").unwrap();
        submission.push_meta("_guest_sale_price", "oops").unwrap();
        assert!(submission.apply(&mut overrides).is_err());
        assert_eq!(overrides, before);
    }
}
