//! Role keys and requester identities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`RoleKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleKeyError {
    /// The input string is empty.
    #[error("role key cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("role key must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9_-]`.
    #[error("role key contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Opaque identifier for a role, e.g. `wholesale_buyer`.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - Lowercase ASCII letters, digits, `_` and `-` only
///
/// ## Examples
///
/// ```
/// use role_pricing_core::RoleKey;
///
/// let role = RoleKey::parse("wholesale_buyer").unwrap();
/// assert!(!role.is_administrator());
/// assert!(RoleKey::administrator().is_administrator());
///
/// assert!(RoleKey::parse("").is_err());
/// assert!(RoleKey::parse("Has Spaces").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleKey(String);

impl RoleKey {
    /// Maximum length of a role key.
    pub const MAX_LENGTH: usize = 64;

    /// The administrator role. Administrators never receive role pricing.
    pub const ADMINISTRATOR: &'static str = "administrator";

    /// Parse a `RoleKey` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 64 characters, or
    /// contains characters other than lowercase ASCII letters, digits, `_`
    /// and `-`.
    pub fn parse(s: &str) -> Result<Self, RoleKeyError> {
        if s.is_empty() {
            return Err(RoleKeyError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(RoleKeyError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-'))
        {
            return Err(RoleKeyError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// The administrator role key.
    #[must_use]
    pub fn administrator() -> Self {
        Self(Self::ADMINISTRATOR.to_owned())
    }

    /// Returns true for the administrator role.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.0 == Self::ADMINISTRATOR
    }

    /// Returns the role key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RoleKey {
    type Err = RoleKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoleKey {
    type Error = RoleKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoleKey> for String {
    fn from(role: RoleKey) -> Self {
        role.0
    }
}

impl AsRef<str> for RoleKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Who is asking for a price.
///
/// Role order matters: when several roles carry an override for the same
/// price, the earliest role in `roles` wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    /// Not logged in.
    Guest,
    /// Logged in, holding zero or more roles in assignment order.
    Authenticated {
        /// Roles in the order they were assigned.
        roles: Vec<RoleKey>,
    },
}

impl Identity {
    /// Build an authenticated identity from its roles.
    #[must_use]
    pub fn authenticated(roles: impl IntoIterator<Item = RoleKey>) -> Self {
        Self::Authenticated {
            roles: roles.into_iter().collect(),
        }
    }

    /// Returns true for [`Identity::Guest`].
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    /// Returns true if the identity holds the administrator role.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        match self {
            Self::Guest => false,
            Self::Authenticated { roles } => roles.iter().any(RoleKey::is_administrator),
        }
    }

    /// Roles eligible for role pricing, in order.
    ///
    /// Empty for guests and for anyone holding the administrator role, who
    /// always sees base prices whatever other roles they hold.
    pub fn pricing_roles(&self) -> impl Iterator<Item = &RoleKey> {
        let roles: &[RoleKey] = match self {
            Self::Authenticated { roles } if !self.is_administrator() => roles,
            _ => &[],
        };
        roles.iter()
    }
}

/// Supplies the identity of the current requester.
///
/// Implementations must return roles in a stable order for the same
/// requester, since that order decides ties between role prices.
pub trait IdentityProvider {
    /// The identity making the current request.
    fn current_identity(&self) -> Identity;
}

/// An [`IdentityProvider`] that always returns the same identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity(Identity);

impl StaticIdentity {
    /// Wrap a fixed identity.
    #[must_use]
    pub const fn new(identity: Identity) -> Self {
        Self(identity)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_identity(&self) -> Identity {
        self.0.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn role(key: &str) -> RoleKey {
        RoleKey::parse(key).unwrap()
    }

    #[test]
    fn test_parse_valid_role_keys() {
        assert!(RoleKey::parse("customer").is_ok());
        assert!(RoleKey::parse("wholesale_buyer").is_ok());
        assert!(RoleKey::parse("tier-2").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(RoleKey::parse(""), Err(RoleKeyError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(65);
        assert!(matches!(
            RoleKey::parse(&long),
            Err(RoleKeyError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            RoleKey::parse("Vip"),
            Err(RoleKeyError::InvalidCharacter('V'))
        );
        assert_eq!(
            RoleKey::parse("vip buyer"),
            Err(RoleKeyError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn test_administrator() {
        assert!(role("administrator").is_administrator());
        assert!(!role("admin").is_administrator());
    }

    #[test]
    fn test_pricing_roles_keeps_assignment_order() {
        let identity = Identity::authenticated([role("vip"), role("wholesale")]);
        let roles: Vec<&str> = identity.pricing_roles().map(RoleKey::as_str).collect();
        assert_eq!(roles, ["vip", "wholesale"]);
    }

    #[test]
    fn test_pricing_roles_empty_for_administrator() {
        let identity =
            Identity::authenticated([role("vip"), role("administrator"), role("wholesale")]);
        assert!(identity.is_administrator());
        assert_eq!(identity.pricing_roles().count(), 0);
    }

    #[test]
    fn test_pricing_roles_guest_is_empty() {
        assert_eq!(Identity::Guest.pricing_roles().count(), 0);
    }

    #[test]
    fn test_identity_serde() {
        let identity = Identity::authenticated([role("vip")]);
        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(json, r#"{"kind":"authenticated","roles":["vip"]}"#);

        let guest: Identity = serde_json::from_str(r#"{"kind":"guest"}"#).unwrap();
        assert!(guest.is_guest());
    }

    #[test]
    fn test_static_identity_provider() {
        let provider = StaticIdentity::new(Identity::Guest);
        assert_eq!(provider.current_identity(), Identity::Guest);
    }
}
