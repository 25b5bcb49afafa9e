//! Account roles.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known [`Role`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected `user` or `admin`)")]
pub struct RoleParseError(pub String);

/// Authorization level of an account.
///
/// Every account has exactly one role. New registrations start as
/// [`Role::User`]; promotion to [`Role::Admin`] is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "account_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer.
    #[default]
    User,
    /// Store administrator.
    Admin,
}

impl Role {
    /// Whether this role satisfies a route's `required` role.
    ///
    /// Roles are not hierarchical: the check is an exact match.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        match (self, required) {
            (Self::User, Self::User) | (Self::Admin, Self::Admin) => true,
            (Self::User, Self::Admin) | (Self::Admin, Self::User) => false,
        }
    }

    /// The lowercase wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfies_is_exact_match() {
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(Role::User.satisfies(Role::User));
        assert!(!Role::User.satisfies(Role::Admin));
        assert!(!Role::Admin.satisfies(Role::User));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("Admin".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }
}
