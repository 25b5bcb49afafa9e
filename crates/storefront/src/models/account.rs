//! Account domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use online_shop_core::{AccountId, Email, Role};

/// A registered customer or administrator.
///
/// The password hash is deliberately not part of this type, so an `Account`
/// can be serialized straight into a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Login email, unique across accounts.
    pub email: Email,
    /// Authorization level.
    pub role: Role,
    /// When the account was registered.
    pub registered_at: DateTime<Utc>,
}

/// Data required to insert a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
}
