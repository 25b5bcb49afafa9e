//! Account store: credential lookup, registration and role changes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use online_shop_core::{AccountId, Email, Role};

use super::{PgStore, RepositoryError};
use crate::models::{Account, NewAccount};

/// Persistence operations for accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Get an account by its ID.
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Get an account by its exact email.
    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, RepositoryError>;

    /// Get an account together with its password hash, for login.
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError>;

    /// Insert a new account.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    async fn create_account(&self, account: NewAccount) -> Result<Account, RepositoryError>;

    /// Set an account's role.
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    async fn update_role(&self, id: AccountId, role: Role) -> Result<Account, RepositoryError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i32,
    email: String,
    role: Role,
    registered_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AccountId::new(row.id),
            email,
            role: row.role,
            registered_at: row.registered_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, email, role, registered_at
            FROM accounts
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .map(Account::try_from)
        .transpose()
    }

    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, RepositoryError> {
        sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, email, role, registered_at
            FROM accounts
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool())
        .await?
        .map(Account::try_from)
        .transpose()
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, email, role, registered_at, password_hash
            FROM accounts
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(r) => Ok(Some((r.account.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO accounts (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, role, registered_at
            ",
        )
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.role)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "email already exists"))?
        .try_into()
    }

    async fn update_role(&self, id: AccountId, role: Role) -> Result<Account, RepositoryError> {
        sqlx::query_as::<_, AccountRow>(
            r"
            UPDATE accounts
            SET role = $1
            WHERE id = $2
            RETURNING id, email, role, registered_at
            ",
        )
        .bind(role)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }
}
