//! Authentication service.
//!
//! Password registration and login, account lookup, admin promotion and
//! first-boot admin seeding. Token issuing lives in [`token`], hashing in
//! [`password`].

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TOKEN_TTL, TokenError, TokenService};

use secrecy::{ExposeSecret, SecretString};

use online_shop_core::{AccountId, Email, Role};

use crate::db::{AccountStore, RepositoryError};
use crate::models::{Account, NewAccount};
use password::{hash_password, validate_password, verify_password};

/// Account and credential operations over any [`AccountStore`].
pub struct AccountService<'a, S: AccountStore + ?Sized> {
    accounts: &'a S,
}

impl<'a, S: AccountStore + ?Sized> AccountService<'a, S> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(accounts: &'a S) -> Self {
        Self { accounts }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new customer account with role `user`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::AccountExists` if the email is already registered.
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        self.create(email, password, Role::User).await
    }

    /// Create an account with role `admin`.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub async fn create_admin(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        self.create(email, password, Role::Admin).await
    }

    async fn create(&self, email: &str, password: &str, role: Role) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let account = self
            .accounts
            .create_account(NewAccount {
                email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AccountExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(account_id = %account.id, role = %account.role, "account created");
        Ok(account)
    }

    /// Check an email/password pair.
    ///
    /// Unknown emails and wrong passwords fail the same way.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;

        let (account, password_hash) = self
            .accounts
            .find_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(account)
    }

    // =========================================================================
    // Account Management
    // =========================================================================

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the account doesn't exist.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AuthError> {
        self.accounts
            .find_account(id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    /// Give an account the admin role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the account doesn't exist.
    /// Returns `AuthError::AlreadyAdmin` if it is already an admin.
    pub async fn promote(&self, id: AccountId) -> Result<Account, AuthError> {
        let account = self.get_account(id).await?;
        if account.role == Role::Admin {
            return Err(AuthError::AlreadyAdmin);
        }

        let promoted = self
            .accounts
            .update_role(id, Role::Admin)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::AccountNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(account_id = %id, "account promoted to admin");
        Ok(promoted)
    }

    /// Create the configured admin account unless one with that email
    /// already exists.
    ///
    /// Returns the new account, or `None` if nothing was created.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`create_admin`](Self::create_admin),
    /// except that an existing account is not an error.
    pub async fn ensure_initial_admin(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Option<Account>, AuthError> {
        let parsed = Email::parse(email)?;
        if let Some(existing) = self.accounts.find_account_by_email(&parsed).await? {
            tracing::info!(
                account_id = %existing.id,
                role = %existing.role,
                "initial admin already exists, skipping"
            );
            return Ok(None);
        }

        match self.create_admin(email, password.expose_secret()).await {
            Ok(account) => Ok(Some(account)),
            Err(AuthError::AccountExists) => {
                tracing::info!("initial admin created concurrently, skipping");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let service = AccountService::new(&store);

        let created = service
            .register("shopper@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(created.role, Role::User);

        let logged_in = service
            .login("shopper@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(logged_in, created);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = MemoryStore::new();
        let service = AccountService::new(&store);
        service.register("a@example.com", "password1").await.unwrap();

        let err = service
            .register("a@example.com", "password2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountExists));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let store = MemoryStore::new();
        let service = AccountService::new(&store);

        assert!(matches!(
            service.register("not-an-email", "password1").await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            service.register("a@example.com", "short").await,
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = MemoryStore::new();
        let service = AccountService::new(&store);
        service.register("a@example.com", "password1").await.unwrap();

        let wrong_password = service.login("a@example.com", "password2").await;
        let unknown_email = service.login("b@example.com", "password1").await;
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_promote() {
        let store = MemoryStore::new();
        let service = AccountService::new(&store);
        let account = service.register("a@example.com", "password1").await.unwrap();

        let promoted = service.promote(account.id).await.unwrap();
        assert_eq!(promoted.role, Role::Admin);

        assert!(matches!(
            service.promote(account.id).await,
            Err(AuthError::AlreadyAdmin)
        ));
        assert!(matches!(
            service.promote(AccountId::new(999)).await,
            Err(AuthError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn test_ensure_initial_admin_is_idempotent() {
        let store = MemoryStore::new();
        let service = AccountService::new(&store);
        let password = SecretString::from("admin-password".to_owned());

        let first = service
            .ensure_initial_admin("admin@example.com", &password)
            .await
            .unwrap();
        assert_eq!(first.unwrap().role, Role::Admin);

        let second = service
            .ensure_initial_admin("admin@example.com", &password)
            .await
            .unwrap();
        assert!(second.is_none());
    }
}
