//! Admin account management commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (or `DATABASE_URL`)

use thiserror::Error;

use online_shop_core::AccountId;
use online_shop_storefront::db::PgStore;
use online_shop_storefront::models::Account;
use online_shop_storefront::services::{AccountService, AuthError};

use super::{CommandError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new admin account.
///
/// # Returns
///
/// The created account.
pub async fn create(email: &str, password: &str) -> Result<Account, AdminError> {
    let store = PgStore::new(connect().await?);

    tracing::info!("Creating admin account: {}", email);
    let account = AccountService::new(&store)
        .create_admin(email, password)
        .await?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Email: {}",
        account.id,
        account.email
    );
    Ok(account)
}

/// Give an existing account the admin role.
pub async fn promote(id: i32) -> Result<Account, AdminError> {
    let store = PgStore::new(connect().await?);

    let account = AccountService::new(&store)
        .promote(AccountId::new(id))
        .await?;

    tracing::info!(
        "Account promoted to admin. ID: {}, Email: {}",
        account.id,
        account.email
    );
    Ok(account)
}
