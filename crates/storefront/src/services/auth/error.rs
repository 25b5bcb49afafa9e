//! Authentication error types.

use thiserror::Error;

use online_shop_core::EmailError;

use super::TokenError;
use crate::db::RepositoryError;

/// Errors that can occur during account and credential operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid credentials (wrong password or unknown email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Account not found.
    #[error("account not found")]
    AccountNotFound,

    /// An account with this email already exists.
    #[error("account already exists")]
    AccountExists,

    /// The account already has the admin role.
    #[error("account is already an admin")]
    AlreadyAdmin,

    /// Token could not be issued.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
