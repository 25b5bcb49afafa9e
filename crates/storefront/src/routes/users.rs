//! Account routes: registration, login, profile and promotion.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use online_shop_core::AccountId;

use super::MessageResponse;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::CurrentAccount;
use crate::models::Account;
use crate::services::AccountService;
use crate::state::AppState;

/// Email/password pair for registration and login.
///
/// No `Debug` derive so the password can't end up in logs.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Register a customer account.
///
/// POST /users/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    let account = AccountService::new(state.store())
        .register(&body.email, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Exchange credentials for an access token.
///
/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>> {
    let account = AccountService::new(state.store())
        .login(&body.email, &body.password)
        .await?;

    let token = state.tokens().issue(account.id, account.role)?;
    tracing::info!(account_id = %account.id, "login succeeded");

    Ok(Json(TokenResponse { token }))
}

/// The caller's own account.
///
/// GET /users/me
pub async fn me(
    State(state): State<AppState>,
    CurrentAccount(auth): CurrentAccount,
) -> Result<Json<Account>> {
    let account = AccountService::new(state.store())
        .get_account(auth.account_id)
        .await?;

    Ok(Json(account))
}

/// Give another account the admin role.
///
/// POST /users/{id}/promote (admin)
pub async fn promote(
    State(state): State<AppState>,
    CurrentAccount(auth): CurrentAccount,
    ApiPath(id): ApiPath<AccountId>,
) -> Result<Json<MessageResponse>> {
    AccountService::new(state.store()).promote(id).await?;
    tracing::info!(account_id = %id, promoted_by = %auth.account_id, "admin promotion");

    Ok(Json(MessageResponse::new("User successfully promoted to admin")))
}
