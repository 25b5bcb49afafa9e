//! Authentication and authorization gates.
//!
//! Protected routes are wrapped in up to two middleware layers:
//!
//! 1. [`require_auth`] verifies the `Authorization: Bearer <token>` header and
//!    inserts an [`AuthContext`] into the request extensions.
//! 2. [`require_role`] checks that context against the role the route group
//!    needs.
//!
//! Handlers read the verified identity through the [`CurrentAccount`]
//! extractor. Any gate failure short-circuits the request.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::Span;

use online_shop_core::{AccountId, Role};

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Verified identity of the caller, valid for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub account_id: AccountId,
    pub role: Role,
}

/// Pull the token out of a `Bearer` authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authentication gate.
///
/// Rejects with `401` if the bearer token is missing, malformed, badly signed
/// or expired. Otherwise attaches the token's [`AuthContext`] to the request.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` on any token problem.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = state
        .tokens()
        .verify(token)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    let context = AuthContext {
        account_id: claims.sub,
        role: claims.role,
    };

    Span::current().record("account_id", context.account_id.as_i32());
    set_sentry_user(&context.account_id);

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Role gate, parameterized by the role the route requires.
///
/// Must run after [`require_auth`]. A missing context means the gates were
/// wired in the wrong order and is rejected like a role mismatch.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if the caller's role doesn't satisfy
/// `required`.
pub async fn require_role(
    State(required): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(context) = request.extensions().get::<AuthContext>() else {
        tracing::error!(required = %required, "role gate reached without authentication");
        return Err(AppError::Forbidden("Access denied".to_string()));
    };

    if !context.role.satisfies(required) {
        tracing::warn!(
            account_id = %context.account_id,
            role = %context.role,
            required = %required,
            "role check failed"
        );
        return Err(AppError::Forbidden(format!("{required} role required")));
    }

    Ok(next.run(request).await)
}

/// Extractor for the caller's verified identity.
///
/// Only usable behind [`require_auth`]; rejects with `401` otherwise.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(CurrentAccount(auth): CurrentAccount) -> String {
///     format!("hello, account {}", auth.account_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentAccount(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{HeaderValue, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use chrono::Utc;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::db::MemoryStore;
    use crate::services::auth::{TOKEN_TTL, TokenService};

    fn state() -> AppState {
        let tokens =
            TokenService::new(&SecretString::from("k7#Qp2$vL9@xW4!mZ8&nR3*tY6^bH1%d".to_owned()))
                .unwrap();
        AppState::new(Arc::new(MemoryStore::new()), tokens)
    }

    async fn whoami(CurrentAccount(auth): CurrentAccount) -> String {
        format!("{}:{}", auth.account_id, auth.role)
    }

    fn app(state: &AppState) -> Router {
        let admin = Router::new()
            .route("/admin", get(whoami))
            .route_layer(from_fn_with_state(Role::Admin, require_role))
            .route_layer(from_fn_with_state(state.clone(), require_auth));
        let user = Router::new()
            .route("/me", get(whoami))
            .route_layer(from_fn_with_state(state.clone(), require_auth));
        let misordered = Router::new()
            .route("/misordered", get(whoami))
            .route_layer(from_fn_with_state(Role::Admin, require_role));
        Router::new()
            .route("/open", get(whoami))
            .merge(admin)
            .merge(user)
            .merge(misordered)
    }

    async fn call(state: &AppState, uri: &str, auth: Option<&str>) -> (StatusCode, String) {
        let mut request = Request::builder().uri(uri);
        if let Some(value) = auth {
            request = request.header(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        let response = app(state)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn bearer(state: &AppState, id: i32, role: Role) -> String {
        let token = state.tokens().issue(AccountId::new(id), role).unwrap();
        format!("Bearer {token}")
    }

    // =========================================================================
    // Header parsing
    // =========================================================================

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(bearer_token(&headers), None);
    }

    // =========================================================================
    // Authentication gate
    // =========================================================================

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let state = state();
        let (status, _) = call(&state, "/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let state = state();
        let (status, _) = call(&state, "/me", Some("Bearer not.a.jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let state = state();
        let token = state
            .tokens()
            .issue_at(
                AccountId::new(1),
                Role::Admin,
                Utc::now() - TOKEN_TTL - chrono::Duration::seconds(1),
            )
            .unwrap();
        let (status, _) = call(&state, "/me", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_exposes_context() {
        let state = state();
        let (status, body) = call(&state, "/me", Some(&bearer(&state, 5, Role::User))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "5:user");
    }

    #[tokio::test]
    async fn test_extractor_without_gate_is_unauthorized() {
        let state = state();
        let (status, _) = call(&state, "/open", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // =========================================================================
    // Role gate
    // =========================================================================

    #[tokio::test]
    async fn test_user_rejected_by_admin_gate() {
        let state = state();
        let (status, body) = call(&state, "/admin", Some(&bearer(&state, 5, Role::User))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("admin role required"));
    }

    #[tokio::test]
    async fn test_admin_accepted_by_admin_gate() {
        let state = state();
        let (status, body) = call(&state, "/admin", Some(&bearer(&state, 1, Role::Admin))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "1:admin");
    }

    #[tokio::test]
    async fn test_admin_gate_runs_after_auth() {
        let state = state();
        let (status, _) = call(&state, "/admin", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_role_gate_without_context_is_forbidden() {
        let state = state();
        let (status, _) = call(&state, "/misordered", Some(&bearer(&state, 1, Role::Admin))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
