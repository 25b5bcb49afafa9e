//! Registration, login and profile flows.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;

use online_shop_core::{AccountId, Role};
use online_shop_integration_tests::TestApp;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_then_duplicate() {
    let app = TestApp::new();

    let created = app
        .post(
            "/users/register",
            None,
            json!({ "email": "shopper@example.com", "password": "hunter22" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["email"], "shopper@example.com");
    assert_eq!(created.body["role"], "user");
    assert!(created.body.get("password_hash").is_none());
    assert!(created.body.get("password").is_none());

    let duplicate = app
        .post(
            "/users/register",
            None,
            json!({ "email": "shopper@example.com", "password": "different1" }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert!(duplicate.body["error"].is_string());
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = TestApp::new();

    let bad_email = app
        .post(
            "/users/register",
            None,
            json!({ "email": "nobody", "password": "hunter22" }),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let short_password = app
        .post(
            "/users/register",
            None,
            json!({ "email": "a@example.com", "password": "short" }),
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);

    let missing_field = app
        .post("/users/register", None, json!({ "email": "a@example.com" }))
        .await;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .send(
            Request::post("/users/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"email\": "))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_wrong_then_right_password() {
    let app = TestApp::new();
    let id = app.register("shopper@example.com", "hunter22").await;

    let wrong = app
        .post(
            "/users/login",
            None,
            json!({ "email": "shopper@example.com", "password": "hunter23" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let unknown = app
        .post(
            "/users/login",
            None,
            json!({ "email": "ghost@example.com", "password": "hunter22" }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, unknown.body);

    let token = app.login("shopper@example.com", "hunter22").await;
    let claims = app.state.tokens().verify(&token).unwrap();
    assert_eq!(claims.sub, AccountId::new(i32::try_from(id).unwrap()));
    assert_eq!(claims.role, Role::User);
}

#[tokio::test]
async fn test_login_with_malformed_email() {
    let app = TestApp::new();
    let response = app
        .post(
            "/users/login",
            None,
            json!({ "email": "not an email", "password": "hunter22" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_me_returns_own_account() {
    let app = TestApp::new();
    let id = app.register("shopper@example.com", "hunter22").await;
    let token = app.login("shopper@example.com", "hunter22").await;

    let me = app.get("/users/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["id"], id);
    assert_eq!(me.body["email"], "shopper@example.com");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new();

    let missing = app.get("/users/me", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let forged = app.get("/users/me", Some("eyJhbGciOiJIUzI1NiJ9.e30.c2ln")).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_for_unknown_account() {
    let app = TestApp::new();
    let token = app
        .state
        .tokens()
        .issue(AccountId::new(999), Role::User)
        .unwrap();

    let response = app.get("/users/me", Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
