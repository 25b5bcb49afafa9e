//! Admin promotion and the role gate.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use online_shop_core::Role;
use online_shop_integration_tests::TestApp;

#[tokio::test]
async fn test_promotion_flow() {
    let app = TestApp::new();
    let user_id = app.register("shopper@example.com", "hunter22").await;
    let user_token = app.login("shopper@example.com", "hunter22").await;
    let admin_token = app.admin_token().await;
    let uri = format!("/users/{user_id}/promote");

    let by_user = app.post(&uri, Some(&user_token), json!({})).await;
    assert_eq!(by_user.status, StatusCode::FORBIDDEN);

    let by_admin = app.post(&uri, Some(&admin_token), json!({})).await;
    assert_eq!(by_admin.status, StatusCode::OK);
    assert_eq!(
        by_admin.body["message"],
        "User successfully promoted to admin"
    );

    let again = app.post(&uri, Some(&admin_token), json!({})).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_promote_unknown_account() {
    let app = TestApp::new();
    let admin_token = app.admin_token().await;

    let response = app
        .post("/users/4242/promote", Some(&admin_token), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_promote_bad_id_is_bad_request() {
    let app = TestApp::new();
    let admin_token = app.admin_token().await;

    let response = app
        .post("/users/abc/promote", Some(&admin_token), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_promote_without_token() {
    let app = TestApp::new();
    let user_id = app.register("shopper@example.com", "hunter22").await;

    let response = app
        .post(&format!("/users/{user_id}/promote"), None, json!({}))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_old_token_keeps_old_role_until_relogin() {
    let app = TestApp::new();
    let user_id = app.register("shopper@example.com", "hunter22").await;
    let old_token = app.login("shopper@example.com", "hunter22").await;
    let admin_token = app.admin_token().await;

    let promoted = app
        .post(
            &format!("/users/{user_id}/promote"),
            Some(&admin_token),
            json!({}),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);

    let stale = app.get("/orders/pending", Some(&old_token)).await;
    assert_eq!(stale.status, StatusCode::FORBIDDEN);

    let fresh_token = app.login("shopper@example.com", "hunter22").await;
    assert_eq!(
        app.state.tokens().verify(&fresh_token).unwrap().role,
        Role::Admin
    );
    let fresh = app.get("/orders/pending", Some(&fresh_token)).await;
    assert_eq!(fresh.status, StatusCode::OK);
}
