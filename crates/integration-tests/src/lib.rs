//! End-to-end HTTP tests for OnlineShop.
//!
//! Tests drive the real router (routes, gates, extractors, error mapping)
//! through `tower::ServiceExt::oneshot`, backed by an in-memory store, so no
//! database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p online-shop-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use online_shop_storefront::{
    build_router,
    db::MemoryStore,
    services::{AccountService, TokenService},
    state::AppState,
};

/// Signing key used by every test app.
pub const TEST_JWT_SECRET: &str = "k7#Qp2$vL9@xW4!mZ8&nR3*tY6^bH1%d";

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub body: Value,
}

/// The storefront router over a fresh in-memory store.
pub struct TestApp {
    pub store: MemoryStore,
    pub state: AppState,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let tokens = TokenService::new(&SecretString::from(TEST_JWT_SECRET.to_owned())).unwrap();
        let state = AppState::new(Arc::new(store.clone()), tokens);
        let router = build_router(state.clone());
        Self {
            store,
            state,
            router,
        }
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    /// Send a prebuilt request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .map(|v| v.to_str().unwrap().to_owned());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            request_id,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Register a customer through the API and return its ID.
    pub async fn register(&self, email: &str, password: &str) -> i64 {
        let response = self
            .post(
                "/users/register",
                None,
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_i64().unwrap()
    }

    /// Log in through the API and return the token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post(
                "/users/login",
                None,
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["token"].as_str().unwrap().to_owned()
    }

    /// Create an admin directly in the store (as first-boot seeding would)
    /// and return a token for it.
    pub async fn admin_token(&self) -> String {
        let email = "admin@shop.test";
        let password = "admin-password";
        AccountService::new(&self.store)
            .create_admin(email, password)
            .await
            .unwrap();
        self.login(email, password).await
    }

    /// Create a product through the admin API and return its ID.
    pub async fn create_product(&self, admin_token: &str, name: &str, price: &str) -> i64 {
        let response = self
            .post(
                "/products",
                Some(admin_token),
                serde_json::json!({ "name": name, "price": price }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_i64().unwrap()
    }
}
