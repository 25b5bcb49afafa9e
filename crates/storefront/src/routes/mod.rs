//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness
//! GET    /health/ready         - Readiness (store reachable)
//!
//! # Accounts
//! POST   /users/register       - Create a customer account
//! POST   /users/login          - Exchange credentials for a token
//! GET    /users/me             - Own account (auth)
//! POST   /users/{id}/promote   - Grant admin role (admin)
//!
//! # Orders
//! POST   /orders               - Place an order (auth)
//! GET    /orders               - Own orders, newest first (auth)
//! GET    /orders/pending       - All pending orders, oldest first (admin)
//!
//! # Products
//! GET    /products             - Catalog
//! GET    /products/{id}        - One product
//! POST   /products             - Create (admin)
//! PUT    /products/{id}        - Replace (admin)
//! DELETE /products/{id}        - Delete (admin)
//! ```

pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{MethodRouter, get, post, put},
};
use serde::Serialize;

use online_shop_core::Role;

use crate::middleware::{require_auth, require_role};
use crate::state::AppState;

/// Body of responses that only confirm an action.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Gate a route behind the authentication check.
fn authenticated(route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// Gate a route behind authentication, then the admin role check.
fn admin_only(route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    route
        .route_layer(from_fn_with_state(Role::Admin, require_role))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// All API routes, with their gates.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/me", authenticated(get(users::me), state))
        .route(
            "/users/{id}/promote",
            admin_only(post(users::promote), state),
        )
        .route(
            "/orders",
            authenticated(get(orders::list_mine).post(orders::place), state),
        )
        .route(
            "/orders/pending",
            admin_only(get(orders::list_pending), state),
        )
        .route(
            "/products",
            get(products::list).merge(admin_only(post(products::create), state)),
        )
        .route(
            "/products/{id}",
            get(products::show).merge(admin_only(
                put(products::update).delete(products::delete),
                state,
            )),
        )
}
