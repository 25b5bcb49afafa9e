//! Order routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::CurrentAccount;
use crate::models::{CartItem, Order, PendingOrder};
use crate::services::OrderService;
use crate::state::AppState;

/// Cart submitted for checkout.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartItem>,
}

/// Place an order for the caller.
///
/// POST /orders
pub async fn place(
    State(state): State<AppState>,
    CurrentAccount(auth): CurrentAccount,
    ApiJson(body): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = OrderService::new(state.store())
        .place_order(auth.account_id, &body.items)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// The caller's orders, newest first.
///
/// GET /orders
pub async fn list_mine(
    State(state): State<AppState>,
    CurrentAccount(auth): CurrentAccount,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.store())
        .list_for_account(auth.account_id)
        .await?;

    Ok(Json(orders))
}

/// Every pending order, oldest first.
///
/// GET /orders/pending (admin)
pub async fn list_pending(State(state): State<AppState>) -> Result<Json<Vec<PendingOrder>>> {
    let orders = OrderService::new(state.store()).list_pending().await?;
    Ok(Json(orders))
}
