//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use online_shop_core::{AccountId, Email, OrderId, OrderItemId, OrderStatus, Price, ProductId};

use super::Product;

/// A placed order with its line items.
///
/// Orders are only ever observed fully populated: the header and every item
/// are written in one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub account_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price captured when the order was placed. Never recomputed.
    pub price: Price,
    /// The referenced product as it is now.
    pub product: Product,
}

/// A pending order together with the email of the account that placed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer_email: Email,
}

/// A cart entry submitted by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Order header to insert.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub account_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

/// Order line to insert.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Price,
}
