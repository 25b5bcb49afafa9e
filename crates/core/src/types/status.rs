//! Order status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Orders are created `Pending`. Fulfillment and cancellation states are
/// owned by systems outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "order_status"))]
pub enum OrderStatus {
    /// Placed and awaiting fulfillment.
    #[default]
    Pending,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
        }
    }
}
