//! Order placement and listing.
//!
//! [`OrderService::place_order`] turns a cart into an order inside a single
//! [`OrderUnitOfWork`](crate::db::OrderUnitOfWork). Each item captures the
//! product's price at that moment; later catalog changes never touch it.

use chrono::Utc;
use thiserror::Error;

use online_shop_core::{AccountId, OrderId, OrderStatus, ProductId};

use crate::db::{OrderStore, RepositoryError};
use crate::models::{CartItem, NewOrder, NewOrderItem, Order, PendingOrder};

/// Errors that can occur while placing or reading orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The cart is empty or has a non-positive quantity.
    #[error("{0}")]
    Validation(String),

    /// A cart entry references a product that does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The store failed; nothing was written.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    /// The order was committed but could not be read back.
    #[error("order {order_id} was placed but could not be loaded: {source}")]
    FetchAfterCommit {
        order_id: OrderId,
        #[source]
        source: RepositoryError,
    },
}

/// Order operations over any [`OrderStore`].
pub struct OrderService<'a, S: OrderStore + ?Sized> {
    orders: &'a S,
}

impl<'a, S: OrderStore + ?Sized> OrderService<'a, S> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(orders: &'a S) -> Self {
        Self { orders }
    }

    /// Place an order for `account_id` from the given cart.
    ///
    /// The header and every item are written in one unit of work; if any
    /// product is missing or any write fails, nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for an empty cart or a quantity below 1.
    /// Returns `OrderError::ProductNotFound` for the first unknown product.
    /// Returns `OrderError::Storage` if the store fails before commit.
    /// Returns `OrderError::FetchAfterCommit` if the committed order can't be
    /// read back.
    pub async fn place_order(
        &self,
        account_id: AccountId,
        items: &[CartItem],
    ) -> Result<Order, OrderError> {
        validate_cart(items)?;

        let mut uow = self.orders.begin().await?;

        let order_id = uow
            .insert_order(&NewOrder {
                account_id,
                created_at: Utc::now(),
                status: OrderStatus::Pending,
            })
            .await?;

        for item in items {
            let product = uow
                .find_product(item.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(item.product_id))?;

            uow.insert_order_item(&NewOrderItem {
                order_id,
                product_id: product.id,
                quantity: item.quantity,
                price: product.price,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => OrderError::ProductNotFound(item.product_id),
                other => OrderError::Storage(other),
            })?;
        }

        uow.commit().await?;
        tracing::info!(
            order_id = %order_id,
            account_id = %account_id,
            items = items.len(),
            "order placed"
        );

        match self.orders.find_order(order_id).await {
            Ok(Some(order)) => Ok(order),
            Ok(None) => Err(OrderError::FetchAfterCommit {
                order_id,
                source: RepositoryError::NotFound,
            }),
            Err(source) => Err(OrderError::FetchAfterCommit { order_id, source }),
        }
    }

    /// An account's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Storage` if the store fails.
    pub async fn list_for_account(&self, account_id: AccountId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_orders_for_account(account_id).await?)
    }

    /// Every pending order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Storage` if the store fails.
    pub async fn list_pending(&self) -> Result<Vec<PendingOrder>, OrderError> {
        Ok(self.orders.list_pending_orders().await?)
    }
}

fn validate_cart(items: &[CartItem]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::Validation(
            "order must contain at least one item".to_owned(),
        ));
    }
    if let Some(item) = items.iter().find(|item| item.quantity < 1) {
        return Err(OrderError::Validation(format!(
            "quantity for product {} must be at least 1",
            item.product_id
        )));
    }
    Ok(())
}
