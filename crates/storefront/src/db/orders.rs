//! Order store: eager-loaded reads and the transactional write path.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use online_shop_core::{
    AccountId, Email, OrderId, OrderItemId, OrderStatus, Price, ProductId,
};

use super::products::ProductRow;
use super::{PgStore, RepositoryError};
use crate::models::{NewOrder, NewOrderItem, Order, OrderItem, PendingOrder, Product};

/// Persistence operations for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Open a unit of work for writing one order.
    async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, RepositoryError>;

    /// Get an order with its items and their products.
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// An account's orders, newest first, with items and products.
    async fn list_orders_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// All `Pending` orders, oldest first, with items, products and the
    /// owner's email.
    async fn list_pending_orders(&self) -> Result<Vec<PendingOrder>, RepositoryError>;
}

/// An all-or-nothing group of order writes.
///
/// Nothing written through a unit of work is visible to other readers until
/// [`commit`](OrderUnitOfWork::commit) succeeds. Dropping a unit of work
/// without committing rolls it back, so an early `?` return or a panic can
/// never leave a partial order behind.
#[async_trait]
pub trait OrderUnitOfWork: Send {
    /// Insert an order header and return its generated ID.
    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, RepositoryError>;

    /// Look up a product as seen from inside the unit of work.
    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert an order line and return its generated ID.
    ///
    /// Returns `RepositoryError::NotFound` if the product no longer exists.
    async fn insert_order_item(
        &mut self,
        item: &NewOrderItem,
    ) -> Result<OrderItemId, RepositoryError>;

    /// Make every write visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Group items under their orders, preserving the item order of `items`.
pub(crate) fn group_items(items: Vec<OrderItem>) -> HashMap<OrderId, Vec<OrderItem>> {
    let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }
    grouped
}

// =============================================================================
// PostgreSQL
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    account_id: i32,
    created_at: DateTime<Utc>,
    status: OrderStatus,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: OrderId::new(self.id),
            account_id: AccountId::new(self.account_id),
            created_at: self.created_at,
            status: self.status,
            items,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PendingOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_email: String,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Price,
    product_name: String,
    product_price: Price,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        let product_id = ProductId::new(row.product_id);
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id,
            quantity: row.quantity,
            price: row.unit_price,
            product: Product {
                id: product_id,
                name: row.product_name,
                price: row.product_price,
            },
        }
    }
}

/// Load the items (with products) of every order in `order_ids`.
async fn load_items(
    pool: &PgPool,
    order_ids: &[i32],
) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, OrderItemRow>(
        r"
        SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.unit_price,
               p.name AS product_name, p.price AS product_price
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = ANY($1)
        ORDER BY oi.order_id, oi.id
        ",
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await?;

    Ok(group_items(rows.into_iter().map(OrderItem::from).collect()))
}

#[async_trait]
impl OrderStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, RepositoryError> {
        let tx = self.pool().begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, account_id, created_at, status
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        else {
            return Ok(None);
        };

        let mut items = load_items(self.pool(), &[row.id]).await?;
        let items = items.remove(&id).unwrap_or_default();
        Ok(Some(row.into_order(items)))
    }

    async fn list_orders_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, account_id, created_at, status
            FROM orders
            WHERE account_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(account_id)
        .fetch_all(self.pool())
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items = load_items(self.pool(), &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let order_items = items.remove(&OrderId::new(row.id)).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect())
    }

    async fn list_pending_orders(&self) -> Result<Vec<PendingOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, PendingOrderRow>(
            r"
            SELECT o.id, o.account_id, o.created_at, o.status,
                   a.email AS customer_email
            FROM orders o
            JOIN accounts a ON a.id = o.account_id
            WHERE o.status = $1
            ORDER BY o.created_at ASC, o.id ASC
            ",
        )
        .bind(OrderStatus::Pending)
        .fetch_all(self.pool())
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.order.id).collect();
        let mut items = load_items(self.pool(), &ids).await?;

        rows.into_iter()
            .map(|row| {
                let customer_email = Email::parse(&row.customer_email).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
                })?;
                let order_items = items
                    .remove(&OrderId::new(row.order.id))
                    .unwrap_or_default();
                Ok(PendingOrder {
                    order: row.order.into_order(order_items),
                    customer_email,
                })
            })
            .collect()
    }
}

/// A `PostgreSQL` transaction. sqlx rolls it back when dropped uncommitted.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderUnitOfWork for PgUnitOfWork {
    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO orders (account_id, created_at, status)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(order.account_id)
        .bind(order.created_at)
        .bind(order.status)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(OrderId::new(id))
    }

    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn insert_order_item(
        &mut self,
        item: &NewOrderItem,
    ) -> Result<OrderItemId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| match e {
            // Product deleted after find_product saw it.
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(OrderItemId::new(id))
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let Self { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}
