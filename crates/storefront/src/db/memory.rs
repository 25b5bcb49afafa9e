//! In-process store.
//!
//! [`MemoryStore`] keeps every table in one `parking_lot::Mutex` and gives the
//! same guarantees the `PostgreSQL` store does: unique emails, products that
//! cannot be deleted while an order item references them, and order writes
//! that become visible all at once or not at all. It backs the HTTP tests and
//! is handy for running the API without a database.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use online_shop_core::{
    AccountId, Email, OrderId, OrderItemId, OrderStatus, ProductId, Role,
};

use super::{
    AccountStore, CatalogStore, OrderStore, OrderUnitOfWork, RepositoryError, Store,
};
use crate::models::{
    Account, NewAccount, NewOrder, NewOrderItem, Order, OrderItem, PendingOrder, Product,
    ProductInput,
};

/// In-memory implementation of [`Store`].
///
/// Cheap to clone; all clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
struct Tables {
    accounts: BTreeMap<AccountId, StoredAccount>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, NewOrder>,
    items: BTreeMap<OrderItemId, NewOrderItem>,
    sequences: Sequences,
}

#[derive(Debug)]
struct StoredAccount {
    account: Account,
    password_hash: String,
}

/// Id counters. Like database sequences they never hand out a value twice,
/// so a rolled-back unit of work leaves a gap.
#[derive(Debug, Default)]
struct Sequences {
    account: i32,
    product: i32,
    order: i32,
    item: i32,
}

fn next_value(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl Tables {
    fn email_taken(&self, email: &Email) -> bool {
        self.accounts
            .values()
            .any(|stored| stored.account.email == *email)
    }

    fn product_referenced(&self, id: ProductId) -> bool {
        self.items.values().any(|item| item.product_id == id)
    }

    fn load_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let Some(header) = self.orders.get(&id) else {
            return Ok(None);
        };

        let items = self
            .items
            .iter()
            .filter(|(_, item)| item.order_id == id)
            .map(|(item_id, item)| {
                let product = self.products.get(&item.product_id).cloned().ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "order item {item_id} references missing product {}",
                        item.product_id
                    ))
                })?;
                Ok(OrderItem {
                    id: *item_id,
                    order_id: item.order_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                    product,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Some(Order {
            id,
            account_id: header.account_id,
            created_at: header.created_at,
            status: header.status,
            items,
        }))
    }

    fn load_orders<'a>(
        &self,
        ids: impl Iterator<Item = &'a OrderId>,
    ) -> Result<Vec<Order>, RepositoryError> {
        ids.filter_map(|id| self.load_order(*id).transpose())
            .collect()
    }

    /// Apply a unit of work's staged writes, or none of them.
    fn apply(
        &mut self,
        orders: Vec<(OrderId, NewOrder)>,
        items: Vec<(OrderItemId, NewOrderItem)>,
    ) -> Result<(), RepositoryError> {
        for (_, order) in &orders {
            if !self.accounts.contains_key(&order.account_id) {
                return Err(RepositoryError::Conflict(format!(
                    "account {} does not exist",
                    order.account_id
                )));
            }
        }
        for (_, item) in &items {
            if !self.products.contains_key(&item.product_id) {
                return Err(RepositoryError::Conflict(format!(
                    "product {} does not exist",
                    item.product_id
                )));
            }
        }

        self.orders.extend(orders);
        self.items.extend(items);
        Ok(())
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let tables = self.tables.lock();
        Ok(tables.accounts.get(&id).map(|stored| stored.account.clone()))
    }

    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, RepositoryError> {
        let tables = self.tables.lock();
        Ok(tables
            .accounts
            .values()
            .find(|stored| stored.account.email == *email)
            .map(|stored| stored.account.clone()))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let tables = self.tables.lock();
        Ok(tables
            .accounts
            .values()
            .find(|stored| stored.account.email == *email)
            .map(|stored| (stored.account.clone(), stored.password_hash.clone())))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let mut tables = self.tables.lock();
        if tables.email_taken(&account.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = AccountId::new(next_value(&mut tables.sequences.account));
        let created = Account {
            id,
            email: account.email,
            role: account.role,
            registered_at: Utc::now(),
        };
        tables.accounts.insert(
            id,
            StoredAccount {
                account: created.clone(),
                password_hash: account.password_hash,
            },
        );
        Ok(created)
    }

    async fn update_role(&self, id: AccountId, role: Role) -> Result<Account, RepositoryError> {
        let mut tables = self.tables.lock();
        let stored = tables
            .accounts
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        stored.account.role = role;
        Ok(stored.account.clone())
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.lock();
        Ok(tables.products.values().cloned().collect())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let tables = self.tables.lock();
        Ok(tables.products.get(&id).cloned())
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.lock();
        let id = ProductId::new(next_value(&mut tables.sequences.product));
        let product = Product {
            id,
            name: input.name.clone(),
            price: input.price,
        };
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.lock();
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        product.name.clone_from(&input.name);
        product.price = input.price;
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock();
        if !tables.products.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.product_referenced(id) {
            return Err(RepositoryError::Conflict(
                "product is referenced by an order".to_owned(),
            ));
        }
        tables.products.remove(&id);
        Ok(())
    }
}

// =============================================================================
// Orders
// =============================================================================

#[async_trait]
impl OrderStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, RepositoryError> {
        Ok(Box::new(MemoryUnitOfWork {
            tables: Arc::clone(&self.tables),
            orders: Vec::new(),
            items: Vec::new(),
        }))
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.tables.lock().load_order(id)
    }

    async fn list_orders_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables.lock();
        let mut orders = tables.load_orders(
            tables
                .orders
                .iter()
                .filter(|(_, header)| header.account_id == account_id)
                .map(|(id, _)| id),
        )?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn list_pending_orders(&self) -> Result<Vec<PendingOrder>, RepositoryError> {
        let tables = self.tables.lock();
        let mut orders = tables.load_orders(
            tables
                .orders
                .iter()
                .filter(|(_, header)| header.status == OrderStatus::Pending)
                .map(|(id, _)| id),
        )?;
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        orders
            .into_iter()
            .map(|order| {
                let customer_email = tables
                    .accounts
                    .get(&order.account_id)
                    .map(|stored| stored.account.email.clone())
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "order {} references missing account {}",
                            order.id, order.account_id
                        ))
                    })?;
                Ok(PendingOrder {
                    order,
                    customer_email,
                })
            })
            .collect()
    }
}

/// Staged order writes. Nothing reaches the shared tables until `commit`,
/// so dropping the unit of work is a rollback.
struct MemoryUnitOfWork {
    tables: Arc<Mutex<Tables>>,
    orders: Vec<(OrderId, NewOrder)>,
    items: Vec<(OrderItemId, NewOrderItem)>,
}

#[async_trait]
impl OrderUnitOfWork for MemoryUnitOfWork {
    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let id = OrderId::new(next_value(&mut self.tables.lock().sequences.order));
        self.orders.push((id, order.clone()));
        Ok(id)
    }

    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.lock().products.get(&id).cloned())
    }

    async fn insert_order_item(
        &mut self,
        item: &NewOrderItem,
    ) -> Result<OrderItemId, RepositoryError> {
        if !self.orders.iter().any(|(id, _)| *id == item.order_id) {
            return Err(RepositoryError::Conflict(format!(
                "order {} was not inserted in this unit of work",
                item.order_id
            )));
        }
        let mut tables = self.tables.lock();
        if !tables.products.contains_key(&item.product_id) {
            return Err(RepositoryError::NotFound);
        }
        let id = OrderItemId::new(next_value(&mut tables.sequences.item));
        drop(tables);
        self.items.push((id, item.clone()));
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let Self {
            tables,
            orders,
            items,
        } = *self;
        tables.lock().apply(orders, items)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use online_shop_core::Price;

    use super::*;

    async fn account(store: &MemoryStore, email: &str) -> Account {
        store
            .create_account(NewAccount {
                email: Email::parse(email).unwrap(),
                password_hash: "hash".to_owned(),
                role: Role::User,
            })
            .await
            .unwrap()
    }

    async fn product(store: &MemoryStore, name: &str, cents: i64) -> Product {
        store
            .create_product(&ProductInput {
                name: name.to_owned(),
                price: Price::new(Decimal::new(cents, 2)).unwrap(),
            })
            .await
            .unwrap()
    }

    fn header(account_id: AccountId) -> NewOrder {
        NewOrder {
            account_id,
            created_at: Utc::now(),
            status: OrderStatus::Pending,
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    #[tokio::test]
    async fn test_create_account_rejects_duplicate_email() {
        let store = MemoryStore::new();
        account(&store, "a@example.com").await;

        let err = store
            .create_account(NewAccount {
                email: Email::parse("a@example.com").unwrap(),
                password_hash: "other".to_owned(),
                role: Role::Admin,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        account(&store, "a@example.com").await;

        let upper = Email::parse("A@example.com").unwrap();
        assert!(store.find_account_by_email(&upper).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_credentials_returns_hash() {
        let store = MemoryStore::new();
        let created = account(&store, "a@example.com").await;

        let (found, hash) = store
            .find_credentials(&created.email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, created);
        assert_eq!(hash, "hash");
    }

    #[tokio::test]
    async fn test_update_role_missing_account() {
        let store = MemoryStore::new();
        let err = store
            .update_role(AccountId::new(42), Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    #[tokio::test]
    async fn test_products_listed_by_id() {
        let store = MemoryStore::new();
        let first = product(&store, "Mug", 999).await;
        let second = product(&store, "Tee", 1999).await;

        let listed = store.list_products().await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_delete_referenced_product_conflicts() {
        let store = MemoryStore::new();
        let owner = account(&store, "a@example.com").await;
        let mug = product(&store, "Mug", 999).await;

        let mut uow = store.begin().await.unwrap();
        let order_id = uow.insert_order(&header(owner.id)).await.unwrap();
        uow.insert_order_item(&NewOrderItem {
            order_id,
            product_id: mug.id,
            quantity: 1,
            price: mug.price,
        })
        .await
        .unwrap();
        uow.commit().await.unwrap();

        let err = store.delete_product(mug.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let store = MemoryStore::new();
        let err = store.delete_product(ProductId::new(7)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    // =========================================================================
    // Unit of work
    // =========================================================================

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let store = MemoryStore::new();
        let owner = account(&store, "a@example.com").await;
        let mug = product(&store, "Mug", 999).await;

        let mut uow = store.begin().await.unwrap();
        let order_id = uow.insert_order(&header(owner.id)).await.unwrap();
        uow.insert_order_item(&NewOrderItem {
            order_id,
            product_id: mug.id,
            quantity: 2,
            price: mug.price,
        })
        .await
        .unwrap();

        assert!(store.find_order(order_id).await.unwrap().is_none());

        uow.commit().await.unwrap();
        let order = store.find_order(order_id).await.unwrap().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product, mug);
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_discards_writes() {
        let store = MemoryStore::new();
        let owner = account(&store, "a@example.com").await;

        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_order(&header(owner.id)).await.unwrap();
        }

        let orders = store.list_orders_for_account(owner.id).await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_commit_rechecks_products() {
        let store = MemoryStore::new();
        let owner = account(&store, "a@example.com").await;
        let mug = product(&store, "Mug", 999).await;

        let mut uow = store.begin().await.unwrap();
        let order_id = uow.insert_order(&header(owner.id)).await.unwrap();
        uow.insert_order_item(&NewOrderItem {
            order_id,
            product_id: mug.id,
            quantity: 1,
            price: mug.price,
        })
        .await
        .unwrap();

        store.delete_product(mug.id).await.unwrap();

        let err = uow.commit().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(store.find_order(order_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_item_for_deleted_product_not_found() {
        let store = MemoryStore::new();
        let owner = account(&store, "a@example.com").await;
        let mug = product(&store, "Mug", 999).await;
        store.delete_product(mug.id).await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let order_id = uow.insert_order(&header(owner.id)).await.unwrap();
        let err = uow
            .insert_order_item(&NewOrderItem {
                order_id,
                product_id: mug.id,
                quantity: 1,
                price: mug.price,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_pending_orders_oldest_first_with_email() {
        let store = MemoryStore::new();
        let alice = account(&store, "alice@example.com").await;
        let bob = account(&store, "bob@example.com").await;
        let mug = product(&store, "Mug", 999).await;

        let mut ids = Vec::new();
        for owner in [&alice, &bob] {
            let mut uow = store.begin().await.unwrap();
            let order_id = uow.insert_order(&header(owner.id)).await.unwrap();
            uow.insert_order_item(&NewOrderItem {
                order_id,
                product_id: mug.id,
                quantity: 1,
                price: mug.price,
            })
            .await
            .unwrap();
            uow.commit().await.unwrap();
            ids.push(order_id);
        }

        let pending = store.list_pending_orders().await.unwrap();
        let listed: Vec<_> = pending.iter().map(|p| p.order.id).collect();
        assert_eq!(listed, ids);
        assert_eq!(pending[0].customer_email, alice.email);
        assert_eq!(pending[1].customer_email, bob.email);

        let mine = store.list_orders_for_account(alice.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, ids[0]);
    }
}
