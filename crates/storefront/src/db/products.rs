//! Catalog store: product CRUD.

use async_trait::async_trait;

use online_shop_core::{Price, ProductId};

use super::{PgStore, RepositoryError};
use crate::models::{Product, ProductInput};

/// Persistence operations for catalog products.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products, ordered by ID.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Get a product by its ID.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a new product.
    async fn create_product(&self, input: &ProductInput) -> Result<Product, RepositoryError>;

    /// Replace a product's name and price.
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError>;

    /// Delete a product.
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist and
    /// `RepositoryError::Conflict` if an order item still references it.
    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    id: i32,
    name: String,
    price: Price,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
        }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Product::from))
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, price)
            VALUES ($1, $2)
            RETURNING id, name, price
            ",
        )
        .bind(&input.name)
        .bind(input.price)
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET name = $1, price = $2
            WHERE id = $3
            RETURNING id, name, price
            ",
        )
        .bind(&input.name)
        .bind(input.price)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "product is referenced by an order"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
