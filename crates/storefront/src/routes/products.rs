//! Product catalog routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use online_shop_core::ProductId;

use super::MessageResponse;
use crate::db::{CatalogStore, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::models::{Product, ProductInput};
use crate::state::AppState;

fn validated(input: ProductInput) -> Result<ProductInput> {
    input.validate().map_err(AppError::BadRequest)?;
    Ok(input)
}

fn product_not_found(id: ProductId) -> AppError {
    AppError::NotFound(format!("Product {id} not found"))
}

/// All products.
///
/// GET /products
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.store().list_products().await?))
}

/// One product.
///
/// GET /products/{id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    state
        .store()
        .find_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| product_not_found(id))
}

/// Add a product.
///
/// POST /products (admin)
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = validated(input)?;
    let product = state.store().create_product(&input).await?;
    tracing::info!(product_id = %product.id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's name and price.
///
/// PUT /products/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Product>> {
    let input = validated(input)?;
    let product = state
        .store()
        .update_product(id, &input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => product_not_found(id),
            other => other.into(),
        })?;

    Ok(Json(product))
}

/// Remove a product that no order references.
///
/// DELETE /products/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<MessageResponse>> {
    state
        .store()
        .delete_product(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => product_not_found(id),
            other => other.into(),
        })?;
    tracing::info!(product_id = %id, "product deleted");

    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
