//! Get product query

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Product;

/// Query to fetch a single product by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProductQuery {
    pub id: Uuid,
}

/// Errors that can occur when fetching a product
#[derive(Debug, thiserror::Error)]
pub enum GetProductError {
    #[error("Product '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Product, GetProductError>> for GetProductQuery {}

/// Handler function for fetching a product
#[tracing::instrument(skip(pool), fields(product_id = %query.id))]
pub async fn handle(pool: PgPool, query: GetProductQuery) -> Result<Product, GetProductError> {
    sqlx::query_as::<_, Product>(
        r#"
        SELECT id, sku, name, description, price, quantity, active, created_at, updated_at
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(query.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(GetProductError::NotFound(query.id))
}
