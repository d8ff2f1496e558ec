//! Delete product commands
//!
//! Single delete by id, plus a bulk delete-all used to reset the catalog
//! before a full re-import.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Command to delete a single product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteProductCommand {
    pub id: Uuid,
}

/// Response from deleting a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteProductResponse {
    pub id: Uuid,
    pub sku: String,
}

/// Errors that can occur when deleting a product
#[derive(Debug, thiserror::Error)]
pub enum DeleteProductError {
    #[error("Product '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteProductResponse, DeleteProductError>> for DeleteProductCommand {}

/// Handler function for deleting a product
#[tracing::instrument(skip(pool), fields(product_id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: DeleteProductCommand,
) -> Result<DeleteProductResponse, DeleteProductError> {
    let deleted = sqlx::query_as::<_, (Uuid, String)>(
        "DELETE FROM products WHERE id = $1 RETURNING id, sku",
    )
    .bind(command.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(DeleteProductError::NotFound(command.id))?;

    tracing::info!(product_id = %deleted.0, sku = %deleted.1, "Product deleted");

    Ok(DeleteProductResponse {
        id: deleted.0,
        sku: deleted.1,
    })
}

/// Command to delete every product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAllProductsCommand {}

/// Response from deleting all products
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAllProductsResponse {
    pub deleted: u64,
}

/// Errors that can occur when deleting all products
#[derive(Debug, thiserror::Error)]
pub enum DeleteAllProductsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteAllProductsResponse, DeleteAllProductsError>>
    for DeleteAllProductsCommand
{
}

/// Handler function for clearing the catalog
#[tracing::instrument(skip(pool))]
pub async fn handle_all(
    pool: PgPool,
    _command: DeleteAllProductsCommand,
) -> Result<DeleteAllProductsResponse, DeleteAllProductsError> {
    let result = sqlx::query("DELETE FROM products").execute(&pool).await?;

    tracing::info!(deleted = result.rows_affected(), "Catalog cleared");

    Ok(DeleteAllProductsResponse {
        deleted: result.rows_affected(),
    })
}
