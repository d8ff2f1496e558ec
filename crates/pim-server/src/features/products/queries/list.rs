//! List products query
//!
//! Paginated catalog listing with optional substring filters on SKU and
//! name and an exact filter on active. Newest first.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::pagination::PaginationParams;
use crate::models::Product;

/// Query to list products with filters and pagination
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListProductsQuery {
    /// Case-insensitive substring match on SKU
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Case-insensitive substring match on name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Exact match on active flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Page number (1-indexed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl ListProductsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Response from listing products
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProductsResponse {
    pub products: Vec<Product>,
    pub total: i64,
}

/// Errors that can occur when listing products
#[derive(Debug, thiserror::Error)]
pub enum ListProductsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListProductsResponse, ListProductsError>> for ListProductsQuery {}

/// Handler function for listing products
#[tracing::instrument(skip(pool, query))]
pub async fn handle(
    pool: PgPool,
    query: ListProductsQuery,
) -> Result<ListProductsResponse, ListProductsError> {
    let filters = r#"
        ($1::text IS NULL OR sku ILIKE '%' || $1 || '%')
        AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
        AND ($3::boolean IS NULL OR active = $3)
    "#;

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM products WHERE {filters}"
    ))
    .bind(&query.sku)
    .bind(&query.name)
    .bind(query.active)
    .fetch_one(&pool)
    .await?;

    let products = sqlx::query_as::<_, Product>(&format!(
        r#"
        SELECT id, sku, name, description, price, quantity, active, created_at, updated_at
        FROM products
        WHERE {filters}
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#
    ))
    .bind(&query.sku)
    .bind(&query.name)
    .bind(query.active)
    .bind(query.pagination().per_page())
    .bind(query.pagination().offset())
    .fetch_all(&pool)
    .await?;

    Ok(ListProductsResponse { products, total })
}
