//! List import jobs query
//!
//! Most recent first, paginated.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::imports::queries::ImportProgressResponse;
use crate::features::shared::pagination::PaginationParams;
use crate::store::postgres::ImportJobRow;

/// Query to list import jobs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListImportJobsQuery {
    /// Page number (1-indexed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl ListImportJobsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Response from listing import jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListImportJobsResponse {
    pub jobs: Vec<ImportProgressResponse>,
    pub total: i64,
}

/// Errors that can occur when listing import jobs
#[derive(Debug, thiserror::Error)]
pub enum ListImportJobsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListImportJobsResponse, ListImportJobsError>> for ListImportJobsQuery {}

/// Handler function for listing import jobs
#[tracing::instrument(skip(pool, query))]
pub async fn handle(
    pool: PgPool,
    query: ListImportJobsQuery,
) -> Result<ListImportJobsResponse, ListImportJobsError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM import_jobs")
        .fetch_one(&pool)
        .await?;

    let rows = sqlx::query_as::<_, ImportJobRow>(
        r#"
        SELECT id, filename, status, total_records, processed_records,
               created_records, updated_records, error_message, created_at, updated_at
        FROM import_jobs
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(query.pagination().per_page())
    .bind(query.pagination().offset())
    .fetch_all(&pool)
    .await?;

    let jobs = rows
        .into_iter()
        .map(|row| row.into_job().map(ImportProgressResponse::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListImportJobsResponse { jobs, total })
}
