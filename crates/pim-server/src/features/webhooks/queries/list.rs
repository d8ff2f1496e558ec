//! List webhooks query

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::pagination::PaginationParams;
use crate::models::Webhook;
use crate::store::postgres::WebhookRow;

/// Query to list webhook subscriptions
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListWebhooksQuery {
    /// Filter on the active flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Page number (1-indexed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl ListWebhooksQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Response from listing webhooks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWebhooksResponse {
    pub webhooks: Vec<Webhook>,
    pub total: i64,
}

/// Errors that can occur when listing webhooks
#[derive(Debug, thiserror::Error)]
pub enum ListWebhooksError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListWebhooksResponse, ListWebhooksError>> for ListWebhooksQuery {}

/// Handler function for listing webhooks
#[tracing::instrument(skip(pool, query))]
pub async fn handle(
    pool: PgPool,
    query: ListWebhooksQuery,
) -> Result<ListWebhooksResponse, ListWebhooksError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM webhooks WHERE ($1::boolean IS NULL OR active = $1)",
    )
    .bind(query.active)
    .fetch_one(&pool)
    .await?;

    let rows = sqlx::query_as::<_, WebhookRow>(
        r#"
        SELECT id, url, event_type, active, created_at, updated_at
        FROM webhooks
        WHERE ($1::boolean IS NULL OR active = $1)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(query.active)
    .bind(query.pagination().per_page())
    .bind(query.pagination().offset())
    .fetch_all(&pool)
    .await?;

    let webhooks = rows
        .into_iter()
        .map(WebhookRow::into_webhook)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListWebhooksResponse { webhooks, total })
}
