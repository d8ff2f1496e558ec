//! Webhook delivery log query
//!
//! Newest first, capped at 500 entries per request.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::WebhookLog;

/// Default number of log entries returned
pub const DEFAULT_LOG_LIMIT: i64 = 50;

/// Maximum number of log entries returned in one request
pub const MAX_LOG_LIMIT: i64 = 500;

/// Query to list delivery log entries for one subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetWebhookLogsQuery {
    #[serde(skip)]
    pub webhook_id: Uuid,

    /// Number of entries to return; defaults to 50, capped at 500
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl GetWebhookLogsQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT)
    }
}

/// Response from listing delivery logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookLogsResponse {
    pub webhook_id: Uuid,
    pub logs: Vec<WebhookLog>,
}

/// Errors that can occur when listing delivery logs
#[derive(Debug, thiserror::Error)]
pub enum GetWebhookLogsError {
    #[error("Webhook '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<WebhookLogsResponse, GetWebhookLogsError>> for GetWebhookLogsQuery {}

/// Handler function for listing delivery logs
#[tracing::instrument(skip(pool, query), fields(webhook_id = %query.webhook_id))]
pub async fn handle(
    pool: PgPool,
    query: GetWebhookLogsQuery,
) -> Result<WebhookLogsResponse, GetWebhookLogsError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM webhooks WHERE id = $1)",
    )
    .bind(query.webhook_id)
    .fetch_one(&pool)
    .await?;

    if !exists {
        return Err(GetWebhookLogsError::NotFound(query.webhook_id));
    }

    let logs = sqlx::query_as::<_, WebhookLog>(
        r#"
        SELECT id, webhook_id, event_type, status_code, response_time_ms, error_message, created_at
        FROM webhook_logs
        WHERE webhook_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(query.webhook_id)
    .bind(query.limit())
    .fetch_all(&pool)
    .await?;

    Ok(WebhookLogsResponse {
        webhook_id: query.webhook_id,
        logs,
    })
}
