//! Delete webhook command
//!
//! Removing a subscription also removes its delivery log entries via the
//! `ON DELETE CASCADE` foreign key.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Command to delete a webhook subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteWebhookCommand {
    pub id: Uuid,
}

/// Response from deleting a webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteWebhookResponse {
    pub id: Uuid,
    pub url: String,
}

/// Errors that can occur when deleting a webhook
#[derive(Debug, thiserror::Error)]
pub enum DeleteWebhookError {
    #[error("Webhook '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteWebhookResponse, DeleteWebhookError>> for DeleteWebhookCommand {}

/// Handler function for deleting webhooks
#[tracing::instrument(skip(pool), fields(webhook_id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: DeleteWebhookCommand,
) -> Result<DeleteWebhookResponse, DeleteWebhookError> {
    let deleted = sqlx::query_as::<_, (Uuid, String)>(
        "DELETE FROM webhooks WHERE id = $1 RETURNING id, url",
    )
    .bind(command.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(DeleteWebhookError::NotFound(command.id))?;

    tracing::info!(webhook_id = %deleted.0, "Webhook deleted");

    Ok(DeleteWebhookResponse {
        id: deleted.0,
        url: deleted.1,
    })
}
