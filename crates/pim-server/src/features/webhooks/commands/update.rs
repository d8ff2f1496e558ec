//! Update webhook command

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{validate_url, UrlValidationError};
use crate::models::{EventType, Webhook};
use crate::store::postgres::WebhookRow;

/// Command to update a webhook subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWebhookCommand {
    /// Set from the path parameter, not the body
    #[serde(skip)]
    pub id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Errors that can occur when updating a webhook
#[derive(Debug, thiserror::Error)]
pub enum UpdateWebhookError {
    #[error("URL validation failed: {0}")]
    UrlValidation(#[from] UrlValidationError),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Webhook '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Webhook, UpdateWebhookError>> for UpdateWebhookCommand {}

impl UpdateWebhookCommand {
    /// Validates the command parameters
    pub fn validate(&self) -> Result<(), UpdateWebhookError> {
        if self.url.is_none() && self.event_type.is_none() && self.active.is_none() {
            return Err(UpdateWebhookError::NoFieldsToUpdate);
        }
        if let Some(ref url) = self.url {
            validate_url(url, "url")?;
        }
        Ok(())
    }
}

/// Handler function for updating webhooks
#[tracing::instrument(skip(pool, command), fields(webhook_id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateWebhookCommand,
) -> Result<Webhook, UpdateWebhookError> {
    command.validate()?;

    let row = sqlx::query_as::<_, WebhookRow>(
        r#"
        SELECT id, url, event_type, active, created_at, updated_at
        FROM webhooks
        WHERE id = $1
        "#,
    )
    .bind(command.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(UpdateWebhookError::NotFound(command.id))?;

    let mut webhook = row.into_webhook()?;

    if let Some(url) = command.url {
        webhook.url = url;
    }
    if let Some(event_type) = command.event_type {
        webhook.event_type = event_type;
    }
    if let Some(active) = command.active {
        webhook.active = active;
    }
    webhook.updated_at = chrono::Utc::now();

    sqlx::query(
        r#"
        UPDATE webhooks
        SET url = $2, event_type = $3, active = $4, updated_at = $5
        WHERE id = $1
        "#,
    )
    .bind(webhook.id)
    .bind(&webhook.url)
    .bind(webhook.event_type.as_str())
    .bind(webhook.active)
    .bind(webhook.updated_at)
    .execute(&pool)
    .await?;

    tracing::info!(webhook_id = %webhook.id, "Webhook updated");

    Ok(webhook)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_update() {
        let command = UpdateWebhookCommand {
            id: Uuid::new_v4(),
            url: None,
            event_type: None,
            active: None,
        };
        assert!(matches!(
            command.validate(),
            Err(UpdateWebhookError::NoFieldsToUpdate)
        ));
    }
}
