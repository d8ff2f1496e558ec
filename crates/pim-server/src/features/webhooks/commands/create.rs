//! Create webhook command

use chrono::Utc;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{validate_url, UrlValidationError};
use crate::models::{EventType, Webhook};

fn default_active() -> bool {
    true
}

/// Command to register a webhook subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWebhookCommand {
    /// Target URL; must be http(s)
    pub url: String,

    /// The single event type this subscription receives
    pub event_type: EventType,

    #[serde(default = "default_active")]
    pub active: bool,
}

/// Errors that can occur when creating a webhook
#[derive(Debug, thiserror::Error)]
pub enum CreateWebhookError {
    #[error("URL validation failed: {0}")]
    UrlValidation(#[from] UrlValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Webhook, CreateWebhookError>> for CreateWebhookCommand {}

impl CreateWebhookCommand {
    /// Validates the command parameters
    pub fn validate(&self) -> Result<(), CreateWebhookError> {
        validate_url(&self.url, "url")?;
        Ok(())
    }
}

/// Handler function for creating webhooks
#[tracing::instrument(skip(pool, command), fields(event_type = %command.event_type))]
pub async fn handle(
    pool: PgPool,
    command: CreateWebhookCommand,
) -> Result<Webhook, CreateWebhookError> {
    command.validate()?;

    let now = Utc::now();
    let webhook = Webhook {
        id: Uuid::new_v4(),
        url: command.url,
        event_type: command.event_type,
        active: command.active,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO webhooks (id, url, event_type, active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(webhook.id)
    .bind(&webhook.url)
    .bind(webhook.event_type.as_str())
    .bind(webhook.active)
    .bind(webhook.created_at)
    .bind(webhook.updated_at)
    .execute(&pool)
    .await?;

    tracing::info!(webhook_id = %webhook.id, "Webhook created");

    Ok(webhook)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let command = CreateWebhookCommand {
            url: "ftp://example.com".to_string(),
            event_type: EventType::ProductCreated,
            active: true,
        };
        assert!(matches!(
            command.validate(),
            Err(CreateWebhookError::UrlValidation(_))
        ));
    }

    #[test]
    fn test_active_defaults_to_true() {
        let command: CreateWebhookCommand = serde_json::from_str(
            r#"{"url": "https://example.com/hook", "event_type": "product_created"}"#,
        )
        .unwrap_or_else(|e| panic!("deserialization failed: {e}"));
        assert!(command.active);
    }
}
