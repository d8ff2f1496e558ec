//! Get webhook query

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Webhook;
use crate::store::{PgStore, StoreError, SubscriptionStore};

/// Query to fetch a single webhook by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetWebhookQuery {
    pub id: Uuid,
}

/// Errors that can occur when fetching a webhook
#[derive(Debug, thiserror::Error)]
pub enum GetWebhookError {
    #[error("Webhook '{0}' not found")]
    NotFound(Uuid),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<Webhook, GetWebhookError>> for GetWebhookQuery {}

/// Handler function for fetching a webhook
#[tracing::instrument(skip(store), fields(webhook_id = %query.id))]
pub async fn handle(store: PgStore, query: GetWebhookQuery) -> Result<Webhook, GetWebhookError> {
    store
        .get(query.id)
        .await?
        .ok_or(GetWebhookError::NotFound(query.id))
}
