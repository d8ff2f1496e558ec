//! Webhook API routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/webhooks` - Register a subscription
//! - `GET /api/v1/webhooks` - List subscriptions
//! - `GET /api/v1/webhooks/:id` - Get a subscription
//! - `PUT /api/v1/webhooks/:id` - Update a subscription
//! - `DELETE /api/v1/webhooks/:id` - Delete a subscription (cascades logs)
//! - `POST /api/v1/webhooks/:id/test` - Queue a test delivery
//! - `GET /api/v1/webhooks/:id/logs?limit=N` - Delivery log, newest first

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ErrorResponse, PaginationMeta};
use crate::features::FeatureState;

use super::commands::{
    CreateWebhookCommand, CreateWebhookError, DeleteWebhookCommand, DeleteWebhookError,
    TestWebhookCommand, TestWebhookError, UpdateWebhookCommand, UpdateWebhookError,
};
use super::queries::{
    GetWebhookError, GetWebhookLogsError, GetWebhookLogsQuery, GetWebhookQuery, ListWebhooksError,
    ListWebhooksQuery,
};

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the webhooks router with all routes configured
pub fn webhooks_routes(state: FeatureState) -> Router<()> {
    Router::new()
        .route("/", post(create_webhook).get(list_webhooks))
        .route(
            "/:id",
            get(get_webhook).put(update_webhook).delete(delete_webhook),
        )
        .route("/:id/test", post(test_webhook))
        .route("/:id/logs", get(get_webhook_logs))
        .with_state(state)
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Register a webhook subscription
///
/// `POST /api/v1/webhooks`
#[tracing::instrument(skip(state, command), fields(event_type = %command.event_type))]
async fn create_webhook(
    State(state): State<FeatureState>,
    Json(command): Json<CreateWebhookCommand>,
) -> Result<Response, WebhookApiError> {
    let webhook = super::commands::create::handle(state.db.clone(), command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(webhook))).into_response())
}

/// Update a webhook subscription
///
/// `PUT /api/v1/webhooks/:id`
#[tracing::instrument(skip(state, command), fields(webhook_id = %id))]
async fn update_webhook(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateWebhookCommand>,
) -> Result<Response, WebhookApiError> {
    command.id = id;

    let webhook = super::commands::update::handle(state.db.clone(), command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(webhook))).into_response())
}

/// Delete a webhook subscription
///
/// `DELETE /api/v1/webhooks/:id`
#[tracing::instrument(skip(state), fields(webhook_id = %id))]
async fn delete_webhook(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebhookApiError> {
    let deleted =
        super::commands::delete::handle(state.db.clone(), DeleteWebhookCommand { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(deleted))).into_response())
}

/// Queue a test delivery to one subscription
///
/// `POST /api/v1/webhooks/:id/test`
///
/// - `202 Accepted` - Delivery queued; check the delivery log for the result
/// - `404 Not Found` - Unknown webhook id
#[tracing::instrument(skip(state), fields(webhook_id = %id))]
async fn test_webhook(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebhookApiError> {
    let response = super::commands::test::handle(
        state.store.clone(),
        state.dispatcher.clone(),
        TestWebhookCommand { id },
    )
    .await?;

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Get a single webhook subscription
///
/// `GET /api/v1/webhooks/:id`
#[tracing::instrument(skip(state), fields(webhook_id = %id))]
async fn get_webhook(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebhookApiError> {
    let webhook =
        super::queries::get::handle(state.store.clone(), GetWebhookQuery { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(webhook))).into_response())
}

/// List webhook subscriptions
///
/// `GET /api/v1/webhooks?active=&page=&per_page=`
#[tracing::instrument(skip(state, query))]
async fn list_webhooks(
    State(state): State<FeatureState>,
    Query(query): Query<ListWebhooksQuery>,
) -> Result<Response, WebhookApiError> {
    let page = query.pagination().page();
    let per_page = query.pagination().per_page();

    let response = super::queries::list::handle(state.db.clone(), query).await?;
    let meta = PaginationMeta::new(page, per_page, response.total);

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(
            response.webhooks,
            json!(meta),
        )),
    )
        .into_response())
}

/// Delivery log for one subscription, newest first
///
/// `GET /api/v1/webhooks/:id/logs?limit=N`
#[tracing::instrument(skip(state, query), fields(webhook_id = %id))]
async fn get_webhook_logs(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
    Query(mut query): Query<GetWebhookLogsQuery>,
) -> Result<Response, WebhookApiError> {
    query.webhook_id = id;

    let response = super::queries::logs::handle(state.db.clone(), query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Aggregates webhook operation errors for HTTP mapping
#[derive(Debug, thiserror::Error)]
enum WebhookApiError {
    #[error(transparent)]
    Create(#[from] CreateWebhookError),
    #[error(transparent)]
    Update(#[from] UpdateWebhookError),
    #[error(transparent)]
    Delete(#[from] DeleteWebhookError),
    #[error(transparent)]
    Test(#[from] TestWebhookError),
    #[error(transparent)]
    Get(#[from] GetWebhookError),
    #[error(transparent)]
    List(#[from] ListWebhooksError),
    #[error(transparent)]
    Logs(#[from] GetWebhookLogsError),
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            WebhookApiError::Create(CreateWebhookError::UrlValidation(_))
            | WebhookApiError::Update(UpdateWebhookError::UrlValidation(_))
            | WebhookApiError::Update(UpdateWebhookError::NoFieldsToUpdate) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            WebhookApiError::Update(UpdateWebhookError::NotFound(_))
            | WebhookApiError::Delete(DeleteWebhookError::NotFound(_))
            | WebhookApiError::Test(TestWebhookError::NotFound(_))
            | WebhookApiError::Get(GetWebhookError::NotFound(_))
            | WebhookApiError::Logs(GetWebhookLogsError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            WebhookApiError::Create(CreateWebhookError::Database(_))
            | WebhookApiError::Update(UpdateWebhookError::Database(_))
            | WebhookApiError::Delete(DeleteWebhookError::Database(_))
            | WebhookApiError::Test(TestWebhookError::Store(_))
            | WebhookApiError::Get(GetWebhookError::Store(_))
            | WebhookApiError::List(ListWebhooksError::Database(_))
            | WebhookApiError::Logs(GetWebhookLogsError::Database(_)) => {
                tracing::error!("Database error in webhook API: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "A database error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
