//! Import API routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/imports` - Upload a CSV and start a background import
//! - `GET /api/v1/imports/jobs` - List import jobs
//! - `GET /api/v1/imports/jobs/:id` - Progress snapshot for one job
//! - `POST /api/v1/imports/jobs/:id/cancel` - Best-effort cancellation
//!
//! The upload responds `202 Accepted` with the job id; the caller polls the
//! progress endpoint.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
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
    CancelImportCommand, CancelImportError, UploadImportCommand, UploadImportError,
};
use super::queries::{
    GetImportProgressError, GetImportProgressQuery, ListImportJobsError, ListImportJobsQuery,
};

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the imports router with all routes configured
pub fn imports_routes(state: FeatureState) -> Router<()> {
    // The explicit size check in the upload command produces the 413; the
    // axum body limit just needs to sit above it.
    let body_limit = state.import.max_upload_bytes.saturating_add(1024 * 1024);

    Router::new()
        .route("/", post(upload_import))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_progress))
        .route("/jobs/:id/cancel", post(cancel_import))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Upload a CSV file and start an import
///
/// `POST /api/v1/imports` (multipart, field name `file`)
///
/// - `202 Accepted` - Job created; body carries the job id
/// - `400 Bad Request` - Missing file or non-`.csv` filename
/// - `413 Payload Too Large` - File exceeds the upload limit
#[tracing::instrument(skip(state, multipart))]
async fn upload_import(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, ImportApiError> {
    let mut upload: Option<UploadImportCommand> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImportApiError::Multipart(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ImportApiError::Multipart(e.to_string()))?;
            upload = Some(UploadImportCommand {
                filename,
                bytes: bytes.to_vec(),
            });
            break;
        }
    }

    let command = upload.ok_or(ImportApiError::MissingFile)?;
    let response = super::commands::upload::handle(
        state.store.clone(),
        state.dispatcher.clone(),
        command,
        state.import.max_upload_bytes,
    )
    .await?;

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(response))).into_response())
}

/// Cancel a running import
///
/// `POST /api/v1/imports/jobs/:id/cancel`
///
/// - `200 OK` - Job marked for cancellation
/// - `404 Not Found` - Unknown job id
/// - `409 Conflict` - Job already finished
#[tracing::instrument(skip(state), fields(job_id = %id))]
async fn cancel_import(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ImportApiError> {
    let response =
        super::commands::cancel::handle(state.store.clone(), CancelImportCommand { job_id: id })
            .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Progress snapshot for one import job
///
/// `GET /api/v1/imports/jobs/:id`
#[tracing::instrument(skip(state), fields(job_id = %id))]
async fn get_progress(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ImportApiError> {
    let snapshot = super::queries::get_progress::handle(
        state.store.clone(),
        GetImportProgressQuery { job_id: id },
    )
    .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(snapshot))).into_response())
}

/// List import jobs, most recent first
///
/// `GET /api/v1/imports/jobs?page=&per_page=`
#[tracing::instrument(skip(state, query))]
async fn list_jobs(
    State(state): State<FeatureState>,
    Query(query): Query<ListImportJobsQuery>,
) -> Result<Response, ImportApiError> {
    let page = query.pagination().page();
    let per_page = query.pagination().per_page();

    let response = super::queries::list_jobs::handle(state.db.clone(), query).await?;
    let meta = PaginationMeta::new(page, per_page, response.total);

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(response.jobs, json!(meta))),
    )
        .into_response())
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Aggregates import operation errors for HTTP mapping
#[derive(Debug, thiserror::Error)]
enum ImportApiError {
    #[error("A multipart field named 'file' is required")]
    MissingFile,

    #[error("Malformed multipart request: {0}")]
    Multipart(String),

    #[error(transparent)]
    Upload(#[from] UploadImportError),
    #[error(transparent)]
    Cancel(#[from] CancelImportError),
    #[error(transparent)]
    Progress(#[from] GetImportProgressError),
    #[error(transparent)]
    List(#[from] ListImportJobsError),
}

impl IntoResponse for ImportApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ImportApiError::MissingFile
            | ImportApiError::Multipart(_)
            | ImportApiError::Upload(UploadImportError::MissingFilename)
            | ImportApiError::Upload(UploadImportError::NotCsv(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ImportApiError::Upload(UploadImportError::TooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE")
            }
            ImportApiError::Cancel(CancelImportError::NotFound(_))
            | ImportApiError::Progress(GetImportProgressError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            ImportApiError::Cancel(CancelImportError::AlreadyFinished(_)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            ImportApiError::Upload(UploadImportError::Store(_))
            | ImportApiError::Cancel(CancelImportError::Store(_))
            | ImportApiError::Progress(GetImportProgressError::Store(_))
            | ImportApiError::List(ListImportJobsError::Database(_)) => {
                tracing::error!("Database error in import API: {}", self);
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
