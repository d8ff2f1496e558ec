//! Cancel import command
//!
//! Best-effort: marks the job failed with a cancellation message. The
//! engine notices the terminal status at its next checkpoint and stops.

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::JobStatus;
use crate::store::{JobLedger, PgStore, StoreError};

/// Command to cancel a running import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelImportCommand {
    pub job_id: Uuid,
}

/// Response from cancelling an import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelImportResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// Errors that can occur when cancelling an import
#[derive(Debug, thiserror::Error)]
pub enum CancelImportError {
    #[error("Import job '{0}' not found")]
    NotFound(Uuid),

    #[error("Import job already finished with status '{0}'")]
    AlreadyFinished(JobStatus),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<CancelImportResponse, CancelImportError>> for CancelImportCommand {}

/// Handler function for cancelling an import
#[tracing::instrument(skip(store), fields(job_id = %command.job_id))]
pub async fn handle(
    store: PgStore,
    command: CancelImportCommand,
) -> Result<CancelImportResponse, CancelImportError> {
    let job = store
        .get(command.job_id)
        .await?
        .ok_or(CancelImportError::NotFound(command.job_id))?;

    if job.status.is_terminal() {
        return Err(CancelImportError::AlreadyFinished(job.status));
    }

    store.fail(job.id, "cancelled by operator").await?;

    tracing::info!(job_id = %job.id, "Import job cancelled");

    Ok(CancelImportResponse {
        job_id: job.id,
        status: JobStatus::Failed,
    })
}
