//! Import progress query
//!
//! Returns the counters as of the engine's last checkpoint. An unknown job
//! id is a distinct not-found outcome, never a zeroed snapshot.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ImportJob, JobStatus};
use crate::store::{JobLedger, PgStore, StoreError};

/// Query to fetch one import job's progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetImportProgressQuery {
    pub job_id: Uuid,
}

/// Progress snapshot for an import job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportProgressResponse {
    pub job_id: Uuid,
    pub filename: String,
    pub status: JobStatus,
    pub total_records: i32,
    pub processed_records: i32,
    pub created_records: i32,
    pub updated_records: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ImportJob> for ImportProgressResponse {
    fn from(job: ImportJob) -> Self {
        Self {
            job_id: job.id,
            filename: job.filename,
            status: job.status,
            total_records: job.total_records,
            processed_records: job.processed_records,
            created_records: job.created_records,
            updated_records: job.updated_records,
            error_message: job.error_message,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Errors that can occur when fetching progress
#[derive(Debug, thiserror::Error)]
pub enum GetImportProgressError {
    #[error("Import job '{0}' not found")]
    NotFound(Uuid),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<ImportProgressResponse, GetImportProgressError>> for GetImportProgressQuery {}

/// Handler function for fetching import progress
#[tracing::instrument(skip(store), fields(job_id = %query.job_id))]
pub async fn handle(
    store: PgStore,
    query: GetImportProgressQuery,
) -> Result<ImportProgressResponse, GetImportProgressError> {
    let job = store
        .get(query.job_id)
        .await?
        .ok_or(GetImportProgressError::NotFound(query.job_id))?;

    Ok(job.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_carries_all_counters() {
        let mut job = ImportJob::new("products.csv".to_string());
        job.status = JobStatus::Processing;
        job.total_records = 100;
        job.processed_records = 40;
        job.created_records = 30;
        job.updated_records = 10;

        let snapshot = ImportProgressResponse::from(job.clone());
        assert_eq!(snapshot.job_id, job.id);
        assert_eq!(snapshot.status, JobStatus::Processing);
        assert_eq!(snapshot.processed_records, 40);
        assert_eq!(snapshot.created_records, 30);
        assert_eq!(snapshot.updated_records, 10);
    }
}
