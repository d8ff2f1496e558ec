//! Upload import command
//!
//! Validates the upload synchronously (filename, size), records the job,
//! and hands the payload to the reconciliation engine on a background task.
//! The HTTP caller gets the job id back immediately.

use std::sync::Arc;

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::importer::ImportEngine;
use crate::models::{ImportJob, JobStatus};
use crate::store::{JobLedger, PgStore, StoreError};
use crate::webhooks::Dispatcher;

/// Command to start a CSV import
#[derive(Debug, Clone)]
pub struct UploadImportCommand {
    /// Client-supplied filename; must end in `.csv`
    pub filename: String,

    /// Raw CSV payload
    pub bytes: Vec<u8>,
}

/// Response from starting an import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadImportResponse {
    pub job_id: Uuid,
    pub filename: String,
    pub status: JobStatus,
}

/// Errors that can occur when starting an import
#[derive(Debug, thiserror::Error)]
pub enum UploadImportError {
    #[error("A file is required")]
    MissingFilename,

    #[error("Only .csv files are accepted, got '{0}'")]
    NotCsv(String),

    #[error("File of {size} bytes exceeds the upload limit of {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<UploadImportResponse, UploadImportError>> for UploadImportCommand {}

impl UploadImportCommand {
    /// Validates the upload before any job state is created
    pub fn validate(&self, max_upload_bytes: usize) -> Result<(), UploadImportError> {
        if self.filename.trim().is_empty() {
            return Err(UploadImportError::MissingFilename);
        }
        if !self.filename.to_lowercase().ends_with(".csv") {
            return Err(UploadImportError::NotCsv(self.filename.clone()));
        }
        if self.bytes.len() > max_upload_bytes {
            return Err(UploadImportError::TooLarge {
                size: self.bytes.len(),
                max: max_upload_bytes,
            });
        }
        Ok(())
    }
}

/// Handler function for starting an import
///
/// The job row is created before the task spawns, so the returned id is
/// immediately queryable for progress.
#[tracing::instrument(skip(store, dispatcher, command), fields(filename = %command.filename))]
pub async fn handle(
    store: PgStore,
    dispatcher: Dispatcher,
    command: UploadImportCommand,
    max_upload_bytes: usize,
) -> Result<UploadImportResponse, UploadImportError> {
    command.validate(max_upload_bytes)?;

    let job = ImportJob::new(command.filename.clone());
    store.create(&job).await?;

    tracing::info!(job_id = %job.id, size = command.bytes.len(), "Import job queued");

    let engine = ImportEngine::new(
        Arc::new(store.clone()),
        Arc::new(store),
        dispatcher,
    );
    let job_id = job.id;
    let bytes = command.bytes;
    tokio::spawn(async move {
        if let Err(e) = engine.run(job_id, &bytes).await {
            tracing::error!(job_id = %job_id, error = %e, "Import task failed");
        }
    });

    Ok(UploadImportResponse {
        job_id: job.id,
        filename: job.filename,
        status: job.status,
    })
}
