//! Import read operations

pub mod get_progress;
pub mod list_jobs;

pub use get_progress::{GetImportProgressError, GetImportProgressQuery, ImportProgressResponse};
pub use list_jobs::{ListImportJobsError, ListImportJobsQuery, ListImportJobsResponse};
