//! CSV bulk-import pipeline
//!
//! `csv` handles header discovery and per-row field coercion; `engine` owns
//! the reconciliation loop that merges rows into the catalog, reports
//! progress, and emits change events.

pub mod csv;
pub mod engine;

pub use engine::ImportEngine;

/// Errors that abort an import job.
///
/// Per-row problems (bad price, duplicate SKU at insert time) are handled
/// inside the row loop and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("file is not valid UTF-8")]
    Encoding,

    #[error("CSV file is empty or has no header row")]
    EmptyInput,

    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("CSV parse error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}
