//! CSV import feature
//!
//! Upload a CSV, track job progress, list past jobs, and cancel a running
//! import. The actual reconciliation runs on a background task owned by
//! [`crate::importer::ImportEngine`].

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::imports_routes;
