//! Import write operations

pub mod cancel;
pub mod upload;

pub use cancel::{CancelImportCommand, CancelImportError};
pub use upload::{UploadImportCommand, UploadImportError, UploadImportResponse};
