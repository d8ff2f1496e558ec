//! PIM Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the PIM workspace.
//!
//! # Overview
//!
//! This crate provides the pieces every PIM component needs:
//!
//! - **Error Handling**: the `PimError` type and `Result` alias
//! - **Logging**: tracing subscriber setup driven by environment variables
//!
//! # Example
//!
//! ```no_run
//! use pim_common::logging::{LogConfig, init_logging};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{PimError, Result};
