//! Webhook write operations

pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateWebhookCommand, CreateWebhookError};
pub use delete::{DeleteWebhookCommand, DeleteWebhookError};
pub use test::{TestWebhookCommand, TestWebhookError};
pub use update::{UpdateWebhookCommand, UpdateWebhookError};
