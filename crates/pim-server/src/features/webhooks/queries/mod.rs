//! Webhook read operations

pub mod get;
pub mod list;
pub mod logs;

pub use get::{GetWebhookError, GetWebhookQuery};
pub use list::{ListWebhooksError, ListWebhooksQuery, ListWebhooksResponse};
pub use logs::{GetWebhookLogsError, GetWebhookLogsQuery, WebhookLogsResponse};
