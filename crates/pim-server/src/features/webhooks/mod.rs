//! Webhook subscription feature
//!
//! Manage webhook subscriptions, trigger test deliveries, and inspect the
//! per-subscription delivery log.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::webhooks_routes;
