//! Webhook event fan-out
//!
//! The [`Dispatcher`] delivers catalog change events to registered
//! subscriptions and records every attempt in the delivery log.

pub mod dispatcher;

pub use dispatcher::Dispatcher;
