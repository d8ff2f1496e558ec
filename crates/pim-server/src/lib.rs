//! PIM Server Library
//!
//! HTTP service for bulk-importing product catalogs from CSV and notifying
//! external systems of catalog changes via webhooks.
//!
//! # Overview
//!
//! - **API Endpoints**: RESTful API for products, imports, and webhooks
//! - **CSV Reconciliation**: Background import engine that merges uploaded
//!   rows into the catalog by case-insensitive SKU
//! - **Webhook Dispatch**: Concurrent fan-out of change events with a
//!   per-attempt delivery log
//! - **Database Management**: PostgreSQL integration with SQLx
//! - **Configuration**: Environment-based configuration management
//!
//! # Architecture
//!
//! The HTTP surface follows a **CQRS (Command Query Responsibility
//! Segregation)** layout: each feature is a vertical slice with commands
//! (writes), queries (reads), and routes. The import engine and the webhook
//! dispatcher depend on the storage port traits in [`store`], never on sqlx
//! directly, so both are exercised against in-memory stores in tests.
//!
//! ## Framework Stack
//!
//! - **Axum**: Web framework (multipart upload, typed extractors)
//! - **SQLx**: PostgreSQL pool, runtime query API, migrations
//! - **Reqwest**: Webhook delivery client
//! - **Tower**: Middleware and service abstractions

pub mod api;
pub mod config;
pub mod features;
pub mod importer;
pub mod middleware;
pub mod models;
pub mod store;
pub mod webhooks;
