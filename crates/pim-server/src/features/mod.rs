//! Feature modules implementing the PIM API
//!
//! Each feature is a vertical slice following the CQRS (Command Query
//! Responsibility Segregation) pattern, with its own commands, queries, and
//! routes.
//!
//! # Features
//!
//! - **products**: CRUD operations for catalog products
//! - **imports**: CSV upload, progress tracking, and cancellation
//! - **webhooks**: Webhook subscription management, test deliveries, and
//!   delivery logs
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations (create, update, delete)
//! - `queries/` - Read operations (get, list)
//! - `routes.rs` - HTTP route definitions
//!
//! Commands and queries implement the mediator pattern using the `mediator`
//! crate, enabling clean separation of concerns and easy testing.

pub mod imports;
pub mod products;
pub mod shared;
pub mod webhooks;

use axum::Router;

use crate::config::ImportConfig;
use crate::store::PgStore;
use crate::webhooks::Dispatcher;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: sqlx::PgPool,
    /// Store implementation backing the import engine and dispatcher
    pub store: PgStore,
    /// Webhook event dispatcher
    pub dispatcher: Dispatcher,
    /// Upload limits for the import feature
    pub import: ImportConfig,
}

/// Creates the main API router with all feature routes mounted
///
/// - `/products` - Catalog management
/// - `/imports` - CSV bulk import
/// - `/webhooks` - Webhook subscriptions and delivery logs
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/products", products::products_routes(state.clone()))
        .nest("/imports", imports::imports_routes(state.clone()))
        .nest("/webhooks", webhooks::webhooks_routes(state))
}
