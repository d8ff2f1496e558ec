//! Storage port traits for the import pipeline
//!
//! The reconciliation engine and the webhook dispatcher depend only on these
//! traits, never on sqlx directly. `postgres` provides the production
//! implementation; tests supply in-memory implementations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{EventType, ImportJob, JobStatus, Product, Webhook};

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store's uniqueness constraint on SKU rejected a write.
    #[error("duplicate SKU: {0}")]
    DuplicateSku(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Catalog entry persistence, keyed by normalized SKU.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Exact-match lookup against the normalized (uppercase) SKU.
    async fn find_by_sku(&self, sku: &str) -> StoreResult<Option<Product>>;

    /// Insert a batch of new entries in one round trip.
    ///
    /// A uniqueness violation on any row fails the whole batch with
    /// [`StoreError::DuplicateSku`].
    async fn insert_batch(&self, products: &[Product]) -> StoreResult<()>;

    /// Overwrite an existing entry in place (matched by id).
    async fn update(&self, product: &Product) -> StoreResult<()>;
}

/// Running counters for one import job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCounters {
    pub processed: i32,
    pub created: i32,
    pub updated: i32,
}

/// Durable record of each import attempt's lifecycle and counters.
#[async_trait]
pub trait JobLedger: Send + Sync {
    async fn create(&self, job: &ImportJob) -> StoreResult<()>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<ImportJob>>;

    async fn set_status(&self, id: Uuid, status: JobStatus) -> StoreResult<()>;

    /// Persist the row-count denominator before processing begins.
    async fn set_total(&self, id: Uuid, total: i32) -> StoreResult<()>;

    /// Persist an intermediate counter snapshot.
    async fn checkpoint(&self, id: Uuid, counters: JobCounters) -> StoreResult<()>;

    /// Persist final counters and mark the job completed.
    async fn complete(&self, id: Uuid, counters: JobCounters) -> StoreResult<()>;

    /// Mark the job failed with a human-readable message.
    async fn fail(&self, id: Uuid, message: &str) -> StoreResult<()>;
}

/// Read access to webhook subscriptions for the dispatcher.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Snapshot of active subscriptions whose filter matches the event type.
    async fn list_active_matching(&self, event_type: EventType) -> StoreResult<Vec<Webhook>>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Webhook>>;
}

/// Input for one delivery log entry.
#[derive(Debug, Clone)]
pub struct NewDeliveryLog {
    pub webhook_id: Uuid,
    pub event_type: String,
    pub status_code: Option<i32>,
    pub response_time_ms: Option<f64>,
    pub error_message: Option<String>,
}

/// Append-only record of webhook delivery attempts.
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    async fn append(&self, entry: NewDeliveryLog) -> StoreResult<()>;
}
