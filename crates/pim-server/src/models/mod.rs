//! Domain models for the product catalog
//!
//! These are the types shared by the stores, the import engine, and the
//! feature slices: catalog products, import jobs, webhook subscriptions,
//! and webhook delivery log entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry, keyed by a case-insensitively unique SKU.
///
/// The SKU is normalized to uppercase at write time so lookups are always
/// exact-match against the normalized form.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a new active product with a fresh identity and normalized SKU.
    pub fn new(
        sku: &str,
        name: String,
        description: Option<String>,
        price: Option<Decimal>,
        quantity: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sku: normalize_sku(sku),
            name,
            description,
            price,
            quantity,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Normalize a raw SKU for storage and matching: trim and uppercase.
pub fn normalize_sku(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Lifecycle status of an import job.
///
/// Valid transitions: `pending -> processing -> {completed | failed}`.
/// Terminal states never transition further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One CSV import attempt and its running counters.
///
/// Owned by the reconciliation engine for the duration of the import;
/// read-only to everything else once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: Uuid,
    pub filename: String,
    pub status: JobStatus,
    pub total_records: i32,
    pub processed_records: i32,
    pub created_records: i32,
    pub updated_records: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImportJob {
    /// New pending job for an uploaded file.
    pub fn new(filename: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filename,
            status: JobStatus::Pending,
            total_records: 0,
            processed_records: 0,
            created_records: 0,
            updated_records: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The closed set of event types a webhook subscription can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    ImportCompleted,
    Test,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ProductCreated => "product_created",
            EventType::ProductUpdated => "product_updated",
            EventType::ProductDeleted => "product_deleted",
            EventType::ImportCompleted => "import_completed",
            EventType::Test => "test",
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product_created" => Ok(EventType::ProductCreated),
            "product_updated" => Ok(EventType::ProductUpdated),
            "product_deleted" => Ok(EventType::ProductDeleted),
            "import_completed" => Ok(EventType::ImportCompleted),
            "test" => Ok(EventType::Test),
            other => Err(format!("unknown event type: {other}")),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A webhook subscription: target URL plus a single event-type filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub id: Uuid,
    pub url: String,
    pub event_type: EventType,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One webhook delivery attempt. Append-only; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WebhookLog {
    pub id: Uuid,
    pub webhook_id: Uuid,
    pub event_type: String,
    pub status_code: Option<i32>,
    pub response_time_ms: Option<f64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sku() {
        assert_eq!(normalize_sku("  abc123 "), "ABC123");
        assert_eq!(normalize_sku("ABC123"), "ABC123");
        assert_eq!(normalize_sku(""), "");
    }

    #[test]
    fn test_product_new_normalizes_sku() {
        let p = Product::new("wdg-1", "Widget".to_string(), None, None, 5);
        assert_eq!(p.sku, "WDG-1");
        assert!(p.active);
        assert_eq!(p.quantity, 5);
    }

    #[test]
    fn test_job_status_round_trip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>(), Ok(status));
        }
        assert!("running".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_event_type_round_trip() {
        for et in [
            EventType::ProductCreated,
            EventType::ProductUpdated,
            EventType::ProductDeleted,
            EventType::ImportCompleted,
            EventType::Test,
        ] {
            assert_eq!(et.as_str().parse::<EventType>(), Ok(et));
        }
        assert!("product_archived".parse::<EventType>().is_err());
    }

    #[test]
    fn test_new_job_defaults() {
        let job = ImportJob::new("products.csv".to_string());
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.total_records, 0);
        assert!(job.error_message.is_none());
    }
}
