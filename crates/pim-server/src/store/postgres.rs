//! PostgreSQL implementations of the storage ports
//!
//! One `PgStore` wraps the shared connection pool and implements every port
//! trait. Queries use the runtime sqlx API with explicit binds.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    DeliveryLog, JobCounters, JobLedger, NewDeliveryLog, ProductStore, StoreError, StoreResult,
    SubscriptionStore,
};
use crate::models::{EventType, ImportJob, JobStatus, Product, Webhook};

/// Postgres-backed store for products, jobs, subscriptions, and delivery logs.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_unique_violation(err: sqlx::Error, sku: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateSku(sku.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl ProductStore for PgStore {
    async fn find_by_sku(&self, sku: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, description, price, quantity, active, created_at, updated_at
            FROM products
            WHERE sku = $1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn insert_batch(&self, products: &[Product]) -> StoreResult<()> {
        if products.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for product in products {
            sqlx::query(
                r#"
                INSERT INTO products
                    (id, sku, name, description, price, quantity, active, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(product.id)
            .bind(&product.sku)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.quantity)
            .bind(product.active)
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, &product.sku))?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, quantity = $5, active = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.active)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Row shape for `import_jobs`; status is stored as text.
#[derive(sqlx::FromRow)]
pub(crate) struct ImportJobRow {
    id: Uuid,
    filename: String,
    status: String,
    total_records: i32,
    processed_records: i32,
    created_records: i32,
    updated_records: i32,
    error_message: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl ImportJobRow {
    pub(crate) fn into_job(self) -> Result<ImportJob, sqlx::Error> {
        let status = self
            .status
            .parse::<JobStatus>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;
        Ok(ImportJob {
            id: self.id,
            filename: self.filename,
            status,
            total_records: self.total_records,
            processed_records: self.processed_records,
            created_records: self.created_records,
            updated_records: self.updated_records,
            error_message: self.error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl JobLedger for PgStore {
    async fn create(&self, job: &ImportJob) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO import_jobs
                (id, filename, status, total_records, processed_records,
                 created_records, updated_records, error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(job.id)
        .bind(&job.filename)
        .bind(job.status.as_str())
        .bind(job.total_records)
        .bind(job.processed_records)
        .bind(job.created_records)
        .bind(job.updated_records)
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<ImportJob>> {
        let row = sqlx::query_as::<_, ImportJobRow>(
            r#"
            SELECT id, filename, status, total_records, processed_records,
                   created_records, updated_records, error_message, created_at, updated_at
            FROM import_jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ImportJobRow::into_job).transpose().map_err(Into::into)
    }

    async fn set_status(&self, id: Uuid, status: JobStatus) -> StoreResult<()> {
        sqlx::query("UPDATE import_jobs SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_total(&self, id: Uuid, total: i32) -> StoreResult<()> {
        sqlx::query("UPDATE import_jobs SET total_records = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(total)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn checkpoint(&self, id: Uuid, counters: JobCounters) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE import_jobs
            SET processed_records = $2, created_records = $3, updated_records = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(counters.processed)
        .bind(counters.created)
        .bind(counters.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn complete(&self, id: Uuid, counters: JobCounters) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE import_jobs
            SET status = $2, processed_records = $3, created_records = $4,
                updated_records = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(JobStatus::Completed.as_str())
        .bind(counters.processed)
        .bind(counters.created)
        .bind(counters.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fail(&self, id: Uuid, message: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE import_jobs
            SET status = $2, error_message = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(JobStatus::Failed.as_str())
        .bind(message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Row shape for `webhooks`; event_type is stored as text.
#[derive(sqlx::FromRow)]
pub(crate) struct WebhookRow {
    pub id: Uuid,
    pub url: String,
    pub event_type: String,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl WebhookRow {
    pub(crate) fn into_webhook(self) -> Result<Webhook, sqlx::Error> {
        let event_type = self
            .event_type
            .parse::<EventType>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;
        Ok(Webhook {
            id: self.id,
            url: self.url,
            event_type,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn list_active_matching(&self, event_type: EventType) -> StoreResult<Vec<Webhook>> {
        let rows = sqlx::query_as::<_, WebhookRow>(
            r#"
            SELECT id, url, event_type, active, created_at, updated_at
            FROM webhooks
            WHERE active = TRUE AND event_type = $1
            ORDER BY created_at
            "#,
        )
        .bind(event_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.into_webhook().map_err(Into::into))
            .collect()
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Webhook>> {
        let row = sqlx::query_as::<_, WebhookRow>(
            r#"
            SELECT id, url, event_type, active, created_at, updated_at
            FROM webhooks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(WebhookRow::into_webhook).transpose().map_err(Into::into)
    }
}

#[async_trait]
impl DeliveryLog for PgStore {
    async fn append(&self, entry: NewDeliveryLog) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO webhook_logs
                (id, webhook_id, event_type, status_code, response_time_ms, error_message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.webhook_id)
        .bind(&entry.event_type)
        .bind(entry.status_code)
        .bind(entry.response_time_ms)
        .bind(&entry.error_message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
