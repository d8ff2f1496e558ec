//! CSV reconciliation engine
//!
//! Streams an uploaded CSV against the catalog: existing SKUs are updated in
//! place, new SKUs are staged and bulk-inserted in batches. Counters are
//! checkpointed to the job ledger as processing advances, and change events
//! go out through the dispatcher.
//!
//! Rows are processed strictly in file order. A bad row never aborts the
//! job; only structural problems (bad encoding, no usable header) do.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::csv as csv_input;
use super::ImportError;
use crate::models::{EventType, JobStatus, Product};
use crate::store::{JobCounters, JobLedger, ProductStore};
use crate::webhooks::Dispatcher;

/// Staged creates are flushed to the store in batches of this size.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Counters are persisted every this many processed rows.
pub const CHECKPOINT_INTERVAL: i32 = 100;

/// How an import run ended, short of a job-fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The job was externally marked terminal mid-run; processing stopped
    /// at a checkpoint.
    Cancelled,
}

/// Runs one import job to a terminal state.
pub struct ImportEngine {
    products: Arc<dyn ProductStore>,
    ledger: Arc<dyn JobLedger>,
    dispatcher: Dispatcher,
    batch_size: usize,
}

impl ImportEngine {
    pub fn new(
        products: Arc<dyn ProductStore>,
        ledger: Arc<dyn JobLedger>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            products,
            ledger,
            dispatcher,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Run the job to a terminal state. A returned error has already been
    /// recorded on the job; it propagates so the spawning task can log it.
    pub async fn run(&self, job_id: Uuid, bytes: &[u8]) -> Result<Outcome, ImportError> {
        match self.process(job_id, bytes).await {
            Ok(outcome) => {
                info!(job_id = %job_id, ?outcome, "import finished");
                Ok(outcome)
            }
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "import failed");
                if let Err(mark_err) = self.ledger.fail(job_id, &e.to_string()).await {
                    warn!(job_id = %job_id, error = %mark_err, "failed to mark job failed");
                }
                Err(e)
            }
        }
    }

    async fn process(&self, job_id: Uuid, bytes: &[u8]) -> Result<Outcome, ImportError> {
        self.ledger.set_status(job_id, JobStatus::Processing).await?;

        // The csv reader tolerates invalid UTF-8 per field; reject the whole
        // payload up front instead of importing garbage.
        std::str::from_utf8(bytes).map_err(|_| ImportError::Encoding)?;

        // First pass: resolve columns and count the denominator.
        let mut counting = csv_input::reader(bytes);
        let headers = counting.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ImportError::EmptyInput);
        }
        let columns = csv_input::Columns::from_headers(&headers)?;
        let total = counting.records().count() as i32;
        self.ledger.set_total(job_id, total).await?;
        debug!(job_id = %job_id, total, "counted import rows");

        // Second pass: reconcile row by row.
        let mut counters = JobCounters::default();
        let mut staged: Vec<Product> = Vec::new();
        let mut staged_index: HashMap<String, usize> = HashMap::new();
        // Parallel to `staged`: updated increments each entry absorbed from
        // in-batch duplicates, retracted with the entry if its insert fails.
        let mut staged_merges: Vec<i32> = Vec::new();
        let mut last_checkpoint = 0i32;
        let mut line = 1u64;

        let mut reader = csv_input::reader(bytes);
        for result in reader.records() {
            line += 1;
            let outcome = match result {
                Ok(record) => csv_input::parse_row(&record, &columns),
                Err(e) => csv_input::RowOutcome::Invalid(e.to_string()),
            };

            match outcome {
                csv_input::RowOutcome::Blank => {
                    warn!(job_id = %job_id, line, "skipping row with blank sku or name");
                }
                csv_input::RowOutcome::Invalid(reason) => {
                    warn!(job_id = %job_id, line, reason, "skipping malformed row");
                    counters.processed += 1;
                }
                csv_input::RowOutcome::Parsed(row) => {
                    self.reconcile_row(
                        row,
                        &mut staged,
                        &mut staged_index,
                        &mut staged_merges,
                        &mut counters,
                    )
                    .await;
                    counters.processed += 1;
                }
            }

            if staged.len() >= self.batch_size {
                self.flush(&mut staged, &mut staged_index, &mut staged_merges, &mut counters)
                    .await;
            }

            if counters.processed - last_checkpoint >= CHECKPOINT_INTERVAL {
                last_checkpoint = counters.processed;
                self.ledger.checkpoint(job_id, counters).await?;
                if let Some(job) = self.ledger.get(job_id).await? {
                    if job.status.is_terminal() {
                        info!(job_id = %job_id, processed = counters.processed, "stopping cancelled import");
                        return Ok(Outcome::Cancelled);
                    }
                }
            }
        }

        self.flush(&mut staged, &mut staged_index, &mut staged_merges, &mut counters)
            .await;
        self.ledger.complete(job_id, counters).await?;
        self.dispatcher.dispatch(
            EventType::ImportCompleted,
            json!({
                "job_id": job_id,
                "total_records": total,
                "processed_records": counters.processed,
                "created_records": counters.created,
                "updated_records": counters.updated,
            }),
        );

        Ok(Outcome::Completed)
    }

    /// Merge one parsed row into the catalog or the staged batch.
    ///
    /// Store errors are contained here: the row is dropped from the
    /// counters it would have contributed to and iteration continues.
    async fn reconcile_row(
        &self,
        row: csv_input::ParsedRow,
        staged: &mut Vec<Product>,
        staged_index: &mut HashMap<String, usize>,
        staged_merges: &mut Vec<i32>,
        counters: &mut JobCounters,
    ) {
        let existing = match self.products.find_by_sku(&row.sku).await {
            Ok(found) => found,
            Err(e) => {
                warn!(sku = %row.sku, error = %e, "lookup failed, skipping row");
                return;
            }
        };

        if let Some(mut product) = existing {
            product.name = row.name;
            product.description = row.description;
            product.price = row.price;
            product.quantity = row.quantity;
            product.updated_at = Utc::now();
            match self.products.update(&product).await {
                Ok(()) => {
                    counters.updated += 1;
                    self.dispatcher.dispatch(
                        EventType::ProductUpdated,
                        json!({"product_id": product.id, "sku": product.sku}),
                    );
                }
                Err(e) => {
                    warn!(sku = %product.sku, error = %e, "update failed, skipping row");
                }
            }
        } else if let Some(&idx) = staged_index.get(&row.sku) {
            // Same SKU seen earlier in this batch: the later row wins.
            let pending = &mut staged[idx];
            pending.name = row.name;
            pending.description = row.description;
            pending.price = row.price;
            pending.quantity = row.quantity;
            pending.updated_at = Utc::now();
            staged_merges[idx] += 1;
            counters.updated += 1;
        } else {
            let product = Product::new(&row.sku, row.name, row.description, row.price, row.quantity);
            staged_index.insert(product.sku.clone(), staged.len());
            staged.push(product);
            staged_merges.push(0);
            counters.created += 1;
        }
    }

    /// Bulk-insert the staged batch, then emit the deferred created events.
    ///
    /// If the bulk insert fails, each row is retried on its own; rows that
    /// still fail are logged and retracted from the created count, along
    /// with any updated increments they absorbed from in-batch duplicates.
    async fn flush(
        &self,
        staged: &mut Vec<Product>,
        staged_index: &mut HashMap<String, usize>,
        staged_merges: &mut Vec<i32>,
        counters: &mut JobCounters,
    ) {
        if staged.is_empty() {
            return;
        }

        match self.products.insert_batch(staged).await {
            Ok(()) => {
                for product in staged.iter() {
                    self.emit_created(product);
                }
            }
            Err(e) => {
                warn!(batch = staged.len(), error = %e, "bulk insert failed, retrying rows individually");
                for (product, merges) in staged.iter().zip(staged_merges.iter()) {
                    match self.products.insert_batch(std::slice::from_ref(product)).await {
                        Ok(()) => self.emit_created(product),
                        Err(row_err) => {
                            warn!(sku = %product.sku, error = %row_err, "insert failed, dropping row");
                            counters.created -= 1;
                            counters.updated -= merges;
                        }
                    }
                }
            }
        }

        staged.clear();
        staged_index.clear();
        staged_merges.clear();
    }

    fn emit_created(&self, product: &Product) {
        self.dispatcher.dispatch(
            EventType::ProductCreated,
            json!({"product_id": product.id, "sku": product.sku}),
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{ImportJob, Webhook};
    use crate::store::memory::MemStore;
    use std::time::Duration;

    fn engine(store: &Arc<MemStore>) -> ImportEngine {
        let dispatcher = Dispatcher::new(
            store.clone(),
            store.clone(),
            Duration::from_secs(1),
            500,
        )
        .unwrap();
        ImportEngine::new(store.clone(), store.clone(), dispatcher)
    }

    async fn new_job(store: &Arc<MemStore>) -> Uuid {
        let job = ImportJob::new("products.csv".to_string());
        let id = job.id;
        JobLedger::create(store.as_ref(), &job).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_creates_and_updates() {
        let store = Arc::new(MemStore::new());
        store.seed_product(Product::new("B1", "Old name".to_string(), None, None, 1));
        let job_id = new_job(&store).await;

        let csv = "sku,name,price,quantity\nb1,New name,5.00,7\nC1,Gadget,,2\n";
        let outcome = engine(&store).run(job_id, csv.as_bytes()).await.unwrap();

        assert_eq!(outcome, Outcome::Completed);
        let job = store.job(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.total_records, 2);
        assert_eq!(job.processed_records, 2);
        assert_eq!(job.created_records, 1);
        assert_eq!(job.updated_records, 1);

        // Case-insensitive match: "b1" updated the existing "B1" entry.
        let updated = store.product("B1").unwrap();
        assert_eq!(updated.name, "New name");
        assert_eq!(updated.price, Some("5.00".parse().unwrap()));
        assert_eq!(updated.quantity, 7);

        let created = store.product("C1").unwrap();
        assert_eq!(created.price, None);
        assert!(created.active);
    }

    #[tokio::test]
    async fn test_reimport_updates_everything() {
        let store = Arc::new(MemStore::new());
        let csv = "sku,name\na1,First\na2,Second\n";

        let job1 = new_job(&store).await;
        engine(&store).run(job1, csv.as_bytes()).await.unwrap();
        let job2 = new_job(&store).await;
        engine(&store).run(job2, csv.as_bytes()).await.unwrap();

        let second = store.job(job2).unwrap();
        assert_eq!(second.created_records, 0);
        assert_eq!(second.updated_records, 2);
        assert_eq!(store.product_count(), 2);
    }

    #[tokio::test]
    async fn test_in_batch_duplicate_counts_as_update() {
        let store = Arc::new(MemStore::new());
        let job_id = new_job(&store).await;

        let csv = "sku,name,quantity\nA1,First,1\na1,Second,9\n";
        engine(&store).run(job_id, csv.as_bytes()).await.unwrap();

        let job = store.job(job_id).unwrap();
        assert_eq!(job.created_records, 1);
        assert_eq!(job.updated_records, 1);
        assert_eq!(store.product_count(), 1);

        // The later row wins.
        let product = store.product("A1").unwrap();
        assert_eq!(product.name, "Second");
        assert_eq!(product.quantity, 9);
    }

    #[tokio::test]
    async fn test_bad_price_skips_row_without_aborting() {
        let store = Arc::new(MemStore::new());
        let job_id = new_job(&store).await;

        let csv = "sku,name,price\nA1,Ok,1.00\nA2,Bad,not-a-price\nA3,Ok too,\n";
        engine(&store).run(job_id, csv.as_bytes()).await.unwrap();

        let job = store.job(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.processed_records, 3);
        assert_eq!(job.created_records, 2);
        assert!(store.product("A2").is_none());
    }

    #[tokio::test]
    async fn test_blank_rows_skipped_without_counting() {
        let store = Arc::new(MemStore::new());
        let job_id = new_job(&store).await;

        let csv = "sku,name\nA1,Widget\n,Nameless\nA2,\n";
        engine(&store).run(job_id, csv.as_bytes()).await.unwrap();

        let job = store.job(job_id).unwrap();
        assert_eq!(job.total_records, 3);
        assert_eq!(job.processed_records, 1);
        assert_eq!(job.created_records, 1);
    }

    #[tokio::test]
    async fn test_empty_payload_fails_job() {
        let store = Arc::new(MemStore::new());
        let job_id = new_job(&store).await;

        let result = engine(&store).run(job_id, b"").await;
        assert!(result.is_err());

        let job = store.job(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error_message.is_some());
    }

    #[tokio::test]
    async fn test_missing_column_fails_job() {
        let store = Arc::new(MemStore::new());
        let job_id = new_job(&store).await;

        let result = engine(&store).run(job_id, b"sku,price\nA1,2.00\n").await;
        assert!(matches!(result, Err(ImportError::MissingColumn("name"))));
        assert_eq!(store.job(job_id).unwrap().status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_invalid_utf8_fails_job() {
        let store = Arc::new(MemStore::new());
        let job_id = new_job(&store).await;

        let result = engine(&store).run(job_id, &[0xff, 0xfe, 0x00]).await;
        assert!(matches!(result, Err(ImportError::Encoding)));
        assert_eq!(store.job(job_id).unwrap().status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_failed_insert_retried_per_row_and_retracted() {
        let store = Arc::new(MemStore::new());
        store.reject_sku("X2");
        let job_id = new_job(&store).await;

        let csv = "sku,name\nX1,One\nX2,Two\nX3,Three\n";
        engine(&store).run(job_id, csv.as_bytes()).await.unwrap();

        let job = store.job(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.processed_records, 3);
        assert_eq!(job.created_records, 2);
        assert!(store.product("X1").is_some());
        assert!(store.product("X2").is_none());
        assert!(store.product("X3").is_some());
    }

    #[tokio::test]
    async fn test_failed_insert_retracts_absorbed_duplicate_updates() {
        let store = Arc::new(MemStore::new());
        store.reject_sku("X2");
        let job_id = new_job(&store).await;

        // "x2" merges into the staged "X2" entry and counts as an update;
        // when X2 never persists, that update has to be taken back too.
        let csv = "sku,name\nX1,One\nX2,Two\nx2,Two again\n";
        engine(&store).run(job_id, csv.as_bytes()).await.unwrap();

        let job = store.job(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.processed_records, 3);
        assert_eq!(job.created_records, 1);
        assert_eq!(job.updated_records, 0);
        assert!(store.product("X1").is_some());
        assert!(store.product("X2").is_none());
    }

    #[tokio::test]
    async fn test_cancellation_stops_at_checkpoint() {
        let store = Arc::new(MemStore::new());
        store.cancel_after_checkpoints(1);
        let job_id = new_job(&store).await;

        let mut csv = String::from("sku,name\n");
        for i in 0..250 {
            csv.push_str(&format!("P{i},Product {i}\n"));
        }

        let outcome = engine(&store).run(job_id, csv.as_bytes()).await.unwrap();
        assert_eq!(outcome, Outcome::Cancelled);

        let job = store.job(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.processed_records, CHECKPOINT_INTERVAL);
        assert_eq!(job.error_message.as_deref(), Some("cancelled by operator"));
    }

    #[tokio::test]
    async fn test_batches_flush_at_configured_size() {
        let store = Arc::new(MemStore::new());
        let job_id = new_job(&store).await;

        let mut csv = String::from("sku,name\n");
        for i in 0..5 {
            csv.push_str(&format!("B{i},Item {i}\n"));
        }

        let engine = engine(&store).with_batch_size(2);
        engine.run(job_id, csv.as_bytes()).await.unwrap();

        assert_eq!(store.product_count(), 5);
        assert_eq!(store.job(job_id).unwrap().created_records, 5);
    }

    #[tokio::test]
    async fn test_counters_never_exceed_processed() {
        let store = Arc::new(MemStore::new());
        store.seed_product(Product::new("S1", "Seeded".to_string(), None, None, 1));
        let job_id = new_job(&store).await;

        let csv = "sku,name,price\ns1,Update,\nN1,New,\nBAD,Row,oops\nn1,Again,\n";
        engine(&store).run(job_id, csv.as_bytes()).await.unwrap();

        let job = store.job(job_id).unwrap();
        assert!(job.created_records + job.updated_records <= job.processed_records);
        assert_eq!(job.processed_records, 4);
    }

    #[tokio::test]
    async fn test_events_emitted_for_creates_updates_and_completion() {
        use chrono::Utc;

        let now = Utc::now();
        let subs: Vec<Webhook> = [
            EventType::ProductCreated,
            EventType::ProductUpdated,
            EventType::ImportCompleted,
        ]
        .into_iter()
        .map(|event_type| Webhook {
            id: Uuid::new_v4(),
            // Unroutable; the delivery log still records the attempts.
            url: "http://127.0.0.1:1/hook".to_string(),
            event_type,
            active: true,
            created_at: now,
            updated_at: now,
        })
        .collect();

        let store = Arc::new(MemStore::with_webhooks(subs));
        store.seed_product(Product::new("U1", "Seeded".to_string(), None, None, 1));
        let job_id = new_job(&store).await;

        let csv = "sku,name\nu1,Updated\nN1,Created\n";
        engine(&store).run(job_id, csv.as_bytes()).await.unwrap();

        // dispatch() is fire-and-forget; wait for the three attempts.
        let mut logs = store.log_entries();
        for _ in 0..100 {
            if logs.len() >= 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            logs = store.log_entries();
        }

        let types: Vec<&str> = logs.iter().map(|l| l.event_type.as_str()).collect();
        assert!(types.contains(&"product_updated"));
        assert!(types.contains(&"product_created"));
        assert!(types.contains(&"import_completed"));
    }
}
