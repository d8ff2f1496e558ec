//! In-memory store implementations for tests
//!
//! `MemStore` implements every port trait over mutex-guarded maps so the
//! reconciliation engine and dispatcher can be exercised without a database.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    DeliveryLog, JobCounters, JobLedger, NewDeliveryLog, ProductStore, StoreError, StoreResult,
    SubscriptionStore,
};
use crate::models::{EventType, ImportJob, JobStatus, Product, Webhook};

#[derive(Default)]
pub struct MemStore {
    products: Mutex<HashMap<String, Product>>,
    jobs: Mutex<HashMap<Uuid, ImportJob>>,
    webhooks: Mutex<Vec<Webhook>>,
    logs: Mutex<Vec<NewDeliveryLog>>,
    /// SKUs that insert_batch should reject with a duplicate error.
    reject_skus: Mutex<HashSet<String>>,
    /// Remaining checkpoint calls before the job is marked failed.
    cancel_after_checkpoints: Mutex<Option<u32>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_webhooks(webhooks: Vec<Webhook>) -> Self {
        let store = Self::default();
        *store.webhooks.lock().unwrap() = webhooks;
        store
    }

    /// Make `insert_batch` reject any batch containing this SKU.
    pub fn reject_sku(&self, sku: &str) {
        self.reject_skus.lock().unwrap().insert(sku.to_string());
    }

    /// Mark the job failed after the nth checkpoint, simulating an operator
    /// cancelling a running import.
    pub fn cancel_after_checkpoints(&self, n: u32) {
        *self.cancel_after_checkpoints.lock().unwrap() = Some(n);
    }

    pub fn product(&self, sku: &str) -> Option<Product> {
        self.products.lock().unwrap().get(sku).cloned()
    }

    pub fn product_count(&self) -> usize {
        self.products.lock().unwrap().len()
    }

    pub fn seed_product(&self, product: Product) {
        self.products
            .lock()
            .unwrap()
            .insert(product.sku.clone(), product);
    }

    pub fn job(&self, id: Uuid) -> Option<ImportJob> {
        self.jobs.lock().unwrap().get(&id).cloned()
    }

    pub fn log_entries(&self) -> Vec<NewDeliveryLog> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductStore for MemStore {
    async fn find_by_sku(&self, sku: &str) -> StoreResult<Option<Product>> {
        Ok(self.products.lock().unwrap().get(sku).cloned())
    }

    async fn insert_batch(&self, products: &[Product]) -> StoreResult<()> {
        let rejects = self.reject_skus.lock().unwrap();
        let mut map = self.products.lock().unwrap();
        for product in products {
            if rejects.contains(&product.sku) || map.contains_key(&product.sku) {
                return Err(StoreError::DuplicateSku(product.sku.clone()));
            }
        }
        for product in products {
            map.insert(product.sku.clone(), product.clone());
        }
        Ok(())
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        self.products
            .lock()
            .unwrap()
            .insert(product.sku.clone(), product.clone());
        Ok(())
    }
}

#[async_trait]
impl JobLedger for MemStore {
    async fn create(&self, job: &ImportJob) -> StoreResult<()> {
        self.jobs.lock().unwrap().insert(job.id, job.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<ImportJob>> {
        Ok(self.jobs.lock().unwrap().get(&id).cloned())
    }

    async fn set_status(&self, id: Uuid, status: JobStatus) -> StoreResult<()> {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(&id) {
            job.status = status;
        }
        Ok(())
    }

    async fn set_total(&self, id: Uuid, total: i32) -> StoreResult<()> {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(&id) {
            job.total_records = total;
        }
        Ok(())
    }

    async fn checkpoint(&self, id: Uuid, counters: JobCounters) -> StoreResult<()> {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(&id) {
            job.processed_records = counters.processed;
            job.created_records = counters.created;
            job.updated_records = counters.updated;
        }
        let cancel_now = {
            let mut guard = self.cancel_after_checkpoints.lock().unwrap();
            match guard.take() {
                Some(n) if n <= 1 => true,
                Some(n) => {
                    *guard = Some(n - 1);
                    false
                }
                None => false,
            }
        };
        if cancel_now {
            if let Some(job) = self.jobs.lock().unwrap().get_mut(&id) {
                job.status = JobStatus::Failed;
                job.error_message = Some("cancelled by operator".to_string());
            }
        }
        Ok(())
    }

    async fn complete(&self, id: Uuid, counters: JobCounters) -> StoreResult<()> {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(&id) {
            job.status = JobStatus::Completed;
            job.processed_records = counters.processed;
            job.created_records = counters.created;
            job.updated_records = counters.updated;
        }
        Ok(())
    }

    async fn fail(&self, id: Uuid, message: &str) -> StoreResult<()> {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(&id) {
            job.status = JobStatus::Failed;
            job.error_message = Some(message.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for MemStore {
    async fn list_active_matching(&self, event_type: EventType) -> StoreResult<Vec<Webhook>> {
        Ok(self
            .webhooks
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.active && w.event_type == event_type)
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Webhook>> {
        Ok(self
            .webhooks
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.id == id)
            .cloned())
    }
}

#[async_trait]
impl DeliveryLog for MemStore {
    async fn append(&self, entry: NewDeliveryLog) -> StoreResult<()> {
        self.logs.lock().unwrap().push(entry);
        Ok(())
    }
}
