use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

use crate::domain::order::OrderRecord;
use crate::domain::sales::{SalesPeriod, SalesSummary};
use super::{OrderStore, StoreError};

/// Process-local store used when no database is configured
#[derive(Default)]
pub struct InMemoryOrderStore {
    records: RwLock<Vec<OrderRecord>>,
    // Number of upcoming saves to fail; lets callers exercise the retry path
    fail_next: AtomicU32,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_saves(&self, count: u32) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    pub async fn records(&self) -> Vec<OrderRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save_order(&self, record: &OrderRecord) -> Result<(), StoreError> {
        let injected = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }

        let mut records = self.records.write().await;
        if records.iter().any(|r| r.order_id == record.order_id) {
            tracing::debug!(order_id = %record.order_id, "Order already saved");
            return Ok(());
        }
        records.push(record.clone());
        tracing::debug!(order_id = %record.order_id, "Order saved in memory");
        Ok(())
    }

    async fn query_summary(&self, period: SalesPeriod) -> Result<SalesSummary, StoreError> {
        let records = self.records.read().await;
        Ok(SalesSummary::tally(period, Utc::now(), records.iter()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
