use async_trait::async_trait;

use crate::domain::order::OrderRecord;
use crate::domain::sales::{SalesPeriod, SalesSummary};
use crate::utils::Retryable;

mod memory;
mod postgres;

pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;

// ============================================================================
// Order Persistence
// ============================================================================
//
// Finished orders are written once and only read back as aggregates for the
// operator's sales report. Failures here never reach the customer.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl Retryable for StoreError {
    fn is_retryable(&self) -> bool {
        match self {
            StoreError::Serialization(_) => false,
            StoreError::Unavailable(_) => true,
            StoreError::Database(e) => !matches!(
                e,
                sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_)
            ),
        }
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn save_order(&self, record: &OrderRecord) -> Result<(), StoreError>;

    async fn query_summary(&self, period: SalesPeriod) -> Result<SalesSummary, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}
