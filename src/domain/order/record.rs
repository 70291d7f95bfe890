use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::menu::Money;
use super::value_objects::{CustomerId, LineItem, OrderSummary, PaymentMethod};

// ============================================================================
// Order Record - immutable snapshot of a completed order
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: Uuid,
    pub customer_id: CustomerId,
    pub display_name: String,
    pub items: Vec<LineItem>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            lines: self.items.clone(),
            total: self.total,
        }
    }
}
