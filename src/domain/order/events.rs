use crate::domain::menu::Money;
use super::value_objects::{PaymentMethod, SweetnessLevel};

// ============================================================================
// Session Events - facts decided by the state machine
// ============================================================================
//
// `OrderSession::decide` turns a command into events; `OrderSession::apply`
// is the only place the session changes.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Dialog (re)started from scratch
    OrderingStarted,
    CategorySelected { category: String },
    ItemSelected { item: String, unit_price: Money },
    /// Pending drink finished and appended to the order
    ItemCompleted { sweetness: SweetnessLevel },
    MoreRequested,
    OrderConfirmed,
    PaymentSelected { method: PaymentMethod },
    SessionReset,
}
