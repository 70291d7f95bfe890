use super::value_objects::OrderState;

// ============================================================================
// Order Rejections
// ============================================================================
//
// Every variant is recoverable: the session is left untouched and the caller
// turns the rejection into a notice for the customer.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEvent {
    #[error("'{event}' is not expected while {state:?}")]
    UnexpectedInState { event: &'static str, state: OrderState },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Item '{item}' is not on the {category} menu")]
    UnknownItem { category: String, item: String },

    #[error("Unknown sweetness level: {0}")]
    UnknownSweetness(String),

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] InvalidEvent),

    #[error("Order already holds the maximum of {max_items} drinks")]
    LimitReached { max_items: usize },

    #[error("Store is closed")]
    StoreClosed,
}

impl OrderError {
    /// Short label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::InvalidEvent(_) => "invalid_event",
            OrderError::LimitReached { .. } => "limit_reached",
            OrderError::StoreClosed => "store_closed",
        }
    }
}
