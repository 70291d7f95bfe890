// ============================================================================
// Order Commands - what a customer asked for
// ============================================================================
//
// Payloads are carried raw; the state machine validates them against the
// catalog and the fixed sweetness/payment sets.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderCommand {
    EnterOrdering,
    ChooseCategory(String),
    ChooseItem(String),
    ChooseSweetness(String),
    OrderMore,
    Confirm,
    ChoosePayment(String),
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::EnterOrdering => "enter_ordering",
            OrderCommand::ChooseCategory(_) => "category_chosen",
            OrderCommand::ChooseItem(_) => "item_chosen",
            OrderCommand::ChooseSweetness(_) => "sweetness_chosen",
            OrderCommand::OrderMore => "order_more",
            OrderCommand::Confirm => "confirm",
            OrderCommand::ChoosePayment(_) => "payment_chosen",
        }
    }
}
