use serde::{Deserialize, Serialize};

use crate::domain::menu::MenuItem;
use crate::domain::sales::{SalesPeriod, SalesSummary};
use super::record::OrderRecord;
use super::value_objects::{CustomerId, OrderSummary, PaymentMethod, SweetnessLevel};

// ============================================================================
// Effects - outward actions requested by the ordering core
// ============================================================================
//
// Nothing in the domain sends messages. Handlers return `Dispatch` values and
// a transport-side dispatcher renders them in whatever dialect it speaks.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    ShowWelcome,
    ShowHelp { operator: bool },
    ShowCategories { categories: Vec<String> },
    ShowItems { category: String, items: Vec<MenuItem> },
    ShowSweetnessLevels { levels: Vec<SweetnessLevel> },
    ShowOrderSummary { summary: OrderSummary, can_order_more: bool },
    ShowPaymentOptions { summary: OrderSummary, methods: Vec<PaymentMethod> },
    ShowStoreClosed,
    ShowLimitReached { max_items: usize },
    ShowInvalidSelection { reason: String },
    ShowConfirmation {
        summary: OrderSummary,
        payment_method: PaymentMethod,
        payment_link: Option<String>,
    },
    NotifyOperator { order: OrderRecord },
    NotifyCustomerReady,
    ShowStoreStatus { open: bool },
    StoreStatusChanged { open: bool },
    OperatorOnly,
    OrderMarkedComplete { customer_id: CustomerId },
    ShowSalesPeriods { periods: Vec<SalesPeriod> },
    ShowSalesReport { summary: SalesSummary },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipient {
    Customer(CustomerId),
    Operator,
}

/// An effect addressed to one chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    pub recipient: Recipient,
    pub effect: Effect,
}

impl Dispatch {
    pub fn to_customer(customer_id: CustomerId, effect: Effect) -> Self {
        Self { recipient: Recipient::Customer(customer_id), effect }
    }

    pub fn to_operator(effect: Effect) -> Self {
        Self { recipient: Recipient::Operator, effect }
    }
}
