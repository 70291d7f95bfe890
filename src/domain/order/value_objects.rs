use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::menu::Money;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Chat identity of a customer (or of the operator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CustomerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CustomerId)
    }
}

/// Who sent an inbound event, as the transport reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub display_name: String,
}

impl Customer {
    pub fn new(id: CustomerId, display_name: impl Into<String>) -> Self {
        Self { id, display_name: display_name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SweetnessLevel {
    #[serde(rename = "More sweet")]
    More,
    #[serde(rename = "Normal sweet")]
    Normal,
    #[serde(rename = "Less sweet")]
    Less,
    #[serde(rename = "No sweet")]
    None,
}

impl SweetnessLevel {
    pub const ALL: [SweetnessLevel; 4] = [
        SweetnessLevel::More,
        SweetnessLevel::Normal,
        SweetnessLevel::Less,
        SweetnessLevel::None,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SweetnessLevel::More => "More sweet",
            SweetnessLevel::Normal => "Normal sweet",
            SweetnessLevel::Less => "Less sweet",
            SweetnessLevel::None => "No sweet",
        }
    }
}

impl fmt::Display for SweetnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SweetnessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SweetnessLevel::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Aba,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::Cash, PaymentMethod::Aba];

    /// Stable key used in callbacks, storage and metric labels
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Aba => "aba",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Aba => "ABA Pay",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "aba" => Ok(PaymentMethod::Aba),
            _ => Err(s.to_string()),
        }
    }
}

/// Where a customer is in the ordering dialog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    #[default]
    SelectingCategory,
    SelectingItem,
    SelectingSweetness,
    ConfirmingOrder,
    SelectingPayment,
}

/// One priced drink in an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub category: String,
    pub item: String,
    pub sweetness: SweetnessLevel,
    pub unit_price: Money,
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.item, self.sweetness, self.unit_price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PricedItem {
    name: String,
    price: Money,
}

/// The drink under construction: category first, then name and price together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    category: String,
    selection: Option<PricedItem>,
}

impl PendingItem {
    pub fn new(category: impl Into<String>) -> Self {
        Self { category: category.into(), selection: None }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn item(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.name.as_str())
    }

    pub fn price(&self) -> Option<Money> {
        self.selection.as_ref().map(|s| s.price)
    }

    pub fn select(&mut self, item: impl Into<String>, price: Money) {
        self.selection = Some(PricedItem { name: item.into(), price });
    }

    /// Finish the drink; `None` while no item has been picked yet
    pub fn complete(self, sweetness: SweetnessLevel) -> Option<LineItem> {
        let selection = self.selection?;
        Some(LineItem {
            category: self.category,
            item: selection.name,
            sweetness,
            unit_price: selection.price,
        })
    }
}

/// Completed lines plus their exact total, as shown to customers and operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub lines: Vec<LineItem>,
    pub total: Money,
}

impl OrderSummary {
    pub fn from_lines(lines: Vec<LineItem>) -> Self {
        let total = lines.iter().map(|l| l.unit_price).sum();
        Self { lines, total }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
