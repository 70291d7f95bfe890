use std::fmt;
use std::str::FromStr;

use crate::domain::order::{CustomerId, OrderCommand};
use crate::domain::sales::SalesPeriod;

// ============================================================================
// Inbound Payloads
// ============================================================================
//
// Button callbacks carry short prefixed strings (`cat_Coffee`, `pay_cash`);
// typed messages carry slash commands. Both parse into one `Callback`.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackParseError {
    #[error("Empty payload")]
    Empty,

    #[error("Unrecognized payload: {0}")]
    Unrecognized(String),

    #[error("Missing value after '{0}'")]
    MissingValue(&'static str),

    #[error("Invalid customer id: {0}")]
    InvalidCustomerId(String),

    #[error("Unknown sales period: {0}")]
    UnknownPeriod(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Start,
    Help,
    OrderNow,
    Category(String),
    Item(String),
    Sweetness(String),
    OrderMore,
    ConfirmOrder,
    Pay(String),
    StorePanel,
    StoreOpen,
    StoreClose,
    Done(CustomerId),
    SalesPanel,
    Sales(SalesPeriod),
}

impl Callback {
    /// Customer-facing steps of the ordering dialog
    pub fn to_order_command(&self) -> Option<OrderCommand> {
        let command = match self {
            Callback::OrderNow => OrderCommand::EnterOrdering,
            Callback::Category(name) => OrderCommand::ChooseCategory(name.clone()),
            Callback::Item(name) => OrderCommand::ChooseItem(name.clone()),
            Callback::Sweetness(level) => OrderCommand::ChooseSweetness(level.clone()),
            Callback::OrderMore => OrderCommand::OrderMore,
            Callback::ConfirmOrder => OrderCommand::Confirm,
            Callback::Pay(method) => OrderCommand::ChoosePayment(method.clone()),
            _ => return None,
        };
        Some(command)
    }

    pub fn requires_operator(&self) -> bool {
        matches!(
            self,
            Callback::StorePanel
                | Callback::StoreOpen
                | Callback::StoreClose
                | Callback::Done(_)
                | Callback::SalesPanel
                | Callback::Sales(_)
        )
    }
}

fn value<'a>(rest: &'a str, prefix: &'static str) -> Result<&'a str, CallbackParseError> {
    if rest.is_empty() {
        Err(CallbackParseError::MissingValue(prefix))
    } else {
        Ok(rest)
    }
}

impl FromStr for Callback {
    type Err = CallbackParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CallbackParseError::Empty);
        }

        if let Some(command) = s.strip_prefix('/') {
            // `/order@SomeBot` in group chats
            let command = command.split('@').next().unwrap_or(command);
            return match command {
                "start" => Ok(Callback::Start),
                "help" => Ok(Callback::Help),
                "order" => Ok(Callback::OrderNow),
                "store" => Ok(Callback::StorePanel),
                "sales" => Ok(Callback::SalesPanel),
                _ => Err(CallbackParseError::Unrecognized(s.to_string())),
            };
        }

        match s {
            "order_now" => return Ok(Callback::OrderNow),
            "order_more" => return Ok(Callback::OrderMore),
            "confirm_order" => return Ok(Callback::ConfirmOrder),
            "store_open" => return Ok(Callback::StoreOpen),
            "store_close" => return Ok(Callback::StoreClose),
            _ => {}
        }

        if let Some(rest) = s.strip_prefix("cat_") {
            Ok(Callback::Category(value(rest, "cat_")?.to_string()))
        } else if let Some(rest) = s.strip_prefix("item_") {
            Ok(Callback::Item(value(rest, "item_")?.to_string()))
        } else if let Some(rest) = s.strip_prefix("sweet_") {
            Ok(Callback::Sweetness(value(rest, "sweet_")?.to_string()))
        } else if let Some(rest) = s.strip_prefix("pay_") {
            Ok(Callback::Pay(value(rest, "pay_")?.to_string()))
        } else if let Some(rest) = s.strip_prefix("done_") {
            value(rest, "done_")?
                .parse()
                .map(Callback::Done)
                .map_err(|_| CallbackParseError::InvalidCustomerId(rest.to_string()))
        } else if let Some(rest) = s.strip_prefix("sales_") {
            value(rest, "sales_")?
                .parse()
                .map(Callback::Sales)
                .map_err(|_| CallbackParseError::UnknownPeriod(rest.to_string()))
        } else {
            Err(CallbackParseError::Unrecognized(s.to_string()))
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Start => f.write_str("/start"),
            Callback::Help => f.write_str("/help"),
            Callback::OrderNow => f.write_str("order_now"),
            Callback::Category(name) => write!(f, "cat_{}", name),
            Callback::Item(name) => write!(f, "item_{}", name),
            Callback::Sweetness(level) => write!(f, "sweet_{}", level),
            Callback::OrderMore => f.write_str("order_more"),
            Callback::ConfirmOrder => f.write_str("confirm_order"),
            Callback::Pay(method) => write!(f, "pay_{}", method),
            Callback::StorePanel => f.write_str("/store"),
            Callback::StoreOpen => f.write_str("store_open"),
            Callback::StoreClose => f.write_str("store_close"),
            Callback::Done(id) => write!(f, "done_{}", id),
            Callback::SalesPanel => f.write_str("/sales"),
            Callback::Sales(period) => write!(f, "sales_{}", period.as_str()),
        }
    }
}
