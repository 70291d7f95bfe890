use std::fmt::Write;

use crate::domain::order::{Effect, OrderSummary, PaymentMethod};
use crate::domain::sales::SalesSummary;
use super::callback::Callback;

// ============================================================================
// Plain-text rendering of effects
// ============================================================================

/// A message with optional reply buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Button rows as (label, callback payload)
    pub buttons: Vec<Vec<(String, String)>>,
}

impl Rendered {
    fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), buttons: Vec::new() }
    }

    fn with_row(mut self, row: Vec<(String, Callback)>) -> Self {
        self.buttons
            .push(row.into_iter().map(|(label, cb)| (label, cb.to_string())).collect());
        self
    }

    fn with_column(mut self, buttons: impl IntoIterator<Item = (String, Callback)>) -> Self {
        for (label, callback) in buttons {
            self.buttons.push(vec![(label, callback.to_string())]);
        }
        self
    }
}

pub fn format_summary(summary: &OrderSummary) -> String {
    let mut out = String::from("Your Order:\n\n");
    for (idx, line) in summary.lines.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, line);
    }
    let _ = write!(out, "\nTotal: {}", summary.total);
    out
}

fn format_sales(summary: &SalesSummary) -> String {
    let mut out = format!("Sales Report: {}\n", summary.period.label());
    let _ = writeln!(
        out,
        "{} to {}\n",
        summary.start.format("%Y-%m-%d"),
        summary.end.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(ref error) = summary.error {
        let _ = writeln!(out, "Report unavailable: {}\n", error);
    }
    let _ = writeln!(out, "Total Sales: {}", summary.total_sales);
    let _ = writeln!(out, "Total Orders: {}", summary.total_orders);

    if !summary.items_sold.is_empty() {
        out.push_str("\nItems Sold:\n");
        for (name, count) in &summary.items_sold {
            let _ = writeln!(out, "- {}: {}", name, count);
        }
    }
    out
}

pub fn render(effect: &Effect) -> Rendered {
    match effect {
        Effect::ShowWelcome => Rendered::text(
            "Hi, welcome to BoBa Slow-Ba Cafe. What would you like to order?\n\nType /help to see all available commands.",
        )
        .with_row(vec![("Order Now".into(), Callback::OrderNow)]),

        Effect::ShowHelp { operator } => {
            let mut text = String::from(
                "Available commands:\n/start - Show the menu\n/order - Start a new order\n/help - Show this help",
            );
            if *operator {
                text.push_str("\n\nOperator commands:\n/store - Open or close the store\n/sales - Sales reports");
            }
            Rendered::text(text)
        }

        Effect::ShowCategories { categories } => Rendered::text("Choose a drink category:")
            .with_column(categories.iter().map(|c| (c.clone(), Callback::Category(c.clone())))),

        Effect::ShowItems { category, items } => Rendered::text(format!("Choose your {}:", category))
            .with_column(
                items
                    .iter()
                    .map(|i| (format!("{} - {}", i.name, i.price), Callback::Item(i.name.clone()))),
            ),

        Effect::ShowSweetnessLevels { levels } => Rendered::text("Choose sweetness level:").with_column(
            levels
                .iter()
                .map(|l| (l.label().to_string(), Callback::Sweetness(l.label().to_string()))),
        ),

        Effect::ShowOrderSummary { summary, can_order_more } => {
            let mut rendered = Rendered::text(format_summary(summary));
            if *can_order_more {
                rendered = rendered.with_row(vec![("Order More".into(), Callback::OrderMore)]);
            }
            rendered.with_row(vec![("Confirm Order".into(), Callback::ConfirmOrder)])
        }

        Effect::ShowPaymentOptions { summary, methods } => Rendered::text(format!(
            "{}\n\nPlease select your payment method:",
            format_summary(summary)
        ))
        .with_row(
            methods
                .iter()
                .map(|m| (format!("Pay by {}", m.label()), Callback::Pay(m.as_str().to_string())))
                .collect(),
        ),

        Effect::ShowStoreClosed => {
            Rendered::text("Sorry, the store is currently closed. Please try again later.")
        }

        Effect::ShowLimitReached { max_items } => Rendered::text(format!(
            "You've reached the maximum of {} drinks per order.",
            max_items
        ))
        .with_row(vec![("Confirm Order".into(), Callback::ConfirmOrder)]),

        Effect::ShowInvalidSelection { reason } => Rendered::text(format!(
            "That option isn't available right now ({}). Tap /order to start again.",
            reason
        )),

        Effect::ShowConfirmation { summary, payment_method, payment_link } => {
            let instructions = match (payment_method, payment_link) {
                (PaymentMethod::Aba, Some(link)) => format!(
                    "Please complete your payment using this link:\n{}\n\nYour order will be processed after payment confirmation.",
                    link
                ),
                (PaymentMethod::Aba, None) => {
                    "Please complete your payment with ABA Pay at the counter.".to_string()
                }
                (PaymentMethod::Cash, _) => {
                    "Thank you! Please pay in cash when picking up your order.".to_string()
                }
            };
            Rendered::text(format!("{}\n\n{}", format_summary(summary), instructions))
        }

        Effect::NotifyOperator { order } => {
            let mut text = format!(
                "New Order Received from {} ({})!\n\n",
                order.display_name, order.customer_id
            );
            for (idx, line) in order.items.iter().enumerate() {
                let _ = writeln!(text, "{}. {}", idx + 1, line);
            }
            let _ = write!(
                text,
                "\nTotal: {}\nPayment Method: {}",
                order.total,
                order.payment_method.label()
            );
            Rendered::text(text).with_row(vec![("Complete".into(), Callback::Done(order.customer_id))])
        }

        Effect::NotifyCustomerReady => {
            Rendered::text("Your drinks are ready! Please come and pick them up.")
        }

        Effect::ShowStoreStatus { open } => Rendered::text(format!(
            "Store Status Management\n\nCurrent status: {}\n\nSelect new status:",
            if *open { "Open" } else { "Closed" }
        ))
        .with_row(vec![
            ("Open Store".into(), Callback::StoreOpen),
            ("Close Store".into(), Callback::StoreClose),
        ]),

        Effect::StoreStatusChanged { open } => Rendered::text(format!(
            "Store Status Updated\n\nStore is now {}",
            if *open { "OPEN" } else { "CLOSED" }
        )),

        Effect::OperatorOnly => Rendered::text("Sorry, only the store owner can use this command."),

        Effect::OrderMarkedComplete { customer_id } => {
            Rendered::text(format!("Order for {} marked as complete.", customer_id))
        }

        Effect::ShowSalesPeriods { periods } => Rendered::text("Select a period for the sales report:")
            .with_column(periods.iter().map(|p| (p.label().to_string(), Callback::Sales(*p)))),

        Effect::ShowSalesReport { summary } => Rendered::text(format_sales(summary)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu::Money;
    use crate::domain::order::{LineItem, SweetnessLevel};

    fn summary() -> OrderSummary {
        OrderSummary::from_lines(vec![
            LineItem {
                category: "Coffee".into(),
                item: "Americano".into(),
                sweetness: SweetnessLevel::Less,
                unit_price: Money::from_cents(150),
            },
            LineItem {
                category: "Soda".into(),
                item: "Passion Soda".into(),
                sweetness: SweetnessLevel::None,
                unit_price: Money::from_cents(175),
            },
        ])
    }

    #[test]
    fn test_summary_lists_lines_and_total() {
        let text = format_summary(&summary());
        assert!(text.contains("1. Americano"));
        assert!(text.contains("2. Passion Soda"));
        assert!(text.ends_with("Total: $3.25"));
    }

    #[test]
    fn test_order_more_button_only_under_limit() {
        let open = render(&Effect::ShowOrderSummary { summary: summary(), can_order_more: true });
        let full = render(&Effect::ShowOrderSummary { summary: summary(), can_order_more: false });

        assert_eq!(open.buttons.len(), 2);
        assert_eq!(full.buttons, vec![vec![("Confirm Order".to_string(), "confirm_order".to_string())]]);
    }

    #[test]
    fn test_aba_confirmation_includes_link() {
        let rendered = render(&Effect::ShowConfirmation {
            summary: summary(),
            payment_method: PaymentMethod::Aba,
            payment_link: Some("https://pay.example/x".into()),
        });
        assert!(rendered.text.contains("https://pay.example/x"));
    }

    #[test]
    fn test_sweetness_buttons_round_trip_through_callbacks() {
        let rendered = render(&Effect::ShowSweetnessLevels { levels: SweetnessLevel::ALL.to_vec() });
        let payloads: Vec<_> = rendered.buttons.iter().map(|row| row[0].1.as_str()).collect();
        assert_eq!(payloads, vec!["sweet_More sweet", "sweet_Normal sweet", "sweet_Less sweet", "sweet_No sweet"]);
    }
}
