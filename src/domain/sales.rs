use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::menu::Money;
use crate::domain::order::OrderRecord;

// ============================================================================
// Sales Reporting
// ============================================================================
//
// Period windows and the aggregate shown to the operator. Stores compute the
// same shape either in SQL or by folding records through `SalesSummary::tally`.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesPeriod {
    Day,
    Week,
    Month,
    Overall,
}

impl SalesPeriod {
    pub const ALL: [SalesPeriod; 4] = [
        SalesPeriod::Day,
        SalesPeriod::Week,
        SalesPeriod::Month,
        SalesPeriod::Overall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SalesPeriod::Day => "day",
            SalesPeriod::Week => "week",
            SalesPeriod::Month => "month",
            SalesPeriod::Overall => "overall",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SalesPeriod::Day => "Today",
            SalesPeriod::Week => "This Week",
            SalesPeriod::Month => "This Month",
            SalesPeriod::Overall => "Overall",
        }
    }

    /// Inclusive lower bound of the window ending at `now` (UTC calendar)
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let date = match self {
            SalesPeriod::Day => today,
            SalesPeriod::Week => today - Duration::days(i64::from(today.weekday().num_days_from_monday())),
            SalesPeriod::Month => today.with_day(1).unwrap_or(today),
            SalesPeriod::Overall => NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(today),
        };
        Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
    }
}

impl fmt::Display for SalesPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SalesPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SalesPeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub period: SalesPeriod,
    pub total_sales: Money,
    pub total_orders: u64,
    /// Drinks sold, most popular first
    pub items_sold: Vec<(String, u64)>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub error: Option<String>,
}

impl SalesSummary {
    pub fn empty(period: SalesPeriod, now: DateTime<Utc>) -> Self {
        Self {
            period,
            total_sales: Money::ZERO,
            total_orders: 0,
            items_sold: Vec::new(),
            start: period.start(now),
            end: now,
            error: None,
        }
    }

    /// Zeroed report carrying the reason the query failed
    pub fn failed(period: SalesPeriod, now: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(period, now)
        }
    }

    pub fn tally<'a>(
        period: SalesPeriod,
        now: DateTime<Utc>,
        records: impl IntoIterator<Item = &'a OrderRecord>,
    ) -> Self {
        let mut summary = Self::empty(period, now);
        let mut counts: HashMap<&str, u64> = HashMap::new();

        for record in records.into_iter().filter(|r| r.created_at >= summary.start) {
            summary.total_sales += record.total;
            summary.total_orders += 1;
            for line in &record.items {
                *counts.entry(line.item.as_str()).or_default() += 1;
            }
        }

        summary.items_sold = sort_items(counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
        summary
    }
}

/// Most sold first, ties by name
pub fn sort_items(mut items: Vec<(String, u64)>) -> Vec<(String, u64)> {
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{CustomerId, LineItem, PaymentMethod, SweetnessLevel};
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    fn record(items: &[(&str, i64)], created_at: DateTime<Utc>) -> OrderRecord {
        let items: Vec<LineItem> = items
            .iter()
            .map(|(name, cents)| LineItem {
                category: "Coffee".into(),
                item: name.to_string(),
                sweetness: SweetnessLevel::Normal,
                unit_price: Money::from_cents(*cents),
            })
            .collect();
        OrderRecord {
            order_id: Uuid::new_v4(),
            customer_id: CustomerId(1),
            display_name: "alice".into(),
            total: items.iter().map(|l| l.unit_price).sum(),
            items,
            payment_method: PaymentMethod::Cash,
            created_at,
        }
    }

    #[test]
    fn test_period_starts() {
        // 2025-03-13 is a Thursday
        let now = at(2025, 3, 13, 15);
        assert_eq!(SalesPeriod::Day.start(now), Utc.with_ymd_and_hms(2025, 3, 13, 0, 0, 0).unwrap());
        assert_eq!(SalesPeriod::Week.start(now), Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(SalesPeriod::Month.start(now), Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(SalesPeriod::Overall.start(now), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("week".parse::<SalesPeriod>(), Ok(SalesPeriod::Week));
        assert!("year".parse::<SalesPeriod>().is_err());
    }

    #[test]
    fn test_tally_filters_window_and_counts_items() {
        let now = at(2025, 3, 13, 15);
        let records = vec![
            record(&[("Americano", 150), ("Iced Latte", 200)], at(2025, 3, 13, 9)),
            record(&[("Americano", 150)], at(2025, 3, 13, 10)),
            record(&[("Passion Soda", 175)], at(2025, 3, 12, 10)),
        ];

        let today = SalesSummary::tally(SalesPeriod::Day, now, &records);
        assert_eq!(today.total_orders, 2);
        assert_eq!(today.total_sales, Money::from_cents(500));
        assert_eq!(
            today.items_sold,
            vec![("Americano".to_string(), 2), ("Iced Latte".to_string(), 1)]
        );

        let week = SalesSummary::tally(SalesPeriod::Week, now, &records);
        assert_eq!(week.total_orders, 3);
        assert_eq!(week.total_sales, Money::from_cents(675));
    }

    #[test]
    fn test_failed_summary_is_zeroed() {
        let summary = SalesSummary::failed(SalesPeriod::Month, at(2025, 3, 13, 15), "db down");
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.total_sales, Money::ZERO);
        assert_eq!(summary.error.as_deref(), Some("db down"));
    }
}
