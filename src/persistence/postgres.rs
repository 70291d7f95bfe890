use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::domain::menu::Money;
use crate::domain::order::OrderRecord;
use crate::domain::sales::{sort_items, SalesPeriod, SalesSummary};
use super::{OrderStore, StoreError};

// ============================================================================
// Postgres Order Store
// ============================================================================
//
// One row per finished order in `sales`; line items live in a JSONB array so
// the per-drink report is a single GROUP BY over `jsonb_array_elements`.
//
// ============================================================================

const CREATE_SALES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS sales (
        id BIGSERIAL PRIMARY KEY,
        order_id UUID NOT NULL UNIQUE,
        user_id TEXT NOT NULL,
        username TEXT NOT NULL,
        items JSONB NOT NULL,
        total_cents BIGINT NOT NULL,
        payment_method TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS sales_created_at_idx ON sales (created_at)";

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;

        tracing::info!("Connected to Postgres order store");
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_SALES_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_CREATED_AT_INDEX).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn save_order(&self, record: &OrderRecord) -> Result<(), StoreError> {
        let items = serde_json::to_value(&record.items)?;

        // Retries may replay an insert that already landed
        sqlx::query(
            r#"
            INSERT INTO sales (
                order_id, user_id, username, items, total_cents, payment_method, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (order_id) DO NOTHING
            "#,
        )
        .bind(record.order_id)
        .bind(record.customer_id.to_string())
        .bind(&record.display_name)
        .bind(items)
        .bind(record.total.cents())
        .bind(record.payment_method.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(order_id = %record.order_id, "Order row inserted");
        Ok(())
    }

    async fn query_summary(&self, period: SalesPeriod) -> Result<SalesSummary, StoreError> {
        let now = Utc::now();
        let start = period.start(now);

        let (orders, cents): (i64, i64) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*)::BIGINT, COALESCE(SUM(total_cents), 0)::BIGINT
            FROM sales
            WHERE created_at >= $1
            "#,
        )
        .bind(start)
        .fetch_one(&self.pool)
        .await?;

        let items: Vec<(String, i64)> = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT elem->>'item', COUNT(*)::BIGINT
            FROM sales CROSS JOIN LATERAL jsonb_array_elements(items) AS elem
            WHERE created_at >= $1 AND elem->>'item' IS NOT NULL
            GROUP BY 1
            "#,
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(summary_from_rows(period, now, orders, cents, items))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let (_one,): (i32,) = sqlx::query_as::<_, (i32,)>("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

fn summary_from_rows(
    period: SalesPeriod,
    now: DateTime<Utc>,
    orders: i64,
    cents: i64,
    items: Vec<(String, i64)>,
) -> SalesSummary {
    SalesSummary {
        total_sales: Money::from_cents(cents),
        total_orders: orders.max(0) as u64,
        items_sold: sort_items(
            items
                .into_iter()
                .map(|(name, count)| (name, count.max(0) as u64))
                .collect(),
        ),
        ..SalesSummary::empty(period, now)
    }
}
