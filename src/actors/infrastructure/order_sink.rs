use kameo::Actor;
use kameo::message::{Context, Message};
use kameo::actor::ActorRef;
use kameo::error::Infallible;
use kameo::reply::{Reply, ReplyError};
use std::sync::Arc;

use crate::actors::core::HealthStatus;
use crate::domain::order::OrderRecord;
use crate::metrics::Metrics;
use crate::persistence::OrderStore;
use crate::utils::{retry_with_backoff, RetryOutcome, RetryPolicy};
use super::health_monitor::{HealthMonitorActor, UpdateHealth, ORDER_STORE_COMPONENT};

// ============================================================================
// Order Sink Actor - best-effort persistence of finalized orders
// ============================================================================
//
// Callers `tell` a record and move on; the customer flow never waits on the
// database. Each record gets a bounded number of attempts. A record that
// still fails is logged and counted, then dropped.
//
// ============================================================================

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug)]
pub struct PersistOrder {
    pub record: OrderRecord,
}

#[derive(Debug)]
pub struct GetSinkStats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub saved: u64,
    pub failed: u64,
}

impl Reply for SinkStats {
    type Ok = Self;
    type Error = Infallible;
    type Value = Self;

    fn to_result(self) -> Result<Self, Infallible> {
        Ok(self)
    }

    fn into_any_err(self) -> Option<Box<dyn ReplyError>> {
        None
    }

    fn into_value(self) -> Self::Value {
        self
    }
}

// ============================================================================
// Order Sink Actor
// ============================================================================

pub struct OrderSinkActor {
    store: Arc<dyn OrderStore>,
    retry: RetryPolicy,
    metrics: Option<Arc<Metrics>>,
    health: Option<ActorRef<HealthMonitorActor>>,
    stats: SinkStats,
}

impl OrderSinkActor {
    pub fn new(store: Arc<dyn OrderStore>, retry: RetryPolicy) -> Self {
        Self {
            store,
            retry,
            metrics: None,
            health: None,
            stats: SinkStats::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_health_monitor(mut self, health: ActorRef<HealthMonitorActor>) -> Self {
        self.health = Some(health);
        self
    }

    async fn report_health(&self, status: HealthStatus) {
        if let Some(ref health) = self.health {
            let update = UpdateHealth {
                component: ORDER_STORE_COMPONENT.to_string(),
                status,
                details: Some(self.store.name().to_string()),
            };
            if health.tell(update).send().await.is_err() {
                tracing::warn!("Health monitor unavailable; order store status not reported");
            }
        }
    }
}

impl Actor for OrderSinkActor {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(state: Self::Args, _actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        tracing::info!(
            store = state.store.name(),
            max_attempts = state.retry.max_attempts,
            "OrderSinkActor started"
        );
        Ok(state)
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<PersistOrder> for OrderSinkActor {
    type Reply = ();

    async fn handle(&mut self, msg: PersistOrder, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        let record = msg.record;
        let store = self.store.clone();

        let outcome = retry_with_backoff(&self.retry, "save_order", |_attempt| {
            let store = store.clone();
            let record = &record;
            async move { store.save_order(record).await }
        })
        .await;

        if let Some(ref metrics) = self.metrics {
            metrics.record_persistence_attempts(outcome.attempts());
        }

        match outcome {
            RetryOutcome::Succeeded { attempts, .. } => {
                self.stats.saved += 1;
                tracing::info!(order_id = %record.order_id, attempts = attempts, "Order persisted");
                self.report_health(HealthStatus::Healthy).await;
            }
            RetryOutcome::Exhausted { error, attempts } | RetryOutcome::Aborted { error, attempts } => {
                self.stats.failed += 1;
                if let Some(ref metrics) = self.metrics {
                    metrics.record_persistence_failure();
                }
                tracing::error!(
                    order_id = %record.order_id,
                    customer_id = %record.customer_id,
                    total = %record.total,
                    attempts = attempts,
                    error = %error,
                    "Order could not be persisted; dropping"
                );
                self.report_health(HealthStatus::Degraded(format!("last save failed: {}", error))).await;
            }
        }
    }
}

impl Message<GetSinkStats> for OrderSinkActor {
    type Reply = SinkStats;

    async fn handle(&mut self, _msg: GetSinkStats, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::infrastructure::GetSystemHealth;
    use crate::domain::menu::Money;
    use crate::domain::order::{CustomerId, LineItem, PaymentMethod, SweetnessLevel};
    use crate::persistence::InMemoryOrderStore;
    use chrono::Utc;
    use kameo::prelude::*;
    use std::time::Duration;
    use uuid::Uuid;

    fn record() -> OrderRecord {
        OrderRecord {
            order_id: Uuid::now_v7(),
            customer_id: CustomerId(8),
            display_name: "carol".into(),
            items: vec![LineItem {
                category: "Coffee".into(),
                item: "Americano".into(),
                sweetness: SweetnessLevel::Normal,
                unit_price: Money::from_cents(150),
            }],
            total: Money::from_cents(150),
            payment_method: PaymentMethod::Cash,
            created_at: Utc::now(),
        }
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_persists_after_transient_failure() {
        let store = Arc::new(InMemoryOrderStore::new());
        store.fail_next_saves(2);
        let metrics = Arc::new(Metrics::new().unwrap());

        let sink = OrderSinkActor::spawn(
            OrderSinkActor::new(store.clone(), fast_retry(3)).with_metrics(metrics.clone()),
        );
        assert!(sink.tell(PersistOrder { record: record() }).send().await.is_ok());

        let stats = sink.ask(GetSinkStats).await.unwrap();
        assert_eq!(stats, SinkStats { saved: 1, failed: 0 });
        assert_eq!(store.records().await.len(), 1);
        assert_eq!(metrics.persistence_attempts.get(), 3);
        assert_eq!(metrics.persistence_failures.get(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_save_is_counted_and_degrades_health() {
        let store = Arc::new(InMemoryOrderStore::new());
        store.fail_next_saves(10);
        let metrics = Arc::new(Metrics::new().unwrap());
        let monitor = HealthMonitorActor::spawn(HealthMonitorActor::passive());

        let sink = OrderSinkActor::spawn(
            OrderSinkActor::new(store.clone(), fast_retry(3))
                .with_metrics(metrics.clone())
                .with_health_monitor(monitor.clone()),
        );
        assert!(sink.tell(PersistOrder { record: record() }).send().await.is_ok());

        let stats = sink.ask(GetSinkStats).await.unwrap();
        assert_eq!(stats, SinkStats { saved: 0, failed: 1 });
        assert!(store.records().await.is_empty());
        assert_eq!(metrics.persistence_failures.get(), 1);

        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert!(matches!(health.overall_status, HealthStatus::Degraded(_)));
    }
}
