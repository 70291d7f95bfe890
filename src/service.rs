use chrono::Utc;
use kameo::actor::ActorRef;
use std::sync::Arc;

use crate::actors::{OrderSinkActor, PersistOrder};
use crate::domain::order::{
    Customer, CustomerId, Dispatch, Effect, OrderCommand, OrderCommandHandler, OrderError, OrderRecord,
};
use crate::domain::sales::{SalesPeriod, SalesSummary};
use crate::metrics::Metrics;
use crate::persistence::OrderStore;
use crate::transport::{Callback, EffectDispatcher};

// ============================================================================
// Order Service - top-level inbound entry
// ============================================================================
//
// Parses a payload, gates operator actions, runs customer commands through
// the command handler and turns rejections into notices. Persistence of a
// finalized order is handed off only after the session lock is released.
//
// ============================================================================

pub struct OrderService {
    handler: OrderCommandHandler,
    store: Arc<dyn OrderStore>,
    sink: Option<ActorRef<OrderSinkActor>>,
    operator: CustomerId,
    metrics: Option<Arc<Metrics>>,
}

impl OrderService {
    pub fn new(handler: OrderCommandHandler, store: Arc<dyn OrderStore>, operator: CustomerId) -> Self {
        Self {
            handler,
            store,
            sink: None,
            operator,
            metrics: None,
        }
    }

    pub fn with_sink(mut self, sink: ActorRef<OrderSinkActor>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn handler(&self) -> &OrderCommandHandler {
        &self.handler
    }

    pub fn is_operator(&self, customer: &Customer) -> bool {
        customer.id == self.operator
    }

    /// Handle one inbound payload and deliver whatever it produced
    pub async fn process(&self, dispatcher: &dyn EffectDispatcher, customer: &Customer, payload: &str) {
        let dispatches = self.handle(customer, payload).await;
        dispatcher.dispatch_all(&dispatches).await;
    }

    pub async fn handle(&self, customer: &Customer, payload: &str) -> Vec<Dispatch> {
        match payload.parse::<Callback>() {
            Ok(callback) => self.handle_callback(customer, callback).await,
            Err(e) => {
                tracing::debug!(customer_id = %customer.id, payload = payload, error = %e, "Unparsable payload");
                self.record_rejection("unparsable");
                vec![Dispatch::to_customer(
                    customer.id,
                    Effect::ShowInvalidSelection { reason: e.to_string() },
                )]
            }
        }
    }

    pub async fn handle_callback(&self, customer: &Customer, callback: Callback) -> Vec<Dispatch> {
        if callback.requires_operator() && !self.is_operator(customer) {
            tracing::warn!(customer_id = %customer.id, callback = %callback, "Operator action refused");
            self.record_rejection("operator_only");
            return vec![Dispatch::to_customer(customer.id, Effect::OperatorOnly)];
        }

        if let Some(command) = callback.to_order_command() {
            return self.run_command(customer, command).await;
        }

        let reply = |effect| vec![Dispatch::to_customer(customer.id, effect)];

        match callback {
            Callback::Start => reply(Effect::ShowWelcome),
            Callback::Help => reply(Effect::ShowHelp { operator: self.is_operator(customer) }),
            Callback::StorePanel => reply(Effect::ShowStoreStatus {
                open: self.handler.store_status().is_open(),
            }),
            Callback::StoreOpen => reply(self.handler.set_store_open(true)),
            Callback::StoreClose => reply(self.handler.set_store_open(false)),
            Callback::Done(target) => {
                tracing::info!(customer_id = %target, "Order marked complete");
                vec![
                    Dispatch::to_customer(target, Effect::NotifyCustomerReady),
                    Dispatch::to_operator(Effect::OrderMarkedComplete { customer_id: target }),
                ]
            }
            Callback::SalesPanel => reply(Effect::ShowSalesPeriods { periods: SalesPeriod::ALL.to_vec() }),
            Callback::Sales(period) => reply(Effect::ShowSalesReport { summary: self.sales_report(period).await }),
            // Dialog callbacks were routed above
            Callback::OrderNow
            | Callback::Category(_)
            | Callback::Item(_)
            | Callback::Sweetness(_)
            | Callback::OrderMore
            | Callback::ConfirmOrder
            | Callback::Pay(_) => Vec::new(),
        }
    }

    async fn run_command(&self, customer: &Customer, command: OrderCommand) -> Vec<Dispatch> {
        let result = self.handler.handle(customer, &command).await;

        if let Some(ref metrics) = self.metrics {
            metrics.set_active_sessions(self.handler.registry().len().await);
        }

        match result {
            Ok(outcome) => {
                if let Some(record) = outcome.record {
                    self.persist(record).await;
                }
                outcome.dispatches
            }
            Err(e) => {
                self.record_rejection(e.reason());
                let effect = match e {
                    OrderError::StoreClosed => Effect::ShowStoreClosed,
                    OrderError::LimitReached { max_items } => Effect::ShowLimitReached { max_items },
                    OrderError::InvalidEvent(invalid) => Effect::ShowInvalidSelection { reason: invalid.to_string() },
                };
                vec![Dispatch::to_customer(customer.id, effect)]
            }
        }
    }

    async fn persist(&self, record: OrderRecord) {
        if let Some(ref metrics) = self.metrics {
            metrics.record_order_finalized(record.payment_method.as_str(), record.total.cents());
        }

        match self.sink {
            Some(ref sink) => {
                let order_id = record.order_id;
                if sink.tell(PersistOrder { record }).send().await.is_err() {
                    tracing::error!(order_id = %order_id, "Order sink unavailable; order not persisted");
                    if let Some(ref metrics) = self.metrics {
                        metrics.record_persistence_failure();
                    }
                }
            }
            None => {
                let store = self.store.clone();
                tokio::spawn(async move {
                    if let Err(e) = store.save_order(&record).await {
                        tracing::error!(order_id = %record.order_id, error = %e, "Failed to persist order");
                    }
                });
            }
        }
    }

    async fn sales_report(&self, period: SalesPeriod) -> SalesSummary {
        match self.store.query_summary(period).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(period = period.as_str(), error = %e, "Sales query failed");
                SalesSummary::failed(period, Utc::now(), e.to_string())
            }
        }
    }

    fn record_rejection(&self, reason: &str) {
        if let Some(ref metrics) = self.metrics {
            metrics.record_rejection(reason);
        }
    }
}
