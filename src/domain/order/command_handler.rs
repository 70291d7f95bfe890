use std::sync::Arc;

use crate::domain::menu::MenuCatalog;
use crate::registry::{SessionRegistry, StoreStatus};

use super::commands::OrderCommand;
use super::effects::{Dispatch, Effect};
use super::errors::OrderError;
use super::events::SessionEvent;
use super::finalizer::finalize;
use super::record::OrderRecord;
use super::session::DecisionContext;
use super::value_objects::{Customer, PaymentMethod};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Registry → per-customer lock → decide/apply → finalize → unlock
//
// Everything that touches the session happens inside one critical section, so
// a paid order is snapshotted and reset in the same step. The returned outcome
// is acted on (dispatch, persistence) by the caller after the lock is gone.
//
// ============================================================================

/// What the caller must do once the session lock is released
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub dispatches: Vec<Dispatch>,
    pub record: Option<OrderRecord>,
}

pub struct OrderCommandHandler {
    catalog: Arc<MenuCatalog>,
    registry: Arc<SessionRegistry>,
    store_status: Arc<StoreStatus>,
    max_items: usize,
    payment_link: Option<String>,
}

impl OrderCommandHandler {
    pub fn new(
        catalog: Arc<MenuCatalog>,
        registry: Arc<SessionRegistry>,
        store_status: Arc<StoreStatus>,
        max_items: usize,
        payment_link: Option<String>,
    ) -> Self {
        Self {
            catalog,
            registry,
            store_status,
            max_items,
            payment_link,
        }
    }

    pub fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn store_status(&self) -> &Arc<StoreStatus> {
        &self.store_status
    }

    /// Run one customer command through that customer's session
    pub async fn handle(&self, customer: &Customer, command: &OrderCommand) -> Result<Outcome, OrderError> {
        let handle = self.registry.get_or_create(customer.id).await;
        let mut session = handle.lock().await;

        let ctx = DecisionContext {
            catalog: &self.catalog,
            max_items: self.max_items,
            store_open: self.store_status.is_open(),
        };

        let transition = session.handle(command, &ctx).map_err(|e| {
            tracing::debug!(
                customer_id = %customer.id,
                command = command.name(),
                state = ?session.state(),
                reason = e.reason(),
                error = %e,
                "Command rejected"
            );
            e
        })?;

        tracing::debug!(
            customer_id = %customer.id,
            command = command.name(),
            events = transition.events.len(),
            state = ?session.state(),
            "Command applied"
        );

        let mut dispatches: Vec<Dispatch> = transition
            .effects
            .into_iter()
            .map(|effect| Dispatch::to_customer(customer.id, effect))
            .collect();

        let record = if transition.finalize {
            let record = finalize(&session, &customer.display_name);
            session.apply(&SessionEvent::SessionReset);

            dispatches.push(Dispatch::to_customer(
                customer.id,
                Effect::ShowConfirmation {
                    summary: record.summary(),
                    payment_method: record.payment_method,
                    payment_link: match record.payment_method {
                        PaymentMethod::Aba => self.payment_link.clone(),
                        PaymentMethod::Cash => None,
                    },
                },
            ));
            dispatches.push(Dispatch::to_operator(Effect::NotifyOperator { order: record.clone() }));

            Some(record)
        } else {
            None
        };

        Ok(Outcome { dispatches, record })
    }

    /// Operator toggle; callers check the operator identity first
    pub fn set_store_open(&self, open: bool) -> Effect {
        self.store_status.set_open(open);
        Effect::StoreStatusChanged { open }
    }
}
