use kameo::Actor;
use kameo::message::{Context, Message};
use kameo::actor::ActorRef;
use kameo::error::Infallible;
use kameo::reply::{Reply, ReplyError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;

use crate::actors::core::{ComponentHealth, HealthStatus};
use crate::persistence::OrderStore;

// ============================================================================
// Health Monitor Actor - aggregates component health
// ============================================================================
//
// Components push their status with `UpdateHealth`; the monitor also probes
// the order store on a fixed interval. A failed probe degrades the store, and
// repeated failures mark it unhealthy. `/health` asks for `SystemHealth`.
//
// ============================================================================

pub const ORDER_STORE_COMPONENT: &str = "order_store";

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug)]
pub struct UpdateHealth {
    pub component: String,
    pub status: HealthStatus,
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct GetSystemHealth;

/// Result of one background store probe
#[derive(Debug)]
pub struct ProbeStore {
    pub outcome: Result<(), String>,
    pub store: &'static str,
}

/// Failed probes in a row before the store is reported unhealthy
pub const UNHEALTHY_AFTER_PROBE_FAILURES: u32 = 3;

#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: HashMap<String, ComponentHealth>,
    pub check_time: chrono::DateTime<Utc>,
}

impl Reply for SystemHealth {
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
// Health Monitor Actor
// ============================================================================

pub struct HealthMonitorActor {
    components: HashMap<String, ComponentHealth>,
    store: Option<Arc<dyn OrderStore>>,
    probe_interval: Duration,
}

impl HealthMonitorActor {
    pub fn new(store: Arc<dyn OrderStore>, probe_interval: Duration) -> Self {
        Self {
            components: HashMap::new(),
            store: Some(store),
            probe_interval,
        }
    }

    /// Monitor with no background probe; state comes only from `UpdateHealth`
    pub fn passive() -> Self {
        Self {
            components: HashMap::new(),
            store: None,
            probe_interval: Duration::from_secs(10),
        }
    }

    fn record(&mut self, component: String, status: HealthStatus, details: Option<String>) {
        match self.components.get_mut(&component) {
            Some(health) => {
                if health.observe(status, details) {
                    tracing::info!(
                        component = %component,
                        status = ?health.status,
                        failures = health.consecutive_failures,
                        "Component health changed"
                    );
                }
            }
            None => {
                tracing::info!(component = %component, status = ?status, "Component registered");
                let mut health = ComponentHealth::new(component.clone(), status);
                health.details = details;
                self.components.insert(component, health);
            }
        }
    }

    fn compute_overall_status(&self) -> HealthStatus {
        let mut degraded = Vec::new();
        let mut unhealthy = Vec::new();

        for (name, health) in &self.components {
            match &health.status {
                HealthStatus::Unhealthy(msg) => unhealthy.push(format!("{}: {}", name, msg)),
                HealthStatus::Degraded(msg) => degraded.push(format!("{}: {}", name, msg)),
                HealthStatus::Healthy => {}
            }
        }
        unhealthy.sort();
        degraded.sort();

        if !unhealthy.is_empty() {
            HealthStatus::Unhealthy(unhealthy.join(", "))
        } else if !degraded.is_empty() {
            HealthStatus::Degraded(degraded.join(", "))
        } else {
            HealthStatus::Healthy
        }
    }
}

impl Actor for HealthMonitorActor {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(state: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        tracing::info!("HealthMonitorActor started");

        if let Some(store) = state.store.clone() {
            let every = state.probe_interval;
            let actor_ref = actor_ref.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(every);
                loop {
                    interval.tick().await;

                    let update = match store.health_check().await {
                        Ok(()) => ProbeStore {
                            outcome: Ok(()),
                            store: store.name(),
                        },
                        Err(e) => ProbeStore {
                            outcome: Err(e.to_string()),
                            store: store.name(),
                        },
                    };
                    if actor_ref.tell(update).send().await.is_err() {
                        break;
                    }
                }
            });
        }

        Ok(state)
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<UpdateHealth> for HealthMonitorActor {
    type Reply = ();

    async fn handle(&mut self, msg: UpdateHealth, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.record(msg.component, msg.status, msg.details);
    }
}

impl Message<ProbeStore> for HealthMonitorActor {
    type Reply = ();

    async fn handle(&mut self, msg: ProbeStore, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        let failures = self
            .components
            .get(ORDER_STORE_COMPONENT)
            .map(|h| h.consecutive_failures)
            .unwrap_or(0);

        let status = match msg.outcome {
            Ok(()) => HealthStatus::Healthy,
            Err(e) if failures + 1 >= UNHEALTHY_AFTER_PROBE_FAILURES => HealthStatus::Unhealthy(e),
            Err(e) => HealthStatus::Degraded(e),
        };
        self.record(ORDER_STORE_COMPONENT.to_string(), status, Some(msg.store.to_string()));
    }
}

impl Message<GetSystemHealth> for HealthMonitorActor {
    type Reply = SystemHealth;

    async fn handle(&mut self, _msg: GetSystemHealth, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        SystemHealth {
            overall_status: self.compute_overall_status(),
            components: self.components.clone(),
            check_time: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kameo::prelude::*;

    #[tokio::test]
    async fn test_overall_status_follows_worst_component() {
        let monitor = HealthMonitorActor::spawn(HealthMonitorActor::passive());

        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert_eq!(health.overall_status, HealthStatus::Healthy);

        monitor
            .tell(UpdateHealth {
                component: "order_sink".into(),
                status: HealthStatus::Degraded("retrying".into()),
                details: None,
            })
            .send()
            .await
            .unwrap();
        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert!(matches!(health.overall_status, HealthStatus::Degraded(_)));

        monitor
            .tell(UpdateHealth {
                component: ORDER_STORE_COMPONENT.into(),
                status: HealthStatus::Unhealthy("connection refused".into()),
                details: None,
            })
            .send()
            .await
            .unwrap();
        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert_eq!(
            health.overall_status,
            HealthStatus::Unhealthy("order_store: connection refused".into())
        );
        assert_eq!(health.components.len(), 2);
    }

    #[tokio::test]
    async fn test_store_probe_escalates_after_repeated_failures() {
        let monitor = HealthMonitorActor::spawn(HealthMonitorActor::passive());
        let probe = |outcome: Result<(), String>| ProbeStore { outcome, store: "postgres" };

        monitor.tell(probe(Err("timeout".into()))).send().await.unwrap();
        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert!(matches!(health.overall_status, HealthStatus::Degraded(_)));

        for _ in 1..UNHEALTHY_AFTER_PROBE_FAILURES {
            monitor.tell(probe(Err("timeout".into()))).send().await.unwrap();
        }
        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert_eq!(health.overall_status, HealthStatus::Unhealthy("order_store: timeout".into()));

        monitor.tell(probe(Ok(()))).send().await.unwrap();
        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert_eq!(health.overall_status, HealthStatus::Healthy);
        assert_eq!(health.components[ORDER_STORE_COMPONENT].consecutive_failures, 0);
    }
}
