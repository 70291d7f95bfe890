mod server;

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

pub use server::{start_health_server, HealthServerState};

// ============================================================================
// Metrics Module - Prometheus metrics for the ordering flow
// ============================================================================
//
// - Finalized orders and revenue
// - Rejected customer events, by reason
// - Persistence attempts and final failures
// - Live and evicted sessions
//
// Scraped via GET /metrics on the health server.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Orders
    pub orders_finalized: IntCounterVec,
    pub order_revenue_cents: IntCounter,
    pub events_rejected: IntCounterVec,

    // Persistence
    pub persistence_attempts: IntCounter,
    pub persistence_failures: IntCounter,

    // Sessions
    pub active_sessions: IntGauge,
    pub sessions_evicted: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_finalized = IntCounterVec::new(
            Opts::new("orders_finalized_total", "Orders finalized after payment selection"),
            &["payment_method"],
        )?;
        registry.register(Box::new(orders_finalized.clone()))?;

        let order_revenue_cents = IntCounter::new(
            "order_revenue_cents_total",
            "Sum of finalized order totals in cents",
        )?;
        registry.register(Box::new(order_revenue_cents.clone()))?;

        let events_rejected = IntCounterVec::new(
            Opts::new("events_rejected_total", "Customer events rejected by the order state machine"),
            &["reason"],
        )?;
        registry.register(Box::new(events_rejected.clone()))?;

        let persistence_attempts = IntCounter::new(
            "persistence_attempts_total",
            "Attempts to save a finalized order",
        )?;
        registry.register(Box::new(persistence_attempts.clone()))?;

        let persistence_failures = IntCounter::new(
            "persistence_failures_total",
            "Finalized orders that could not be saved",
        )?;
        registry.register(Box::new(persistence_failures.clone()))?;

        let active_sessions = IntGauge::new("active_sessions", "Order sessions held in memory")?;
        registry.register(Box::new(active_sessions.clone()))?;

        let sessions_evicted = IntCounter::new(
            "sessions_evicted_total",
            "Idle order sessions evicted from the registry",
        )?;
        registry.register(Box::new(sessions_evicted.clone()))?;

        Ok(Self {
            registry,
            orders_finalized,
            order_revenue_cents,
            events_rejected,
            persistence_attempts,
            persistence_failures,
            active_sessions,
            sessions_evicted,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_finalized(&self, payment_method: &str, total_cents: i64) {
        self.orders_finalized.with_label_values(&[payment_method]).inc();
        if total_cents > 0 {
            self.order_revenue_cents.inc_by(total_cents as u64);
        }
    }

    pub fn record_rejection(&self, reason: &str) {
        self.events_rejected.with_label_values(&[reason]).inc();
    }

    pub fn record_persistence_attempts(&self, attempts: u32) {
        self.persistence_attempts.inc_by(u64::from(attempts));
    }

    pub fn record_persistence_failure(&self) {
        self.persistence_failures.inc();
    }

    pub fn set_active_sessions(&self, count: usize) {
        self.active_sessions.set(count as i64);
    }

    pub fn record_sessions_evicted(&self, count: usize) {
        self.sessions_evicted.inc_by(count as u64);
    }
}
