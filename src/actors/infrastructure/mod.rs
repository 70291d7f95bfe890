// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// - Order sink: fire-and-forget persistence of finalized orders
// - Health monitoring
//
// ============================================================================

mod health_monitor;
mod order_sink;

pub use health_monitor::{
    GetSystemHealth, HealthMonitorActor, ProbeStore, SystemHealth, UpdateHealth, ORDER_STORE_COMPONENT,
    UNHEALTHY_AFTER_PROBE_FAILURES,
};
pub use order_sink::{GetSinkStats, OrderSinkActor, PersistOrder, SinkStats};
