// ============================================================================
// Actors Module
// ============================================================================
//
// Structure:
// - core/           - Health types shared by actors and the health endpoint
// - infrastructure/ - Order sink and health monitor
//
// Note: The ordering flow itself runs in the command handler under
//       per-customer locks, NOT in actors. Actors are reserved for side
//       effects that must not block a customer.
//
// ============================================================================

mod core;
mod infrastructure;

pub use core::{ComponentHealth, HealthStatus};
pub use infrastructure::{
    GetSinkStats, GetSystemHealth, HealthMonitorActor, OrderSinkActor, PersistOrder, SinkStats,
    SystemHealth, UpdateHealth, ORDER_STORE_COMPONENT,
};
