// ============================================================================
// Order Domain - the conversational ordering flow
// ============================================================================
//
// - Value objects (LineItem, SweetnessLevel, PaymentMethod, OrderState)
// - Commands (inbound customer choices)
// - Events (facts applied to a session)
// - Effects (outward render/notify requests)
// - Session (state machine) and Finalizer
// - Command Handler (registry + per-customer lock orchestration)
//
// Nothing here performs I/O.
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod events;
pub mod effects;
pub mod errors;
pub mod record;
pub mod session;
pub mod finalizer;
pub mod command_handler;

pub use value_objects::*;
pub use commands::*;
pub use events::*;
pub use effects::*;
pub use errors::*;
pub use record::*;
pub use session::*;
pub use finalizer::finalize;
pub use command_handler::*;
