// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Pure ordering logic, free of transport and storage concerns:
// - menu: catalog and money
// - order: session state machine, finalizer, command handler
// - sales: reporting periods and summaries
//
// ============================================================================

pub mod menu;
pub mod order;
pub mod sales;
