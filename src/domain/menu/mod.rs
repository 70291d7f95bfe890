// ============================================================================
// Menu Domain - static catalog of drinks and prices
// ============================================================================

pub mod catalog;
pub mod money;

pub use catalog::*;
pub use money::Money;
