// ============================================================================
// Transport boundary
// ============================================================================
//
// Parsing of inbound chat payloads and delivery of outbound effects. The
// chat platform client itself lives outside this crate.
//
// ============================================================================

pub mod callback;
pub mod dispatcher;
pub mod render;

pub use callback::{Callback, CallbackParseError};
pub use dispatcher::{ConsoleDispatcher, EffectDispatcher, RecordingDispatcher};
pub use render::{render, Rendered};
