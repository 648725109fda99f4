//=========================================================================
// Platform Bridge
//=========================================================================
//
// Contract between the windowing backend and the logic thread.
//
// - `interface`: event and error types
// - `event_collector`: core-side draining of the channel
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Internal API ========================================================

pub(crate) use event_collector::{EventCollector, TickControl};
pub(crate) use interface::{PlatformError, PlatformEvent, PlatformSignal};

pub use interface::Viewport;
