//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Contract between the platform thread and the logic thread. Input
// flows core-ward over the channel; the only message back is the exit
// signal that closes the window.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;

//=== PlatformEvent =======================================================

/// Events sent from platform to core over the bounded channel.
#[derive(Debug, Clone)]
pub(crate) enum PlatformEvent {
    /// Input gathered between two redraws.
    ///
    /// `discrete` holds key and button transitions, `continuous` the
    /// coalesced cursor position.
    Inputs {
        discrete: Vec<InputEvent>,
        continuous: Vec<InputEvent>,
    },

    /// Inner window size changed (physical pixels).
    Resized { width: u32, height: u32 },

    /// Window close requested.
    WindowClosed,
}

//=== PlatformSignal ======================================================

/// Wake-ups sent from core back to the event loop through a winit proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlatformSignal {
    /// The logic thread has stopped: quit, channel loss or panic.
    CoreExited,
}

//=== Viewport ============================================================

/// Latest window size, kept in `GlobalContext::resources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

//=== PlatformError =======================================================

#[derive(Debug, Error)]
pub(crate) enum PlatformError {
    /// Event loop creation failed (OS-level issue).
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),
}
