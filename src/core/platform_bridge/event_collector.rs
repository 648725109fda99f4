//=========================================================================
// Event Collector
//=========================================================================
//
// Drains the platform channel once per tick.
//
//   Receiver<PlatformEvent> → collect_frame() → input batches
//                                            → latest Viewport
//                                            → TickControl
//
// Bounded draining keeps a flood of events from stalling the tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::{PlatformEvent, Viewport};
use crate::core::input::event::InputEvent;

//=== TickControl =========================================================

/// Logic loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

pub(crate) struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    viewport: Option<Viewport>,
}

impl EventCollector {
    const MAX_EVENTS_PER_TICK: usize = 100;

    pub(crate) fn new(receiver: Receiver<PlatformEvent>) -> Self {
        Self {
            receiver,
            viewport: None,
        }
    }

    /// Appends this tick's input batches to `batches`.
    ///
    /// Returns [`TickControl::Exit`] when the window closed or the
    /// platform side of the channel is gone.
    pub(crate) fn collect_frame(&mut self, batches: &mut Vec<Vec<InputEvent>>) -> TickControl {
        let mut drained = 0;

        while drained < Self::MAX_EVENTS_PER_TICK {
            match self.receiver.try_recv() {
                Ok(event) => {
                    drained += 1;
                    if self.handle_event(event, batches) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= Self::MAX_EVENTS_PER_TICK {
            warn!("Event queue backlog: drained {} events this tick", drained);
        }

        TickControl::Continue
    }

    /// Size reported by the most recent resize, consumed once.
    pub(crate) fn take_viewport(&mut self) -> Option<Viewport> {
        self.viewport.take()
    }

    fn handle_event(&mut self, event: PlatformEvent, batches: &mut Vec<Vec<InputEvent>>) -> TickControl {
        match event {
            PlatformEvent::Inputs { discrete, continuous } => {
                if !discrete.is_empty() {
                    batches.push(discrete);
                }
                if !continuous.is_empty() {
                    batches.push(continuous);
                }
                TickControl::Continue
            }
            PlatformEvent::Resized { width, height } => {
                self.viewport = Some(Viewport { width, height });
                TickControl::Continue
            }
            PlatformEvent::WindowClosed => TickControl::Exit,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
