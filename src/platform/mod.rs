//=========================================================================
// Platform Subsystem
//=========================================================================
//
// Owns the OS window on the main thread and forwards input to the
// logic thread.
//
// ```text
//  Main Thread                      Logic Thread
//  ┌──────────────────────────┐    ┌──────────────────┐
//  │  winit event loop        │    │  Orchestrator    │
//  │   ↓                      │    │   ↓              │
//  │  InputProcessor          │    │  InputSystem     │
//  │   ↓                      │    │   ↓              │
//  │  InputBuffer             │    │  Scenes          │
//  │   ↓ RedrawRequested      │    │                  │
//  │  bounded channel ────────┼───►│                  │
//  └──────────────────────────┘    └──────────────────┘
//                PlatformEvent
// ```
//
// RedrawRequested is the frame boundary: everything buffered since the
// previous redraw is sent as one PlatformEvent::Inputs. When the logic
// thread ends (Quit, panic) it wakes the loop with
// PlatformSignal::CoreExited through an EventLoopProxy, so the window
// closes even if no input is pending.
//
//=========================================================================

//=== Module Declarations =================================================

mod input_buffer;
mod input_processor;

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::{PlatformError, PlatformEvent, PlatformSignal};
use input_buffer::InputBuffer;
use input_processor::InputProcessor;

//=== WindowSettings ======================================================

/// Window attributes chosen through the engine builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WindowSettings {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Islander".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

//=== Platform ============================================================

/// Window owner and input forwarder. Not `Send`; stays on the main thread.
pub(crate) struct Platform {
    settings: WindowSettings,
    window: Option<Window>,
    buffer: InputBuffer,
    event_sender: Sender<PlatformEvent>,
    input_processor: InputProcessor,
}

impl Platform {
    pub(crate) fn new(event_sender: Sender<PlatformEvent>, settings: WindowSettings) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            settings,
            window: None,
            buffer: InputBuffer::new(),
            event_sender,
            input_processor: InputProcessor::new(),
        }
    }

    //--- Execution --------------------------------------------------------

    /// Creates the event loop. Call before spawning the logic thread so
    /// it can be handed a [`PlatformProxy`].
    ///
    /// # Panics
    ///
    /// winit panics when this is called off the main thread on macOS.
    pub(crate) fn event_loop() -> Result<EventLoop<PlatformSignal>, PlatformError> {
        EventLoop::with_user_event()
            .build()
            .map_err(PlatformError::EventLoopCreation)
    }

    /// Runs `event_loop` until the window closes or the logic thread ends.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop fails while running.
    pub(crate) fn run(mut self, event_loop: EventLoop<PlatformSignal>) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting winit event loop");
        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)
    }

    /// Whether `signal` should end the event loop.
    fn on_signal(&mut self, signal: PlatformSignal) -> bool {
        match signal {
            PlatformSignal::CoreExited => {
                info!(target: "platform", "Logic thread exited, closing window");
                self.window = None;
                true
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends buffered input to the logic thread.
    ///
    /// Returns `false` once the receiver is gone.
    fn flush_input_buffer(&mut self) -> bool {
        let Some((discrete, continuous)) = self.buffer.drain() else {
            return true;
        };

        trace!(
            target: "platform::input",
            "Flushing {} discrete + {} continuous events",
            discrete.len(),
            continuous.len()
        );

        self.send(PlatformEvent::Inputs { discrete, continuous })
    }

    fn send(&self, event: PlatformEvent) -> bool {
        match self.event_sender.send(event) {
            Ok(()) => true,
            Err(err) => {
                warn!(target: "platform", "Logic thread disconnected, dropping {:?}", err.0);
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== winit Integration ===================================================

//=== PlatformProxy =======================================================

/// Handle the logic thread uses to wake the event loop.
#[derive(Clone)]
pub(crate) struct PlatformProxy(EventLoopProxy<PlatformSignal>);

impl PlatformProxy {
    pub(crate) fn new(event_loop: &EventLoop<PlatformSignal>) -> Self {
        Self(event_loop.create_proxy())
    }

    /// Tells the event loop the logic thread is gone. A loop that already
    /// exited is not an error.
    pub(crate) fn core_exited(&self) {
        if self.0.send_event(PlatformSignal::CoreExited).is_err() {
            debug!(target: "platform", "Event loop already closed");
        }
    }
}

impl ApplicationHandler<PlatformSignal> for Platform {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.settings.title.clone())
            .with_inner_size(LogicalSize::new(self.settings.width, self.settings.height));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                self.send(PlatformEvent::Resized { width: size.width, height: size.height });
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.send(PlatformEvent::WindowClosed);
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, signal: PlatformSignal) {
        if self.on_signal(signal) {
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.send(PlatformEvent::WindowClosed);
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if !self.send(PlatformEvent::Resized { width: size.width, height: size.height }) {
                    event_loop.exit();
                }
            }

            WindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.input_processor.update_modifiers(state.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self
                    .input_processor
                    .process_mouse_move(position.x as f32, position.y as f32);
                self.buffer.push_continuous(event);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let Some(event) = self.input_processor.process_key_event(key_event) {
                    self.buffer.push_discrete(event);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.input_processor.process_mouse_button(*button, *state);
                self.buffer.push_discrete(event);
            }

            WindowEvent::RedrawRequested => {
                if !self.flush_input_buffer() {
                    info!(target: "platform", "Closing window after logic thread exit");
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
