//=========================================================================
// Core Systems Orchestrator
//=========================================================================
//
// Runs the game logic on its own thread at a fixed tick rate.
//
//   Receiver<PlatformEvent> → EventCollector → GlobalContext
//                                            → GlobalSystems::update()
//
// The platform thread only talks to this loop through the channel. The
// loop ends when the window closes, the channel disconnects, or a scene
// sends EngineCommand::Quit; scenes are then exited and the plugin's
// `end` hook runs on this thread.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use log::{debug, info};

//=== Module Declarations =================================================

pub mod ecs;
pub mod globals;
pub mod input;
pub mod memory;
pub mod message_bus;
pub(crate) mod platform_bridge;
pub mod resources;
pub mod scene;
pub mod time;

//=== Public API ==========================================================

pub use globals::{EngineCommand, GlobalContext, GlobalSystems};
pub use input::Action;
pub use platform_bridge::Viewport;
pub use scene::SceneKey;

//=== Internal Dependencies ===============================================

use crate::games::GamePlugin;
use platform_bridge::{EventCollector, PlatformEvent, TickControl};

//=== CoreSystemsOrchestrator =============================================

pub(crate) struct CoreSystemsOrchestrator<S: SceneKey, A: Action> {
    systems: GlobalSystems<S, A>,
    context: GlobalContext,
    plugin: Option<Box<dyn GamePlugin<S, A>>>,
}

impl<S: SceneKey, A: Action> CoreSystemsOrchestrator<S, A> {
    pub(crate) fn new(tps: f64) -> Self {
        Self {
            systems: GlobalSystems::new(),
            context: GlobalContext::new(tps),
            plugin: None,
        }
    }

    //--- Setup ------------------------------------------------------------

    pub(crate) fn init_systems<F>(&mut self, init_fn: F)
    where
        F: FnOnce(&mut GlobalSystems<S, A>, &mut GlobalContext),
    {
        init_fn(&mut self.systems, &mut self.context);
    }

    /// Runs the plugin's `begin` hook and stacks the scene it returns.
    pub(crate) fn load_plugin(&mut self, mut plugin: Box<dyn GamePlugin<S, A>>) {
        let initial = plugin.begin(&mut self.systems, &mut self.context);
        info!("Plugin loaded, initial scene {:?}", initial);
        self.systems.scene_manager.set_initial(initial);
        self.plugin = Some(plugin);
    }

    //--- Tick -------------------------------------------------------------

    fn tick(&mut self, collector: &mut EventCollector) -> TickControl {
        if collector.collect_frame(&mut self.context.frame_input_events) == TickControl::Exit {
            return TickControl::Exit;
        }

        if let Some(viewport) = collector.take_viewport() {
            debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
            self.context.resources.insert(viewport);
        }

        self.systems.update(&mut self.context)
    }

    fn shutdown(&mut self) {
        self.systems.scene_manager.shutdown(&mut self.context);
        if let Some(mut plugin) = self.plugin.take() {
            plugin.end(&mut self.context);
        }
    }

    //--- Thread -----------------------------------------------------------

    /// Runs the loop on a new thread. `on_exit` fires when the thread
    /// ends, including by panic, so the platform can close the window.
    pub(crate) fn spawn_core_thread<F>(
        mut self,
        receiver: Receiver<PlatformEvent>,
        tps: f64,
        on_exit: F,
    ) -> thread::JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);

        thread::spawn(move || {
            let _notice = ExitNotice(Some(on_exit));
            let mut collector = EventCollector::new(receiver);
            self.systems.scene_manager.start(&mut self.context);

            loop {
                let frame_start = Instant::now();

                if self.tick(&mut collector) == TickControl::Exit {
                    info!("Core thread exiting after {} ticks", self.context.time.tick);
                    break;
                }

                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }

            self.shutdown();
        })
    }
}

//=== ExitNotice ==========================================================

/// Calls its hook on drop, which also happens while unwinding.
struct ExitNotice<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> Drop for ExitNotice<F> {
    fn drop(&mut self) {
        if let Some(hook) = self.0.take() {
            debug!("Core thread ended, notifying platform");
            hook();
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
