//=========================================================================
// Engine
//=========================================================================
//
// Entry point that wires the logic thread to the platform loop.
//
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_tps()              ├─ init() / with_plugin()
//         ├─ with_channel_capacity() └─ run(): spawns logic thread,
//         └─ with_window()                    runs platform, joins
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::bounded;
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::{Action, CoreSystemsOrchestrator, GlobalContext, GlobalSystems, SceneKey};
use crate::games::GamePlugin;
use crate::platform::{Platform, PlatformProxy, WindowSettings};

//=== EngineBuilder =======================================================

/// Builder for an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0
/// - **Channel capacity**: 128 events
/// - **Window**: "Islander", 1280x720
///
/// ```no_run
/// use islander::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Screen { Harbour }
/// impl SceneKey for Screen {}
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Order { Hoist }
/// impl Action for Order {}
///
/// EngineBuilder::<Screen, Order>::new()
///     .with_tps(120.0)
///     .with_window("Harbour", 800, 600)
///     .build()
///     .run();
/// ```
pub struct EngineBuilder<S: SceneKey, A: Action> {
    tps: f64,
    channel_capacity: usize,
    window: WindowSettings,
    _phantom: std::marker::PhantomData<(S, A)>,
}

impl<S: SceneKey, A: Action> EngineBuilder<S, A> {
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            window: WindowSettings::default(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Sets the logic thread's ticks per second.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the platform → core channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_window(mut self, title: impl Into<String>, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be positive, got {}x{}", width, height);
        self.window = WindowSettings {
            title: title.into(),
            width,
            height,
        };
        self
    }

    pub fn build(self) -> Engine<S, A> {
        info!(
            "Building engine (TPS: {}, channel: {}, window: {:?})",
            self.tps, self.channel_capacity, self.window
        );

        Engine {
            orchestrator: CoreSystemsOrchestrator::new(self.tps),
            tps: self.tps,
            channel_capacity: self.channel_capacity,
            window: self.window,
        }
    }
}

impl<S: SceneKey, A: Action> Default for EngineBuilder<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Engine runtime. Create through [`EngineBuilder`].
///
/// ```text
/// Engine (main thread)
///   ├─► CoreSystemsOrchestrator (logic thread @ TPS)
///   │     └─► InputSystem, SceneManager, scenes
///   └─► Platform (winit event loop)
/// ```
pub struct Engine<S: SceneKey, A: Action> {
    orchestrator: CoreSystemsOrchestrator<S, A>,
    tps: f64,
    channel_capacity: usize,
    window: WindowSettings,
}

impl<S: SceneKey, A: Action> Engine<S, A> {
    //--- Initialization ---------------------------------------------------

    /// Gives direct access to systems and context before the first tick.
    ///
    /// ```no_run
    /// # use islander::prelude::*;
    /// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// # enum Screen { Harbour }
    /// # impl SceneKey for Screen {}
    /// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// # enum Order { Hoist }
    /// # impl Action for Order {}
    /// EngineBuilder::<Screen, Order>::new()
    ///     .build()
    ///     .init(|systems, _context| {
    ///         systems.input.bind_key(KeyCode::KeyH, Order::Hoist, InputContext::Primary);
    ///     })
    ///     .run();
    /// ```
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut GlobalSystems<S, A>, &mut GlobalContext),
    {
        info!("Initializing engine systems");
        self.orchestrator.init_systems(init_fn);
        self
    }

    /// Runs the plugin's `begin` hook now; `end` runs on the logic thread
    /// after the loop exits.
    pub fn with_plugin<P>(mut self, plugin: P) -> Self
    where
        P: GamePlugin<S, A> + 'static,
    {
        self.orchestrator.load_plugin(Box::new(plugin));
        self
    }

    //--- Execution --------------------------------------------------------

    /// Blocks until the window closes or the game quits.
    ///
    /// 1. Creates the event loop and the bounded platform → core channel
    /// 2. Spawns the logic thread, which wakes the event loop on exit
    /// 3. Runs the platform event loop on this thread
    /// 4. Joins the logic thread; a panic there is logged, not propagated
    pub fn run(self) {
        info!("Starting engine runtime (TPS: {})", self.tps);

        let (tx, rx) = bounded(self.channel_capacity);

        let event_loop = match Platform::event_loop() {
            Ok(event_loop) => event_loop,
            Err(e) => {
                // Dropping `tx` ends the logic thread after one tick so the
                // plugin still gets its `end` hook.
                error!("Platform error: {}", e);
                drop(tx);
                let core_handle = self.orchestrator.spawn_core_thread(rx, self.tps, || {});
                if core_handle.join().is_err() {
                    error!("Core thread panicked during shutdown");
                }
                return;
            }
        };

        let proxy = PlatformProxy::new(&event_loop);
        let core_handle = self
            .orchestrator
            .spawn_core_thread(rx, self.tps, move || proxy.core_exited());
        info!("Core logic thread spawned");

        let platform = Platform::new(tx, self.window);
        if let Err(e) = platform.run(event_loop) {
            error!("Platform error: {}", e);
        }
        info!("Platform event loop exited");

        match core_handle.join() {
            Ok(()) => info!("Core thread terminated cleanly"),
            Err(e) => error!("Core thread panicked: {:?}", e),
        }

        info!("Engine shutdown complete");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
