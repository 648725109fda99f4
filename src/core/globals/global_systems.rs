//=========================================================================
// Global Systems
//=========================================================================
//
// Container for engine-level systems with logic.
//
// Tick pipeline:
//   input → publish actions → scenes → transitions → world maintenance
//         → engine commands → time
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::GlobalContext;
use crate::core::input::{Action, InputContext, InputSystem};
use crate::core::platform_bridge::TickControl;
use crate::core::scene::{SceneKey, SceneManager};
use crate::render::release_destroyed_sprites;

//=== EngineCommand =======================================================

/// Requests from scenes to the engine, sent through the message bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    /// Leave the logic loop after this tick.
    Quit,
    /// Switch the active input context (menu bindings vs boat controls).
    SetInputContext(InputContext),
}

//=== GlobalSystems =======================================================

/// Container for engine-level logic systems.
///
/// - `input`: action mapping and input processing
/// - `scene_manager`: stack-based scene lifecycle
pub struct GlobalSystems<S: SceneKey, A: Action> {
    pub input: InputSystem<A>,
    pub scene_manager: SceneManager<S>,
}

impl<S: SceneKey, A: Action> GlobalSystems<S, A> {
    pub(crate) fn new() -> Self {
        Self {
            input: InputSystem::new(),
            scene_manager: SceneManager::new(),
        }
    }

    //--- Update Loop ------------------------------------------------------

    /// Runs one logic tick over `context`.
    ///
    /// Returns [`TickControl::Exit`] once a scene has sent
    /// [`EngineCommand::Quit`].
    pub(crate) fn update(&mut self, context: &mut GlobalContext) -> TickControl {
        // 1. Input events into state and actions
        self.input
            .process_frame(&mut context.input_state, &context.frame_input_events);
        context.frame_input_events.clear();

        // 2. Replace last tick's actions
        context.message_bus.clear::<A>();
        for action in self.input.actions() {
            context.message_bus.push(*action);
        }

        // 3. Active scenes
        self.scene_manager.update(context);

        // 4. Stack changes
        self.scene_manager.process_transitions(context);

        // 5. Matrix slots go back to the pool before their owners vanish
        let released = release_destroyed_sprites(&context.world, &mut context.matrices);
        let removed = context.world.maintain();
        if !removed.is_empty() {
            debug!(
                "World maintenance: removed {} entities, released {} matrices",
                removed.len(),
                released
            );
        }

        // 6. Engine commands
        let control = self.apply_commands(context);

        // 7. Clock
        context.time.advance();

        control
    }

    fn apply_commands(&mut self, context: &mut GlobalContext) -> TickControl {
        let mut control = TickControl::Continue;

        for command in context.message_bus.drain::<EngineCommand>() {
            match command {
                EngineCommand::Quit => {
                    info!("Quit requested by scene");
                    control = TickControl::Exit;
                }
                EngineCommand::SetInputContext(input_context) => {
                    debug!("Input context -> {:?}", input_context);
                    self.input.set_context(input_context);
                }
            }
        }

        control
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
