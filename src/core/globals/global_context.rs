//=========================================================================
// Global Context
//=========================================================================
//
// Shared data container for scenes.
//
// Everything a scene may read or write during a tick lives here as an
// explicit field; there are no file-level statics.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::ecs::World;
use crate::core::input::{InputEvent, StateTracker};
use crate::core::memory::MatrixPool;
use crate::core::message_bus::MessageBus;
use crate::core::resources::Resources;
use crate::core::time::FrameTime;

//=== GlobalContext =======================================================

/// Shared context data accessible to scenes during updates.
///
/// # Available Data
///
/// - `message_bus`: actions, scene transitions, engine commands
/// - `input_state`: held keys and cursor
/// - `world`: entities and their components
/// - `matrices`: world matrices for Sprite3D entities
/// - `resources`: typed singletons shared between scenes
/// - `time`: fixed tick clock
pub struct GlobalContext {
    pub message_bus: MessageBus,

    /// Raw input state for held-key queries.
    ///
    /// Discrete presses arrive as actions on the message bus instead.
    pub input_state: StateTracker,

    pub world: World,

    pub matrices: MatrixPool,

    pub resources: Resources,

    pub time: FrameTime,

    /// Input batches for the current tick, consumed by InputSystem.
    pub(crate) frame_input_events: Vec<Vec<InputEvent>>,
}

impl GlobalContext {
    pub(crate) fn new(tps: f64) -> Self {
        Self {
            message_bus: MessageBus::new(),
            input_state: StateTracker::new(),
            world: World::new(),
            matrices: MatrixPool::new(),
            resources: Resources::new(),
            time: FrameTime::new(tps),
            frame_input_events: Vec::new(),
        }
    }
}
