//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use islander::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder};

// Global systems and context
pub use crate::core::globals::{EngineCommand, GlobalContext, GlobalSystems};

// Input system
pub use crate::core::input::{Action, InputContext, KeyCode, Modifiers, MouseButton};

// Scene system
pub use crate::core::scene::{Scene, SceneKey, SceneTransition};

// Message bus
pub use crate::core::message_bus::MessageBus;

// Entities
pub use crate::core::ecs::{Entity, World};

// Game hook
pub use crate::games::GamePlugin;
