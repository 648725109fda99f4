//=========================================================================
// Scene System
//=========================================================================
//
// Stack-based screen states (menu, lobby, game, pause, error).
//
//   SceneManager
//     ├─ scenes: HashMap<S, Box<dyn Scene<S>>>
//     └─ stack:  Vec<S>
//
//   update() → active scenes (top + those exposed by transparent
//   scenes above them) → Scene::update()
//   process_transitions() → drains SceneTransition<S> from the bus
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::globals::GlobalContext;

//=== Module Declarations =================================================

mod scene_manager;

//=== Public API ==========================================================

pub use scene_manager::{SceneKey, SceneManager, SceneTransition};

//=== Scene Trait =========================================================

/// A screen state with lifecycle hooks.
///
/// Scenes build their entities in `on_enter` and tear them down in
/// `on_exit`; state kept in the struct survives between activations.
///
/// ```rust
/// # use islander::prelude::*;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Screen { Harbour }
/// # impl SceneKey for Screen {}
/// struct Harbour;
///
/// impl Scene<Screen> for Harbour {
///     fn update(&mut self, context: &mut GlobalContext) {
///         let _dt = context.time.delta;
///     }
/// }
/// ```
pub trait Scene<S: SceneKey>: Send {
    fn on_enter(&mut self, _context: &mut GlobalContext) {}

    fn on_exit(&mut self, _context: &mut GlobalContext) {}

    /// Called every tick while the scene is active.
    fn update(&mut self, context: &mut GlobalContext);

    /// Transparent scenes (pause overlays) let the scene below keep updating.
    fn is_transparent(&self) -> bool {
        false
    }
}
