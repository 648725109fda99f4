//=========================================================================
// Games
//=========================================================================
//
// A game plugs into the engine through `GamePlugin`:
//
//   Engine::with_plugin(p) ──► p.begin(systems, context) → initial scene
//   loop exits            ──► scenes exited ──► p.end(context)
//
// `begin` registers scenes and bindings; `end` runs on the logic thread
// and is the place to persist settings.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod island;

//=== Internal Dependencies ===============================================

use crate::core::{Action, GlobalContext, GlobalSystems, SceneKey};

//=== GamePlugin ==========================================================

pub trait GamePlugin<S: SceneKey, A: Action>: Send {
    /// Registers scenes and bindings; returns the first scene to stack.
    fn begin(&mut self, systems: &mut GlobalSystems<S, A>, context: &mut GlobalContext) -> S;

    /// Called once after every scene has exited.
    fn end(&mut self, _context: &mut GlobalContext) {}
}
