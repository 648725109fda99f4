//=========================================================================
// Islander: Library Root
//
// A multiplayer pirate island arcade game on a fixed-tick scene engine.
//
// Layout:
// - `core`: logic thread, scenes, input, entity arena, matrix pool
// - `components`, `render`, `systems`: sprite data and per-tick visuals
// - `net`: lobby server and client
// - `config`: persisted player settings
// - `games`: the `GamePlugin` hook and the island game itself
//
// Typical usage:
// ```no_run
// use islander::prelude::*;
// use islander::games::island::{IslandAction, IslandPlugin, IslandScene};
//
// EngineBuilder::<IslandScene, IslandAction>::new()
//     .build()
//     .with_plugin(IslandPlugin::load("islander.toml"))
//     .run();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the engine systems. Game code mostly reaches them through
// `GlobalContext` and the prelude.
//
pub mod components;
pub mod config;
pub mod core;
pub mod games;
pub mod net;
pub mod prelude;
pub mod render;
pub mod systems;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the winit window and is driven only by `Engine::run`.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
