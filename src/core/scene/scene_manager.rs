//=========================================================================
// Scene Manager
//=========================================================================
//
// Scenes are registered once by key and activated through a stack of
// keys, so a scene keeps its state between activations.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::Scene;
use crate::core::globals::GlobalContext;

//=== Scene Transition ====================================================

/// Stack operation requested by a scene through the message bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SceneTransition<K: SceneKey> {
    Push(K),
    Remove(K),
    Replace(K, K),
    Clear,
    #[default]
    Empty,
}

//=== Scene Key Trait =====================================================

/// Marker trait for scene identifiers (usually a game enum).
pub trait SceneKey: Clone + Copy + Eq + Hash + Debug + Send + 'static {}

//=== Scene Manager =======================================================

pub struct SceneManager<S: SceneKey> {
    scenes: HashMap<S, Box<dyn Scene<S>>>,
    stack: Vec<S>,
}

impl<S: SceneKey> SceneManager<S> {
    pub fn new() -> Self {
        Self {
            scenes: HashMap::new(),
            stack: Vec::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    pub fn register_scene<T>(&mut self, key: S, scene: T)
    where
        T: Scene<S> + 'static,
    {
        if self.scenes.insert(key, Box::new(scene)).is_some() {
            warn!("Scene {:?} was already registered and has been replaced", key);
        }
    }

    /// Places `key` on the stack before the engine starts.
    ///
    /// `on_enter` runs from [`SceneManager::start`].
    pub fn set_initial(&mut self, key: S) {
        if self.stack.contains(&key) {
            warn!("Scene {:?} is already in the stack", key);
            return;
        }
        debug!("Scene {:?} set as initial", key);
        self.stack.push(key);
    }

    /// Enters every scene placed on the stack before the first tick.
    pub fn start(&mut self, context: &mut GlobalContext) {
        for &key in &self.stack {
            match self.scenes.get_mut(&key) {
                Some(scene) => {
                    info!("Starting scene {:?}", key);
                    scene.on_enter(context);
                }
                None => warn!("Initial scene {:?} not registered", key),
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn stack(&self) -> &[S] {
        &self.stack
    }

    pub fn top(&self) -> Option<S> {
        self.stack.last().copied()
    }

    pub fn is_registered(&self, key: S) -> bool {
        self.scenes.contains_key(&key)
    }

    //--- Update Loop ------------------------------------------------------

    /// Updates the active scenes from the bottom of the visible range up.
    pub fn update(&mut self, context: &mut GlobalContext) {
        for key in self.collect_active_scenes() {
            if let Some(scene) = self.scenes.get_mut(&key) {
                scene.update(context);
            }
        }
    }

    /// Applies every queued [`SceneTransition`] in FIFO order.
    ///
    /// Transitions queued by `on_enter`/`on_exit` during processing wait
    /// for the next tick.
    pub fn process_transitions(&mut self, context: &mut GlobalContext) {
        for transition in context.message_bus.drain::<SceneTransition<S>>() {
            match transition {
                SceneTransition::Push(key) => self.push_internal(key, context),
                SceneTransition::Remove(key) => self.remove_internal(key, context),
                SceneTransition::Replace(old_key, new_key) => {
                    self.replace_internal(old_key, new_key, context)
                }
                SceneTransition::Clear => self.clear_internal(context),
                SceneTransition::Empty => {}
            }
        }
    }

    /// Exits every stacked scene, top first. Used at shutdown.
    pub fn shutdown(&mut self, context: &mut GlobalContext) {
        self.clear_internal(context);
    }

    //--- Internal Helpers -------------------------------------------------

    fn push_internal(&mut self, key: S, context: &mut GlobalContext) {
        if self.stack.contains(&key) {
            warn!("Scene {:?} is already in the stack, skipping push", key);
            return;
        }
        let Some(scene) = self.scenes.get_mut(&key) else {
            warn!("Attempted to push unregistered scene {:?}", key);
            return;
        };

        debug!("Pushing scene {:?}", key);
        self.stack.push(key);
        scene.on_enter(context);
    }

    fn remove_internal(&mut self, key: S, context: &mut GlobalContext) {
        let Some(pos) = self.stack.iter().position(|&k| k == key) else {
            debug!("Scene {:?} not found in stack, skipping removal", key);
            return;
        };

        debug!("Removing scene {:?} at position {}", key, pos);
        self.stack.remove(pos);
        if let Some(scene) = self.scenes.get_mut(&key) {
            scene.on_exit(context);
        }
    }

    fn replace_internal(&mut self, old_key: S, new_key: S, context: &mut GlobalContext) {
        let Some(pos) = self.stack.iter().position(|&k| k == old_key) else {
            warn!("Scene {:?} not found in stack, skipping replacement", old_key);
            return;
        };
        if self.stack.contains(&new_key) {
            warn!("Scene {:?} is already in the stack, skipping replacement", new_key);
            return;
        }
        if !self.scenes.contains_key(&new_key) {
            warn!("Attempted to replace with unregistered scene {:?}", new_key);
            return;
        }

        debug!("Replacing scene {:?} with {:?}", old_key, new_key);
        if let Some(scene) = self.scenes.get_mut(&old_key) {
            scene.on_exit(context);
        }
        self.stack[pos] = new_key;
        if let Some(scene) = self.scenes.get_mut(&new_key) {
            scene.on_enter(context);
        }
    }

    fn clear_internal(&mut self, context: &mut GlobalContext) {
        debug!("Clearing scene stack ({} scenes)", self.stack.len());
        while let Some(key) = self.stack.pop() {
            if let Some(scene) = self.scenes.get_mut(&key) {
                scene.on_exit(context);
            }
        }
    }

    fn collect_active_scenes(&self) -> Vec<S> {
        let mut active = Vec::new();

        // Walk top-down and stop below the first opaque scene.
        for &key in self.stack.iter().rev() {
            active.push(key);
            let transparent = self
                .scenes
                .get(&key)
                .is_some_and(|scene| scene.is_transparent());
            if !transparent {
                break;
            }
        }

        active.reverse();
        active
    }
}

impl<S: SceneKey> Default for SceneManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
