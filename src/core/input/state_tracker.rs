//=========================================================================
// State Tracker
//=========================================================================
//
// Persistent held-state (keys, cursor) plus per-tick cursor motion.
//
// Tick lifecycle: clear() → process_events() → finalize_frame() → query
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode};

//=== StateTracker ========================================================

/// Raw input state visible to scenes through `GlobalContext::input_state`.
#[derive(Debug, Default)]
pub struct StateTracker {
    keys_down: HashSet<KeyCode>,
    mouse_position: (f32, f32),
    mouse_delta: (f32, f32),
    last_mouse_position: (f32, f32),
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Tick Processing --------------------------------------------------

    pub(super) fn clear(&mut self) {
        self.last_mouse_position = self.mouse_position;
    }

    pub(super) fn process_events(&mut self, events: &[InputEvent]) {
        for event in events {
            match event {
                InputEvent::KeyDown { key, .. } => {
                    self.keys_down.insert(*key);
                }
                InputEvent::KeyUp { key, .. } => {
                    self.keys_down.remove(key);
                }
                InputEvent::MouseMoved { x, y } => {
                    self.mouse_position = (*x, *y);
                }
                _ => {}
            }
        }
    }

    pub(super) fn finalize_frame(&mut self) {
        self.mouse_delta = (
            self.mouse_position.0 - self.last_mouse_position.0,
            self.mouse_position.1 - self.last_mouse_position.1,
        );
    }

    //--- Queries ----------------------------------------------------------

    /// True while the key is held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Cursor position in window pixels.
    pub fn mouse_position(&self) -> (f32, f32) {
        self.mouse_position
    }

    /// Cursor movement during the last tick.
    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    /// Returns -1, 0 or 1 from a pair of held keys.
    ///
    /// Holding both keys cancels out.
    pub fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        let mut value = 0.0;
        if self.is_key_down(negative) {
            value -= 1.0;
        }
        if self.is_key_down(positive) {
            value += 1.0;
        }
        value
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
