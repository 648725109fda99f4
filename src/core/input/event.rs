//=========================================================================
// Input Event Types
//=========================================================================
//
// Portable representation of keyboard and mouse input.
//
// Platform layer (winit) → InputEvent → StateTracker / ActionMapper
//
// KeyCode is serializable so keybindings can live in the player config.
// MouseMoved events compare equal regardless of coordinates, which lets
// the platform buffer coalesce them (last position wins).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

//=== MouseButton =========================================================

/// Physical mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Side, thumb and macro buttons.
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key (location, not produced character).
///
/// Keys outside this set arrive as [`KeyCode::Unidentified`] and are
/// dropped by the platform layer before reaching the core thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    ShiftLeft,
    ControlLeft,

    Unidentified,
}

//=== InputEvent ==========================================================

/// Low-level input event produced by the platform layer.
///
/// Equality compares event kind, key/button and modifiers.
/// `MouseMoved` ignores coordinates so a frame buffer keeps only the
/// latest cursor position.
#[derive(Debug, Clone)]
pub enum InputEvent {
    KeyDown { key: KeyCode, modifiers: Modifiers },
    KeyUp { key: KeyCode, modifiers: Modifiers },
    MouseButtonDown { button: MouseButton, modifiers: Modifiers },
    MouseButtonUp { button: MouseButton, modifiers: Modifiers },
    /// Cursor position in window pixels, top-left origin.
    MouseMoved { x: f32, y: f32 },
    Unidentified,
}

impl PartialEq for InputEvent {
    fn eq(&self, other: &Self) -> bool {
        use InputEvent::*;
        match (self, other) {
            (KeyDown { key: a, modifiers: ma }, KeyDown { key: b, modifiers: mb })
            | (KeyUp { key: a, modifiers: ma }, KeyUp { key: b, modifiers: mb }) => {
                a == b && ma == mb
            }
            (
                MouseButtonDown { button: a, modifiers: ma },
                MouseButtonDown { button: b, modifiers: mb },
            )
            | (
                MouseButtonUp { button: a, modifiers: ma },
                MouseButtonUp { button: b, modifiers: mb },
            ) => a == b && ma == mb,
            (MouseMoved { .. }, MouseMoved { .. }) => true,
            (Unidentified, Unidentified) => true,
            _ => false,
        }
    }
}

impl Eq for InputEvent {}

impl Hash for InputEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::KeyDown { key, modifiers } | Self::KeyUp { key, modifiers } => {
                key.hash(state);
                modifiers.hash(state);
            }
            Self::MouseButtonDown { button, modifiers }
            | Self::MouseButtonUp { button, modifiers } => {
                button.hash(state);
                modifiers.hash(state);
            }
            _ => {}
        }
    }
}

//=== Modifiers ===========================================================

/// Modifier key state. Bindings match modifiers exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false };
    pub const ALT: Self = Self { shift: false, ctrl: false, alt: true };
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn key_down(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown { key, modifiers: Modifiers::NONE }
    }

    #[test]
    fn mouse_moves_coalesce_in_a_set() {
        let mut set = HashSet::new();
        set.insert(InputEvent::MouseMoved { x: 1.0, y: 2.0 });
        set.replace(InputEvent::MouseMoved { x: 30.0, y: 40.0 });

        assert_eq!(set.len(), 1);
        match set.iter().next() {
            Some(InputEvent::MouseMoved { x, y }) => assert_eq!((*x, *y), (30.0, 40.0)),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn modifiers_distinguish_key_events() {
        let plain = key_down(KeyCode::KeyS);
        let ctrl = InputEvent::KeyDown { key: KeyCode::KeyS, modifiers: Modifiers::CTRL };
        assert_ne!(plain, ctrl);
        assert_eq!(plain, key_down(KeyCode::KeyS));
    }

    #[test]
    fn press_and_release_are_different_events() {
        let up = InputEvent::KeyUp { key: KeyCode::Space, modifiers: Modifiers::NONE };
        assert_ne!(key_down(KeyCode::Space), up);
    }

    #[test]
    fn keycode_survives_toml() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            key: KeyCode,
        }
        let text = toml::to_string(&Wrapper { key: KeyCode::ArrowUp }).unwrap();
        assert!(text.contains("ArrowUp"));
        let back: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(back.key, KeyCode::ArrowUp);
    }
}
