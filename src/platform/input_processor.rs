//=========================================================================
// Input Processor
//=========================================================================
//
// Converts platform-specific Winit events into engine InputEvents.
//
// Architecture:
//   Winit Events → InputProcessor → InputEvent (engine type) → InputBuffer
//
// Modifier state from ModifiersChanged is cached and stamped onto every
// following key and button event. OS key repeats and keys outside the
// engine's KeyCode set never leave the platform thread.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::ElementState,
    event::{KeyEvent, MouseButton as WinitMouseButton},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::event::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== InputProcessor ======================================================

pub(crate) struct InputProcessor {
    current_modifiers: Modifiers,
}

impl InputProcessor {
    pub(crate) fn new() -> Self {
        Self {
            current_modifiers: Modifiers::NONE,
        }
    }

    //--- Modifier State Management ----------------------------------------

    /// Updates cached modifier state (applied to subsequent events).
    pub(crate) fn update_modifiers(&mut self, modifiers_state: ModifiersState) {
        self.current_modifiers = Modifiers::from(modifiers_state);
    }

    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.current_modifiers
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a winit key event, or `None` for repeats and unmapped keys.
    pub(crate) fn process_key_event(&self, key_event: &KeyEvent) -> Option<InputEvent> {
        if key_event.repeat {
            return None;
        }
        self.process_key(key_event.physical_key, key_event.state)
    }

    pub(crate) fn process_key(&self, physical: PhysicalKey, state: ElementState) -> Option<InputEvent> {
        let PhysicalKey::Code(code) = physical else {
            return None;
        };

        match KeyCode::from(code) {
            KeyCode::Unidentified => None,
            key => Some(self.create_key_input_event(key, state)),
        }
    }

    pub(crate) fn process_mouse_button(
        &self,
        button: WinitMouseButton,
        state: ElementState,
    ) -> InputEvent {
        let mouse_button = MouseButton::from(button);

        match state {
            ElementState::Pressed => InputEvent::MouseButtonDown {
                button: mouse_button,
                modifiers: self.current_modifiers,
            },
            ElementState::Released => InputEvent::MouseButtonUp {
                button: mouse_button,
                modifiers: self.current_modifiers,
            },
        }
    }

    /// Cursor position in physical window pixels.
    pub(crate) fn process_mouse_move(&self, x: f32, y: f32) -> InputEvent {
        InputEvent::MouseMoved { x, y }
    }

    //--- Internal Helpers -------------------------------------------------

    fn create_key_input_event(&self, key: KeyCode, state: ElementState) -> InputEvent {
        match state {
            ElementState::Pressed => InputEvent::KeyDown {
                key,
                modifiers: self.current_modifiers,
            },
            ElementState::Released => InputEvent::KeyUp {
                key,
                modifiers: self.current_modifiers,
            },
        }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

/// Everything outside the keys the island game binds maps to
/// `KeyCode::Unidentified`.
impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Digits -------------------------------------------------------

            Digit0 => KeyCode::Digit0,
            Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2,
            Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4,
            Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6,
            Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8,
            Digit9 => KeyCode::Digit9,

            //--- Letters ------------------------------------------------------

            KeyA => KeyCode::KeyA,
            KeyB => KeyCode::KeyB,
            KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD,
            KeyE => KeyCode::KeyE,
            KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG,
            KeyH => KeyCode::KeyH,
            KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ,
            KeyK => KeyCode::KeyK,
            KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM,
            KeyN => KeyCode::KeyN,
            KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP,
            KeyQ => KeyCode::KeyQ,
            KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS,
            KeyT => KeyCode::KeyT,
            KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV,
            KeyW => KeyCode::KeyW,
            KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY,
            KeyZ => KeyCode::KeyZ,

            //--- Arrows -------------------------------------------------------

            ArrowUp => KeyCode::ArrowUp,
            ArrowDown => KeyCode::ArrowDown,
            ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight,

            //--- Special ------------------------------------------------------

            Space => KeyCode::Space,
            Enter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,
            ShiftLeft => KeyCode::ShiftLeft,
            ControlLeft => KeyCode::ControlLeft,

            //--- Unmapped (return Unidentified) -------------------------------

            _ => KeyCode::Unidentified,
        }
    }
}

impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    fn mods(shift: bool, ctrl: bool, alt: bool) -> ModifiersState {
        let mut state = ModifiersState::empty();
        state.set(ModifiersState::SHIFT, shift);
        state.set(ModifiersState::CONTROL, ctrl);
        state.set(ModifiersState::ALT, alt);
        state
    }

    #[test]
    fn cached_modifiers_stamp_every_event() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(mods(true, false, false));

        let key = processor.process_key(PhysicalKey::Code(WinitKeyCode::KeyW), ElementState::Pressed);
        let click = processor.process_mouse_button(WinitMouseButton::Left, ElementState::Pressed);

        assert_eq!(key, Some(InputEvent::KeyDown { key: KeyCode::KeyW, modifiers: Modifiers::SHIFT }));
        assert_eq!(
            click,
            InputEvent::MouseButtonDown { button: MouseButton::Left, modifiers: Modifiers::SHIFT }
        );
        assert_eq!(processor.current_modifiers(), Modifiers::SHIFT);
    }

    #[test]
    fn release_maps_to_key_up() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(mods(false, true, true));

        let event = processor.process_key(PhysicalKey::Code(WinitKeyCode::Escape), ElementState::Released);
        assert_eq!(
            event,
            Some(InputEvent::KeyUp {
                key: KeyCode::Escape,
                modifiers: Modifiers { shift: false, ctrl: true, alt: true },
            })
        );
    }

    #[test]
    fn unmapped_and_unknown_keys_are_filtered() {
        let processor = InputProcessor::new();
        assert_eq!(processor.process_key(PhysicalKey::Code(WinitKeyCode::F13), ElementState::Pressed), None);
        assert_eq!(
            processor.process_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified), ElementState::Pressed),
            None
        );
    }

    #[test]
    fn key_table_covers_bound_keys() {
        assert_eq!(KeyCode::from(WinitKeyCode::Digit7), KeyCode::Digit7);
        assert_eq!(KeyCode::from(WinitKeyCode::ArrowLeft), KeyCode::ArrowLeft);
        assert_eq!(KeyCode::from(WinitKeyCode::ShiftLeft), KeyCode::ShiftLeft);
        assert_eq!(KeyCode::from(WinitKeyCode::Enter), KeyCode::Enter);
    }

    #[test]
    fn side_buttons_collapse_to_other() {
        assert_eq!(MouseButton::from(WinitMouseButton::Right), MouseButton::Right);
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other);
    }

    #[test]
    fn cursor_moves_carry_coordinates() {
        let processor = InputProcessor::new();
        match processor.process_mouse_move(123.5, 456.75) {
            InputEvent::MouseMoved { x, y } => assert_eq!((x, y), (123.5, 456.75)),
            other => panic!("Expected MouseMoved, got {:?}", other),
        }
    }
}
