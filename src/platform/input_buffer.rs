//=========================================================================
// Input Buffer
//=========================================================================
//
// Holds input between two redraws.
//
//   discrete:   key/button transitions, in arrival order
//   continuous: latest cursor position only
//
// Drained as one PlatformEvent::Inputs at each frame boundary.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;

//=== InputBuffer =========================================================

pub(crate) struct InputBuffer {
    discrete: Vec<InputEvent>,
    cursor: Option<InputEvent>,
}

impl InputBuffer {
    pub(crate) fn new() -> Self {
        Self {
            discrete: Vec::with_capacity(64),
            cursor: None,
        }
    }

    /// Replaces any cursor position buffered this frame.
    pub(crate) fn push_continuous(&mut self, event: InputEvent) {
        self.cursor = Some(event);
    }

    /// Appends a key/button transition; an exact repeat of the last one
    /// is dropped.
    pub(crate) fn push_discrete(&mut self, event: InputEvent) {
        if self.discrete.last() != Some(&event) {
            self.discrete.push(event);
        }
    }

    /// Returns `(discrete, continuous)` or `None` when nothing was buffered.
    pub(crate) fn drain(&mut self) -> Option<(Vec<InputEvent>, Vec<InputEvent>)> {
        if self.is_empty() {
            return None;
        }
        let discrete = std::mem::replace(&mut self.discrete, Vec::with_capacity(64));
        let continuous = self.cursor.take().into_iter().collect();
        Some((discrete, continuous))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.cursor.is_none()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::{KeyCode, Modifiers};

    fn key_down(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown { key, modifiers: Modifiers::NONE }
    }

    #[test]
    fn repeated_transition_is_dropped() {
        let mut buffer = InputBuffer::new();
        buffer.push_discrete(key_down(KeyCode::KeyA));
        buffer.push_discrete(key_down(KeyCode::KeyA));
        buffer.push_discrete(key_down(KeyCode::KeyB));
        buffer.push_discrete(key_down(KeyCode::KeyA));

        let (discrete, _) = buffer.drain().unwrap();
        assert_eq!(discrete.len(), 3);
    }

    #[test]
    fn cursor_keeps_latest_position() {
        let mut buffer = InputBuffer::new();
        buffer.push_continuous(InputEvent::MouseMoved { x: 10.0, y: 10.0 });
        buffer.push_continuous(InputEvent::MouseMoved { x: 20.0, y: 30.0 });

        let (_, continuous) = buffer.drain().unwrap();
        assert_eq!(continuous.len(), 1);
        match continuous[0] {
            InputEvent::MouseMoved { x, y } => assert_eq!((x, y), (20.0, 30.0)),
            ref other => panic!("Expected MouseMoved, found {:?}", other),
        }
    }

    #[test]
    fn drain_empties_and_then_yields_none() {
        let mut buffer = InputBuffer::new();
        assert!(buffer.drain().is_none());

        buffer.push_discrete(key_down(KeyCode::Space));
        assert!(buffer.drain().is_some());
        assert!(buffer.is_empty());
        assert!(buffer.drain().is_none());
    }
}
