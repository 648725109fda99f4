//=========================================================================
// Action Mapper
//=========================================================================
//
// (key/button, modifiers, context) → Action
//
// Only bindings in the active context resolve. Only presses map to
// actions; held keys are queried through the StateTracker instead.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::action::{Action, InputContext};
use super::event::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== ActionMapper ========================================================

pub(crate) struct ActionMapper<A: Action> {
    key_bindings: HashMap<(KeyCode, Modifiers, InputContext), A>,
    mouse_bindings: HashMap<(MouseButton, Modifiers, InputContext), A>,
    current_context: InputContext,
}

impl<A: Action> ActionMapper<A> {
    pub(crate) fn new() -> Self {
        Self {
            key_bindings: HashMap::new(),
            mouse_bindings: HashMap::new(),
            current_context: InputContext::Primary,
        }
    }

    //--- Binding API ------------------------------------------------------

    pub(crate) fn bind_key(&mut self, key: KeyCode, action: A, context: InputContext) {
        self.key_bindings.insert((key, Modifiers::NONE, context), action);
    }

    pub(crate) fn bind_mouse(&mut self, button: MouseButton, action: A, context: InputContext) {
        self.mouse_bindings.insert((button, Modifiers::NONE, context), action);
    }

    pub(crate) fn clear_context(&mut self, context: InputContext) {
        self.key_bindings.retain(|&(_, _, ctx), _| ctx != context);
        self.mouse_bindings.retain(|&(_, _, ctx), _| ctx != context);
    }

    //--- Event Mapping ----------------------------------------------------

    pub(crate) fn map_event(&self, event: &InputEvent) -> Option<A> {
        match event {
            InputEvent::KeyDown { key, modifiers } => self
                .key_bindings
                .get(&(*key, *modifiers, self.current_context))
                .copied(),
            InputEvent::MouseButtonDown { button, modifiers } => self
                .mouse_bindings
                .get(&(*button, *modifiers, self.current_context))
                .copied(),
            _ => None,
        }
    }

    pub(crate) fn set_context(&mut self, context: InputContext) {
        self.current_context = context;
    }

    pub(crate) fn current_context(&self) -> InputContext {
        self.current_context
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestAction {
        Fire,
        Confirm,
        Chart,
    }

    impl Action for TestAction {}

    const MENU: InputContext = InputContext::custom(0);

    fn key_down(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown { key, modifiers: Modifiers::NONE }
    }

    #[test]
    fn same_key_resolves_per_context() {
        let mut mapper = ActionMapper::<TestAction>::new();
        mapper.bind_key(KeyCode::Enter, TestAction::Fire, InputContext::Primary);
        mapper.bind_key(KeyCode::Enter, TestAction::Confirm, MENU);

        assert_eq!(mapper.map_event(&key_down(KeyCode::Enter)), Some(TestAction::Fire));

        mapper.set_context(MENU);
        assert_eq!(mapper.current_context(), MENU);
        assert_eq!(mapper.map_event(&key_down(KeyCode::Enter)), Some(TestAction::Confirm));
    }

    #[test]
    fn modified_press_does_not_fire_plain_binding() {
        let mut mapper = ActionMapper::<TestAction>::new();
        mapper.bind_key(KeyCode::KeyM, TestAction::Chart, InputContext::Primary);

        assert_eq!(mapper.map_event(&key_down(KeyCode::KeyM)), Some(TestAction::Chart));
        let shifted = InputEvent::KeyDown { key: KeyCode::KeyM, modifiers: Modifiers::SHIFT };
        assert_eq!(mapper.map_event(&shifted), None);
    }

    #[test]
    fn releases_and_moves_never_map() {
        let mut mapper = ActionMapper::<TestAction>::new();
        mapper.bind_key(KeyCode::Space, TestAction::Fire, InputContext::Primary);

        let up = InputEvent::KeyUp { key: KeyCode::Space, modifiers: Modifiers::NONE };
        assert_eq!(mapper.map_event(&up), None);
        assert_eq!(mapper.map_event(&InputEvent::MouseMoved { x: 0.0, y: 0.0 }), None);
    }

    #[test]
    fn mouse_buttons_map() {
        let mut mapper = ActionMapper::<TestAction>::new();
        mapper.bind_mouse(MouseButton::Left, TestAction::Fire, InputContext::Primary);

        let click = InputEvent::MouseButtonDown { button: MouseButton::Left, modifiers: Modifiers::NONE };
        assert_eq!(mapper.map_event(&click), Some(TestAction::Fire));
    }

    #[test]
    fn clear_context_drops_all_bindings() {
        let mut mapper = ActionMapper::<TestAction>::new();
        mapper.bind_key(KeyCode::Enter, TestAction::Confirm, MENU);
        mapper.clear_context(MENU);
        mapper.set_context(MENU);

        assert_eq!(mapper.map_event(&key_down(KeyCode::Enter)), None);
    }
}
