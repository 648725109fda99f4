//=========================================================================
// Input System
//=========================================================================
//
// Platform events → StateTracker (held keys, cursor) + ActionMapper
// (pressed keys → game actions in the active context).
//
// Owned by GlobalSystems; the StateTracker lives in GlobalContext so
// scenes can query held keys for continuous movement.
//
//=========================================================================

//=== Module Declarations =================================================

mod action;
mod action_mapper;
pub mod event;
mod state_tracker;

//=== Public API ==========================================================

pub use action::{Action, InputContext};
pub use event::{InputEvent, KeyCode, Modifiers, MouseButton};
pub use state_tracker::StateTracker;

//=== Internal Dependencies ===============================================

use action_mapper::ActionMapper;

//=== InputSystem =========================================================

/// Binds keys to actions and converts each tick's events into actions.
pub struct InputSystem<A: Action> {
    mapper: ActionMapper<A>,
    actions: Vec<A>,
}

impl<A: Action> InputSystem<A> {
    pub fn new() -> Self {
        Self {
            mapper: ActionMapper::new(),
            actions: Vec::with_capacity(8),
        }
    }

    //--- Binding API ------------------------------------------------------

    pub fn bind_key(&mut self, key: KeyCode, action: A, context: InputContext) {
        self.mapper.bind_key(key, action, context);
    }

    pub fn bind_mouse(&mut self, button: MouseButton, action: A, context: InputContext) {
        self.mapper.bind_mouse(button, action, context);
    }

    pub fn clear_context(&mut self, context: InputContext) {
        self.mapper.clear_context(context);
    }

    pub fn set_context(&mut self, context: InputContext) {
        self.mapper.set_context(context);
    }

    pub fn context(&self) -> InputContext {
        self.mapper.current_context()
    }

    //--- Tick Processing --------------------------------------------------

    /// Applies one tick of platform batches to `state` and collects actions.
    pub fn process_frame(&mut self, state: &mut StateTracker, batches: &[Vec<InputEvent>]) {
        self.actions.clear();
        state.clear();

        for batch in batches {
            state.process_events(batch);
            self.actions
                .extend(batch.iter().filter_map(|event| self.mapper.map_event(event)));
        }

        state.finalize_frame();
    }

    /// Actions triggered during the last processed tick, in event order.
    pub fn actions(&self) -> &[A] {
        &self.actions
    }
}

impl<A: Action> Default for InputSystem<A> {
    fn default() -> Self {
        Self::new()
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
        Pause,
    }

    impl Action for TestAction {}

    fn down(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown { key, modifiers: Modifiers::NONE }
    }

    #[test]
    fn actions_follow_event_order_across_batches() {
        let mut input = InputSystem::<TestAction>::new();
        let mut state = StateTracker::new();
        input.bind_key(KeyCode::Space, TestAction::Fire, InputContext::Primary);
        input.bind_key(KeyCode::Escape, TestAction::Pause, InputContext::Primary);

        let batches = vec![vec![down(KeyCode::Escape)], vec![down(KeyCode::Space)]];
        input.process_frame(&mut state, &batches);

        assert_eq!(input.actions(), &[TestAction::Pause, TestAction::Fire]);
        assert!(state.is_key_down(KeyCode::Space));
    }

    #[test]
    fn actions_reset_each_tick() {
        let mut input = InputSystem::<TestAction>::new();
        let mut state = StateTracker::new();
        input.bind_key(KeyCode::Space, TestAction::Fire, InputContext::Primary);

        input.process_frame(&mut state, &[vec![down(KeyCode::Space)]]);
        assert_eq!(input.actions().len(), 1);

        input.process_frame(&mut state, &[]);
        assert!(input.actions().is_empty());
        assert!(state.is_key_down(KeyCode::Space));
    }

    #[test]
    fn context_switch_changes_resolution() {
        let menu = InputContext::custom(1);
        let mut input = InputSystem::<TestAction>::new();
        let mut state = StateTracker::new();
        input.bind_key(KeyCode::Escape, TestAction::Pause, InputContext::Primary);

        input.set_context(menu);
        assert_eq!(input.context(), menu);
        input.process_frame(&mut state, &[vec![down(KeyCode::Escape)]]);
        assert!(input.actions().is_empty());
    }
}
