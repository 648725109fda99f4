//=========================================================================
// Action Trait & Input Context
//=========================================================================
//
// Actions are game-defined identifiers routed by the engine without
// interpretation. Contexts let the same key mean different things in
// different screens (Enter = Confirm in a menu, Enter = Fire at sea).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt::Debug;
use std::hash::Hash;

//=== Action Trait ========================================================

/// Marker trait for game-defined action enums.
///
/// ```
/// use islander::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum HarbourAction { Hoist, Anchor }
///
/// impl Action for HarbourAction {}
/// ```
pub trait Action: 'static + Send + Copy + Eq + Hash + Debug {}

//=== InputContext ========================================================

/// Identifies which binding set is active.
///
/// ```
/// # use islander::prelude::*;
/// const SAILING: InputContext = InputContext::Primary;
/// const MENU: InputContext = InputContext::custom(0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InputContext {
    /// Default context for gameplay.
    #[default]
    Primary,

    /// User-defined context (menus, chat, ...).
    Custom(u32),
}

impl InputContext {
    /// Creates a custom context.
    #[inline]
    pub const fn custom(id: u32) -> Self {
        Self::Custom(id)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_is_primary() {
        assert_eq!(InputContext::default(), InputContext::Primary);
    }

    #[test]
    fn custom_contexts_compare_by_id() {
        assert_eq!(InputContext::custom(3), InputContext::Custom(3));
        assert_ne!(InputContext::custom(0), InputContext::custom(1));
        assert_ne!(InputContext::custom(0), InputContext::Primary);
    }
}
