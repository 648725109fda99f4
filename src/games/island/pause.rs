//=========================================================================
// Pause
//=========================================================================
//
// Transparent overlay: the Game scene below keeps simulating (other
// players are still sailing) but ignores steering while `Paused` is set.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use super::menu::Menu;
use super::{actions, despawn_all, return_to_menu, spawn_text, IslandAction, IslandScene, Paused, MENU};
use crate::core::ecs::Entity;
use crate::core::input::InputContext;
use crate::core::scene::{Scene, SceneTransition};
use crate::core::{EngineCommand, GlobalContext};

//=== Items ===============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Resume,
    Leave,
}

const ITEMS: &[(Choice, &str)] = &[(Choice::Resume, "Resume"), (Choice::Leave, "Leave game")];

//=== PauseScene ==========================================================

pub(crate) struct PauseScene {
    menu: Menu<Choice>,
    title: Vec<Entity>,
}

impl PauseScene {
    pub(crate) fn new() -> Self {
        Self {
            menu: Menu::new(ITEMS),
            title: Vec::new(),
        }
    }
}

impl Scene<IslandScene> for PauseScene {
    fn on_enter(&mut self, context: &mut GlobalContext) {
        context.resources.insert(Paused(true));
        context.message_bus.push(EngineCommand::SetInputContext(MENU));

        self.title.push(spawn_text(&mut context.world, "PAUSED", Vec2::new(96.0, 96.0), 48.0));
        self.menu.spawn(&mut context.world, Vec2::new(96.0, 180.0));
    }

    fn on_exit(&mut self, context: &mut GlobalContext) {
        context.resources.insert(Paused(false));
        context
            .message_bus
            .push(EngineCommand::SetInputContext(InputContext::Primary));

        self.menu.despawn(&mut context.world);
        despawn_all(&mut context.world, &mut self.title);
    }

    fn update(&mut self, context: &mut GlobalContext) {
        self.menu.track_pointer(&context.input_state, &mut context.world);
        for action in actions(context) {
            let choice = match action {
                IslandAction::Back => Some(Choice::Resume),
                other => self.menu.handle(other),
            };
            match choice {
                Some(Choice::Resume) => {
                    context.message_bus.push(SceneTransition::Remove(IslandScene::Pause));
                    return;
                }
                Some(Choice::Leave) => {
                    return_to_menu(context);
                    return;
                }
                None => self.menu.refresh(&mut context.world),
            }
        }
    }

    fn is_transparent(&self) -> bool {
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
