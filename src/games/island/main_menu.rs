//=========================================================================
// Main Menu
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;
use log::info;

//=== Internal Dependencies ===============================================

use super::menu::Menu;
use super::{actions, despawn_all, fail, spawn_text, IslandScene, Session, CONNECT_TIMEOUT, MENU};
use crate::config::PlayerConfig;
use crate::core::ecs::Entity;
use crate::core::scene::{Scene, SceneTransition};
use crate::core::{EngineCommand, GlobalContext};

//=== Items ===============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Host,
    Join,
    Quit,
}

const ITEMS: &[(Choice, &str)] = &[(Choice::Host, "Host game"), (Choice::Join, "Join game"), (Choice::Quit, "Quit")];

//=== MainMenuScene =======================================================

pub(crate) struct MainMenuScene {
    menu: Menu<Choice>,
    decor: Vec<Entity>,
}

impl MainMenuScene {
    pub(crate) fn new() -> Self {
        Self {
            menu: Menu::new(ITEMS),
            decor: Vec::new(),
        }
    }

    fn open_session(&self, context: &mut GlobalContext, choice: Choice) {
        let config = context.resources.get::<PlayerConfig>().cloned().unwrap_or_default();

        let result = match choice {
            Choice::Host => Session::host(&config, CONNECT_TIMEOUT),
            _ => Session::join(&config, CONNECT_TIMEOUT),
        };

        match result {
            Ok(session) => {
                info!("Entering lobby as player {}", session.player_id());
                context.resources.insert(session);
                context
                    .message_bus
                    .push(SceneTransition::Replace(IslandScene::MainMenu, IslandScene::Lobby));
            }
            Err(e) => {
                let verb = if choice == Choice::Host { "host" } else { "join" };
                fail(context, format!("Could not {} {}: {}", verb, config.server_addr(), e));
            }
        }
    }
}

impl Scene<IslandScene> for MainMenuScene {
    fn on_enter(&mut self, context: &mut GlobalContext) {
        context.message_bus.push(EngineCommand::SetInputContext(MENU));

        let name = context
            .resources
            .get::<PlayerConfig>()
            .map_or_else(|| "Sailor".to_string(), |c| c.name.clone());
        let world = &mut context.world;
        self.decor.push(spawn_text(world, "ISLANDER", Vec2::new(96.0, 64.0), 64.0));
        self.decor.push(spawn_text(world, format!("Ahoy, {}", name), Vec2::new(96.0, 140.0), 24.0));
        self.menu.spawn(world, Vec2::new(96.0, 220.0));
    }

    fn on_exit(&mut self, context: &mut GlobalContext) {
        self.menu.despawn(&mut context.world);
        despawn_all(&mut context.world, &mut self.decor);
    }

    fn update(&mut self, context: &mut GlobalContext) {
        self.menu.track_pointer(&context.input_state, &mut context.world);
        for action in actions(context) {
            match self.menu.handle(action) {
                Some(Choice::Quit) => {
                    info!("Quit selected");
                    context.message_bus.push(EngineCommand::Quit);
                    return;
                }
                Some(choice) => {
                    self.open_session(context, choice);
                    return;
                }
                None => self.menu.refresh(&mut context.world),
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use crate::config::PlayerConfig;
    use crate::core::input::KeyCode;
    use crate::core::platform_bridge::TickControl;
    use crate::games::island::tests::Harness;
    use crate::games::island::{ErrorReport, IslandScene, Session};

    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn quit_wraps_up_from_first_item() {
        let mut harness = Harness::new(PlayerConfig::default());
        harness.press(KeyCode::KeyW);
        assert_eq!(harness.press(KeyCode::Enter), TickControl::Exit);
    }

    #[test]
    fn clicking_quit_label_exits() {
        let mut harness = Harness::new(PlayerConfig::default());

        // Left of the labels: nothing is picked.
        assert_eq!(harness.click_at(10.0, 230.0), TickControl::Continue);
        assert_eq!(harness.stack(), &[IslandScene::MainMenu]);

        // Third row starts at 220 + 2 * 48.
        assert_eq!(harness.click_at(150.0, 330.0), TickControl::Exit);
    }

    #[test]
    fn failed_join_shows_error() {
        let config = PlayerConfig {
            port: closed_port(),
            ..PlayerConfig::default()
        };
        let mut harness = Harness::new(config);

        harness.press(KeyCode::KeyS);
        harness.press(KeyCode::Enter);

        assert_eq!(harness.stack(), &[IslandScene::Error]);
        assert!(!harness.context.resources.contains::<Session>());
        assert!(!harness.context.resources.contains::<ErrorReport>());
        assert!(harness.texts().iter().any(|t| t.starts_with("Could not join")));
    }

    #[test]
    fn host_enters_lobby_with_session() {
        let config = PlayerConfig {
            port: 0,
            ..PlayerConfig::default()
        };
        let mut harness = Harness::new(config);

        harness.press(KeyCode::Enter);

        assert_eq!(harness.stack(), &[IslandScene::Lobby]);
        let session = harness.context.resources.get::<Session>().unwrap();
        assert_eq!(session.player_id(), 0);
        assert!(session.server_addr().is_some());
    }
}
