//=========================================================================
// Island
//=========================================================================
//
// Pirate island arcade game: sail around an island with up to three
// other players.
//
//   MainMenu ──Host/Join──► Lobby ──StartGame──► Game ◄──► Pause
//      ▲                      │                    │
//      └──── Error ◄──────────┴──── failure ───────┘
//
// Scene-to-scene state lives in context resources:
//
//   PlayerConfig  loaded in `begin`, saved in `end`
//   Session       network connection (and server, when hosting)
//   ErrorReport   message shown by the Error scene
//   Paused        set while the Pause overlay is up
//   DrawList      sorted sprite draws produced by the Game scene
//   Mixer         channel volumes from the audio settings
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;
use std::time::Duration;

use glam::Vec2;
use log::{error, info, warn};

//=== Module Declarations =================================================

mod error;
mod game;
mod lobby;
mod main_menu;
mod menu;
mod pause;
mod session;

//=== Public API ==========================================================

pub use game::SceneView;
pub use session::Session;

//=== Internal Dependencies ===============================================

use crate::components::Text;
use crate::config::{KeyBindings, PlayerConfig};
use crate::core::ecs::{Entity, World};
use crate::core::input::{InputContext, InputSystem, KeyCode, MouseButton};
use crate::core::scene::SceneTransition;
use crate::core::{Action, GlobalContext, GlobalSystems, SceneKey};
use crate::games::GamePlugin;
use crate::render::DrawList;
use crate::systems::Mixer;

use error::ErrorScene;
use game::GameScene;
use lobby::LobbyScene;
use main_menu::MainMenuScene;
use pause::PauseScene;

//=== Scenes & Actions ====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IslandScene {
    MainMenu,
    Lobby,
    Game,
    Pause,
    Error,
}

impl SceneKey for IslandScene {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IslandAction {
    Up,
    Down,
    Confirm,
    Back,
    Pause,
    Ready,
    /// Mouse click; menus pick the label under the cursor.
    Click,
    /// Index into the lobby's quick-chat presets.
    QuickChat(u8),
}

impl Action for IslandAction {}

/// Bindings for menus, lobby and overlays. Sailing uses `Primary`.
pub const MENU: InputContext = InputContext::custom(0);

const QUICK_CHAT_KEYS: [KeyCode; 4] = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4];

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Replaces every island binding with those from `keys`.
pub fn bind_actions(input: &mut InputSystem<IslandAction>, keys: &KeyBindings) {
    input.clear_context(MENU);
    input.clear_context(InputContext::Primary);

    input.bind_key(keys.up, IslandAction::Up, MENU);
    input.bind_key(KeyCode::ArrowUp, IslandAction::Up, MENU);
    input.bind_key(keys.down, IslandAction::Down, MENU);
    input.bind_key(KeyCode::ArrowDown, IslandAction::Down, MENU);
    input.bind_key(keys.confirm, IslandAction::Confirm, MENU);
    input.bind_key(keys.back, IslandAction::Back, MENU);
    input.bind_key(keys.pause, IslandAction::Back, MENU);
    input.bind_key(keys.ready, IslandAction::Ready, MENU);
    input.bind_mouse(MouseButton::Left, IslandAction::Click, MENU);
    for (index, key) in QUICK_CHAT_KEYS.into_iter().enumerate() {
        input.bind_key(key, IslandAction::QuickChat(index as u8), MENU);
    }

    input.bind_key(keys.pause, IslandAction::Pause, InputContext::Primary);
}

//=== Shared Resources ====================================================

/// Message for the Error scene; consumed when it is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// True while the Pause overlay is stacked over the game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paused(pub bool);

//=== Scene Helpers =======================================================

type Transition = SceneTransition<IslandScene>;

/// Drops the session, stores `message` and shows the Error scene.
pub(crate) fn fail(context: &mut GlobalContext, message: impl Into<String>) {
    let message = message.into();
    error!("{}", message);
    close_session(context);
    context.resources.insert(ErrorReport::new(message));
    context.message_bus.push(Transition::Clear);
    context.message_bus.push(Transition::Push(IslandScene::Error));
}

/// Drops the session and goes back to the main menu.
pub(crate) fn return_to_menu(context: &mut GlobalContext) {
    close_session(context);
    context.message_bus.push(Transition::Clear);
    context.message_bus.push(Transition::Push(IslandScene::MainMenu));
}

fn close_session(context: &mut GlobalContext) {
    if let Some(session) = context.resources.remove::<Session>() {
        session.leave();
    }
}

/// Actions published this tick. Copied so the context stays borrowable.
pub(crate) fn actions(context: &GlobalContext) -> Vec<IslandAction> {
    context.message_bus.read::<IslandAction>().to_vec()
}

pub(crate) fn spawn_text(world: &mut World, content: impl Into<String>, position: Vec2, size: f32) -> Entity {
    world.build().with(Text::new(content, position, size)).id()
}

pub(crate) fn despawn_all(world: &mut World, entities: &mut Vec<Entity>) {
    for entity in entities.drain(..) {
        world.destroy(entity);
    }
}

//=== IslandPlugin ========================================================

pub struct IslandPlugin {
    config_path: PathBuf,
    config: PlayerConfig,
    /// False when the file on disk could not be read; it is left alone.
    save_on_end: bool,
}

impl IslandPlugin {
    pub fn new(config_path: impl Into<PathBuf>, config: PlayerConfig) -> Self {
        Self {
            config_path: config_path.into(),
            config,
            save_on_end: true,
        }
    }

    /// Reads the config at `config_path`, falling back to defaults.
    pub fn load(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let (config, origin) = PlayerConfig::load_or_default(&config_path);
        Self {
            save_on_end: origin.may_overwrite(),
            ..Self::new(config_path, config)
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }
}

impl GamePlugin<IslandScene, IslandAction> for IslandPlugin {
    fn begin(
        &mut self,
        systems: &mut GlobalSystems<IslandScene, IslandAction>,
        context: &mut GlobalContext,
    ) -> IslandScene {
        bind_actions(&mut systems.input, &self.config.keybinds);
        systems.input.set_context(MENU);

        context.resources.insert(Mixer::from_settings(&self.config.audio));
        context.resources.insert(DrawList::new());
        context.resources.insert(Paused::default());
        context.resources.insert(self.config.clone());

        let scenes = &mut systems.scene_manager;
        scenes.register_scene(IslandScene::MainMenu, MainMenuScene::new());
        scenes.register_scene(IslandScene::Lobby, LobbyScene::new());
        scenes.register_scene(IslandScene::Game, GameScene::new());
        scenes.register_scene(IslandScene::Pause, PauseScene::new());
        scenes.register_scene(IslandScene::Error, ErrorScene::new());

        info!("Island loaded for '{}'", self.config.name);
        IslandScene::MainMenu
    }

    fn end(&mut self, context: &mut GlobalContext) {
        close_session(context);

        if let Some(config) = context.resources.remove::<PlayerConfig>() {
            self.config = config;
        }
        if !self.save_on_end {
            warn!(
                "Not saving over {}; it could not be read at startup",
                self.config_path.display()
            );
            return;
        }
        if let Err(e) = self.config.save(&self.config_path) {
            warn!("Could not save config: {}", e);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::input::{InputEvent, Modifiers};
    use crate::core::platform_bridge::TickControl;

    /// Systems and context wired the way the engine wires them.
    pub(crate) struct Harness {
        pub systems: GlobalSystems<IslandScene, IslandAction>,
        pub context: GlobalContext,
    }

    impl Harness {
        pub fn new(config: PlayerConfig) -> Self {
            Self::with_tps(config, 10.0)
        }

        pub fn with_tps(config: PlayerConfig, tps: f64) -> Self {
            let path = std::env::temp_dir().join("islander-never-saved.toml");
            let mut systems = GlobalSystems::new();
            let mut context = GlobalContext::new(tps);
            let initial = IslandPlugin::new(path, config).begin(&mut systems, &mut context);
            systems.scene_manager.set_initial(initial);
            systems.scene_manager.start(&mut context);
            Self { systems, context }
        }

        pub fn tick(&mut self) -> TickControl {
            self.systems.update(&mut self.context)
        }

        pub fn ticks(&mut self, count: usize) {
            for _ in 0..count {
                self.tick();
            }
        }

        pub fn press(&mut self, key: KeyCode) -> TickControl {
            let modifiers = Modifiers::NONE;
            self.context.frame_input_events.push(vec![
                InputEvent::KeyDown { key, modifiers },
                InputEvent::KeyUp { key, modifiers },
            ]);
            self.tick()
        }

        /// Moves the cursor to (`x`, `y`) and clicks there in one tick.
        pub fn click_at(&mut self, x: f32, y: f32) -> TickControl {
            let modifiers = Modifiers::NONE;
            let button = MouseButton::Left;
            self.context.frame_input_events.push(vec![
                InputEvent::MouseMoved { x, y },
                InputEvent::MouseButtonDown { button, modifiers },
                InputEvent::MouseButtonUp { button, modifiers },
            ]);
            self.tick()
        }

        pub fn hold(&mut self, key: KeyCode) {
            let modifiers = Modifiers::NONE;
            self.context.frame_input_events.push(vec![InputEvent::KeyDown { key, modifiers }]);
        }

        pub fn stack(&self) -> &[IslandScene] {
            self.systems.scene_manager.stack()
        }

        pub fn texts(&self) -> Vec<String> {
            self.context
                .world
                .iter::<Text>()
                .filter(|(entity, _)| self.context.world.is_alive(*entity))
                .map(|(_, text)| text.content.clone())
                .collect()
        }
    }

    #[test]
    fn begin_registers_every_scene_and_resources() {
        let harness = Harness::new(PlayerConfig::default());
        let scenes = &harness.systems.scene_manager;

        for key in [
            IslandScene::MainMenu,
            IslandScene::Lobby,
            IslandScene::Game,
            IslandScene::Pause,
            IslandScene::Error,
        ] {
            assert!(scenes.is_registered(key), "{:?} missing", key);
        }
        assert_eq!(harness.stack(), &[IslandScene::MainMenu]);
        assert!(harness.context.resources.contains::<Mixer>());
        assert!(harness.context.resources.contains::<DrawList>());
        assert!(harness.context.resources.contains::<PlayerConfig>());
        assert_eq!(harness.systems.input.context(), MENU);
    }

    #[test]
    fn configured_keys_drive_menu_actions() {
        let mut config = PlayerConfig::default();
        config.keybinds.down = KeyCode::KeyJ;
        let mut harness = Harness::new(config);

        harness.press(KeyCode::KeyJ);
        assert_eq!(harness.context.message_bus.read::<IslandAction>(), &[IslandAction::Down]);

        harness.press(KeyCode::KeyS);
        assert!(harness.context.message_bus.read::<IslandAction>().is_empty());
    }

    #[test]
    fn end_leaves_unreadable_config_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("islander.toml");
        std::fs::write(&path, "name = [unterminated").unwrap();

        let mut plugin = IslandPlugin::load(path.clone());
        let mut systems = GlobalSystems::new();
        let mut context = GlobalContext::new(10.0);
        plugin.begin(&mut systems, &mut context);
        plugin.end(&mut context);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "name = [unterminated");
    }

    #[test]
    fn end_creates_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("islander.toml");

        let mut plugin = IslandPlugin::load(path.clone());
        let mut systems = GlobalSystems::new();
        let mut context = GlobalContext::new(10.0);
        plugin.begin(&mut systems, &mut context);
        plugin.end(&mut context);

        assert_eq!(PlayerConfig::load(&path).unwrap(), PlayerConfig::default());
    }

    #[test]
    fn end_saves_config_from_resources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("islander.toml");

        let mut plugin = IslandPlugin::new(path.clone(), PlayerConfig::default());
        let mut systems = GlobalSystems::new();
        let mut context = GlobalContext::new(10.0);
        plugin.begin(&mut systems, &mut context);

        if let Some(config) = context.resources.get_mut::<PlayerConfig>() {
            config.name = "Bonny".into();
        }
        plugin.end(&mut context);

        let saved = PlayerConfig::load(&path).unwrap();
        assert_eq!(saved.name, "Bonny");
        assert_eq!(plugin.config().name, "Bonny");
    }

    #[test]
    fn fail_shows_error_scene_with_report() {
        let mut harness = Harness::new(PlayerConfig::default());
        fail(&mut harness.context, "The kraken ate the server");
        harness.tick();

        assert_eq!(harness.stack(), &[IslandScene::Error]);
        assert!(harness.texts().iter().any(|t| t.contains("kraken")));
    }
}
