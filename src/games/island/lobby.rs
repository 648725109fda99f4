//=========================================================================
// Lobby
//=========================================================================
//
// Roster, ready toggles and quick chat until the host starts the game.
//
//   Ready       toggle own ready flag
//   Confirm     host only: start once every player is ready
//   1-4         quick-chat presets
//   Back        leave the session
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;
use log::debug;

//=== Internal Dependencies ===============================================

use super::{actions, despawn_all, fail, return_to_menu, spawn_text, IslandAction, IslandScene, Session, MENU};
use crate::core::ecs::{Entity, World};
use crate::core::scene::{Scene, SceneTransition};
use crate::core::{EngineCommand, GlobalContext};
use crate::net::{NetError, Packet};

//=== Constants ===========================================================

pub(crate) const QUICK_CHAT: [&str; 4] = ["Ahoy!", "Ready when you are", "Wait for me", "Fair winds, sailors"];

const LEFT: f32 = 96.0;
const ROW: f32 = 36.0;

//=== LobbyScene ==========================================================

pub(crate) struct LobbyScene {
    labels: Vec<Entity>,
}

impl LobbyScene {
    pub(crate) fn new() -> Self {
        Self { labels: Vec::new() }
    }

    /// Rebuilds every label from the session state.
    fn render(&mut self, context: &mut GlobalContext) {
        let world = &mut context.world;
        despawn_all(world, &mut self.labels);
        let Some(session) = context.resources.get::<Session>() else {
            return;
        };

        let mut y = 64.0;
        let mut line = |world: &mut World, text: String, size: f32, y: &mut f32| {
            self.labels.push(spawn_text(world, text, Vec2::new(LEFT, *y), size));
            *y += ROW;
        };

        line(world, "LOBBY".to_string(), 48.0, &mut y);
        for player in session.roster() {
            let mut entry = player.name.clone();
            if player.host {
                entry.push_str(" (captain)");
            }
            if player.id == session.player_id() {
                entry.push_str(" <you>");
            }
            entry.push_str(if player.ready { "  [ready]" } else { "  [...]" });
            line(world, entry, 28.0, &mut y);
        }

        y += ROW;
        let hint = if session.is_host() {
            "R ready   Enter start   Backspace leave   1-4 chat"
        } else {
            "R ready   Backspace leave   1-4 chat"
        };
        line(world, hint.to_string(), 20.0, &mut y);

        y += ROW;
        for chat in session.chat() {
            line(world, chat.to_string(), 20.0, &mut y);
        }
    }

    fn handle_action(session: &mut Session, action: IslandAction) -> Result<(), NetError> {
        match action {
            IslandAction::Ready => {
                let ready = !session.me().is_some_and(|p| p.ready);
                session.send(&Packet::SetReady { ready })
            }
            IslandAction::Confirm if session.is_host() => {
                if session.all_ready() {
                    session.send(&Packet::StartGame { seed: 0 })
                } else {
                    session.note("Not every sailor is ready");
                    Ok(())
                }
            }
            IslandAction::QuickChat(index) => match QUICK_CHAT.get(usize::from(index)) {
                Some(text) => session.send(&Packet::Chat {
                    from: session.player_id(),
                    text: (*text).to_string(),
                }),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

impl Scene<IslandScene> for LobbyScene {
    fn on_enter(&mut self, context: &mut GlobalContext) {
        context.message_bus.push(EngineCommand::SetInputContext(MENU));
        self.render(context);
    }

    fn on_exit(&mut self, context: &mut GlobalContext) {
        despawn_all(&mut context.world, &mut self.labels);
    }

    fn update(&mut self, context: &mut GlobalContext) {
        let actions = actions(context);
        if actions.contains(&IslandAction::Back) {
            debug!("Leaving lobby");
            return_to_menu(context);
            return;
        }

        let Some(session) = context.resources.get_mut::<Session>() else {
            fail(context, "Lobby opened without a session");
            return;
        };

        let mut dirty = false;
        for action in actions {
            if let Err(e) = Self::handle_action(session, action) {
                fail(context, format!("Lost connection to the lobby: {}", e));
                return;
            }
            dirty |= matches!(action, IslandAction::Confirm);
        }

        let packets = match session.poll() {
            Ok(packets) => packets,
            Err(NetError::Disconnected) => {
                fail(context, "The captain closed the lobby");
                return;
            }
            Err(e) => {
                fail(context, format!("Lost connection to the lobby: {}", e));
                return;
            }
        };
        let started = session.seed().is_some();
        dirty |= !packets.is_empty();

        if started {
            context
                .message_bus
                .push(SceneTransition::Replace(IslandScene::Lobby, IslandScene::Game));
        } else if dirty {
            self.render(context);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
