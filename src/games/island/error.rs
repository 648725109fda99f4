//=========================================================================
// Error
//=========================================================================
//
// Shows the pending ErrorReport; confirm, back or a timeout returns to
// the main menu.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;
use log::warn;

//=== Internal Dependencies ===============================================

use super::{actions, despawn_all, spawn_text, ErrorReport, IslandAction, IslandScene, MENU};
use crate::core::ecs::Entity;
use crate::core::scene::{Scene, SceneTransition};
use crate::core::{EngineCommand, GlobalContext};

//=== Constants ===========================================================

/// Seconds before the screen dismisses itself.
pub(crate) const ERROR_TIMEOUT: f32 = 5.0;

//=== ErrorScene ==========================================================

pub(crate) struct ErrorScene {
    labels: Vec<Entity>,
    shown_for: f32,
}

impl ErrorScene {
    pub(crate) fn new() -> Self {
        Self {
            labels: Vec::new(),
            shown_for: 0.0,
        }
    }
}

impl Scene<IslandScene> for ErrorScene {
    fn on_enter(&mut self, context: &mut GlobalContext) {
        context.message_bus.push(EngineCommand::SetInputContext(MENU));
        self.shown_for = 0.0;

        let report = context.resources.remove::<ErrorReport>().unwrap_or_else(|| {
            warn!("Error scene entered without a report");
            ErrorReport::new("Something went wrong")
        });

        let world = &mut context.world;
        self.labels.push(spawn_text(world, "SHIPWRECKED", Vec2::new(96.0, 96.0), 48.0));
        self.labels.push(spawn_text(world, report.message, Vec2::new(96.0, 170.0), 24.0));
        self.labels.push(spawn_text(world, "Press Enter to return", Vec2::new(96.0, 240.0), 20.0));
    }

    fn on_exit(&mut self, context: &mut GlobalContext) {
        despawn_all(&mut context.world, &mut self.labels);
    }

    fn update(&mut self, context: &mut GlobalContext) {
        self.shown_for += context.time.delta;

        let dismissed = actions(context)
            .iter()
            .any(|a| matches!(a, IslandAction::Confirm | IslandAction::Back));

        if dismissed || self.shown_for >= ERROR_TIMEOUT {
            context
                .message_bus
                .push(SceneTransition::Replace(IslandScene::Error, IslandScene::MainMenu));
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::core::input::KeyCode;
    use crate::games::island::fail;
    use crate::games::island::tests::Harness;

    fn wrecked() -> Harness {
        let mut harness = Harness::new(PlayerConfig::default());
        fail(&mut harness.context, "Connection timed out");
        harness.tick();
        assert_eq!(harness.stack(), &[IslandScene::Error]);
        harness
    }

    #[test]
    fn confirm_returns_to_menu() {
        let mut harness = wrecked();
        harness.press(KeyCode::Enter);
        assert_eq!(harness.stack(), &[IslandScene::MainMenu]);
        assert!(!harness.texts().iter().any(|t| t == "Connection timed out"));
    }

    #[test]
    fn times_out_after_five_seconds() {
        let mut harness = wrecked();
        // 10 TPS in the harness
        harness.ticks(48);
        assert_eq!(harness.stack(), &[IslandScene::Error]);

        harness.ticks(3);
        assert_eq!(harness.stack(), &[IslandScene::MainMenu]);
    }

    #[test]
    fn missing_report_uses_fallback_text() {
        let mut harness = Harness::new(PlayerConfig::default());
        harness
            .context
            .message_bus
            .push(SceneTransition::Replace(IslandScene::MainMenu, IslandScene::Error));
        harness.tick();
        assert!(harness.texts().iter().any(|t| t == "Something went wrong"));
    }
}
