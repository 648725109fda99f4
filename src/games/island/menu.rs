//=========================================================================
// Menu
//=========================================================================
//
// Vertical text list with wrap-around selection, shared by the main
// menu and the pause overlay. Keyboard moves the cursor; moving the
// mouse over a label selects it and a click picks the label under it.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use super::{spawn_text, IslandAction};
use crate::components::Text;
use crate::core::ecs::{Entity, World};
use crate::core::input::StateTracker;

//=== Constants ===========================================================

const LINE_HEIGHT: f32 = 48.0;
const FONT_SIZE: f32 = 32.0;

//=== Menu ================================================================

pub(crate) struct Menu<T: Copy + 'static> {
    items: &'static [(T, &'static str)],
    selected: usize,
    labels: Vec<Entity>,
    origin: Vec2,
    hovered: Option<usize>,
}

impl<T: Copy + 'static> Menu<T> {
    pub(crate) fn new(items: &'static [(T, &'static str)]) -> Self {
        Self {
            items,
            selected: 0,
            labels: Vec::new(),
            origin: Vec2::ZERO,
            hovered: None,
        }
    }

    pub(crate) fn selected(&self) -> T {
        self.items[self.selected].0
    }

    pub(crate) fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub(crate) fn previous(&mut self) {
        self.selected = (self.selected + self.items.len() - 1) % self.items.len();
    }

    /// Moves the cursor on Up/Down; returns the item picked by Confirm,
    /// or by Click when the cursor is over a label.
    pub(crate) fn handle(&mut self, action: IslandAction) -> Option<T> {
        match action {
            IslandAction::Up => self.previous(),
            IslandAction::Down => self.next(),
            IslandAction::Confirm => return Some(self.selected()),
            IslandAction::Click => return self.hovered.map(|row| self.items[row].0),
            _ => {}
        }
        None
    }

    //--- Entities ---------------------------------------------------------

    /// Spawns one label per item starting at `origin`, selection reset.
    pub(crate) fn spawn(&mut self, world: &mut World, origin: Vec2) {
        self.despawn(world);
        self.selected = 0;
        self.hovered = None;
        self.origin = origin;
        for (row, (_, label)) in self.items.iter().enumerate() {
            let position = origin + Vec2::new(0.0, row as f32 * LINE_HEIGHT);
            self.labels.push(spawn_text(world, *label, position, FONT_SIZE));
        }
        self.refresh(world);
    }

    /// Selects the label under a moving cursor.
    pub(crate) fn track_pointer(&mut self, input: &StateTracker, world: &mut World) {
        let (x, y) = input.mouse_position();
        self.hovered = self.row_at(Vec2::new(x, y));

        if input.mouse_delta() == (0.0, 0.0) {
            return;
        }
        if let Some(row) = self.hovered.filter(|&row| row != self.selected) {
            self.selected = row;
            self.refresh(world);
        }
    }

    fn row_at(&self, point: Vec2) -> Option<usize> {
        if self.labels.is_empty() || point.x < self.origin.x || point.y < self.origin.y {
            return None;
        }
        let row = ((point.y - self.origin.y) / LINE_HEIGHT) as usize;
        (row < self.items.len()).then_some(row)
    }

    /// Highlights the selected label.
    pub(crate) fn refresh(&self, world: &mut World) {
        for (row, &entity) in self.labels.iter().enumerate() {
            if let Some(text) = world.get_mut::<Text>(entity) {
                text.color = if row == self.selected { Text::HIGHLIGHT } else { Text::WHITE };
            }
        }
    }

    pub(crate) fn despawn(&mut self, world: &mut World) {
        super::despawn_all(world, &mut self.labels);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Choice {
        Sail,
        Fish,
        Sleep,
    }

    const ITEMS: &[(Choice, &str)] = &[(Choice::Sail, "Sail"), (Choice::Fish, "Fish"), (Choice::Sleep, "Sleep")];

    #[test]
    fn selection_wraps_both_ways() {
        let mut menu = Menu::new(ITEMS);
        menu.previous();
        assert_eq!(menu.selected(), Choice::Sleep);
        menu.next();
        assert_eq!(menu.selected(), Choice::Sail);
    }

    #[test]
    fn confirm_returns_selected_item() {
        let mut menu = Menu::new(ITEMS);
        assert_eq!(menu.handle(IslandAction::Down), None);
        assert_eq!(menu.handle(IslandAction::Confirm), Some(Choice::Fish));
        assert_eq!(menu.handle(IslandAction::Ready), None);
    }

    #[test]
    fn click_picks_only_the_hovered_label() {
        let mut world = World::new();
        let mut menu = Menu::new(ITEMS);
        menu.spawn(&mut world, Vec2::new(100.0, 100.0));

        assert_eq!(menu.row_at(Vec2::new(150.0, 100.0 + LINE_HEIGHT * 2.5)), Some(2));
        assert_eq!(menu.row_at(Vec2::new(50.0, 110.0)), None);
        assert_eq!(menu.row_at(Vec2::new(150.0, 100.0 + LINE_HEIGHT * 3.0)), None);
        assert_eq!(menu.handle(IslandAction::Click), None);

        menu.hovered = Some(2);
        assert_eq!(menu.handle(IslandAction::Click), Some(Choice::Sleep));
    }

    #[test]
    fn labels_follow_selection_and_despawn() {
        let mut world = World::new();
        let mut menu = Menu::new(ITEMS);
        menu.spawn(&mut world, Vec2::new(100.0, 100.0));

        menu.next();
        menu.refresh(&mut world);
        let colors: Vec<_> = menu.labels.iter().map(|&e| world.get::<Text>(e).unwrap().color).collect();
        assert_eq!(colors, vec![Text::WHITE, Text::HIGHLIGHT, Text::WHITE]);

        menu.despawn(&mut world);
        world.maintain();
        assert!(world.is_empty());
    }
}
