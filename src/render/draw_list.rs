//=========================================================================
// Draw List
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Mat4, Vec4};

//=== Internal Dependencies ===============================================

use crate::core::ecs::Entity;

//=== DrawCall ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub entity: Entity,
    pub texture: String,
    pub world: Mat4,
    pub tint: Vec4,
    /// World Y of the sprite; smaller is farther from the viewer.
    pub depth: f32,
}

//=== DrawList ============================================================

/// One frame of sprite draws, rebuilt every tick.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    calls: Vec<DrawCall>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn push(&mut self, call: DrawCall) {
        self.calls.push(call);
    }

    /// Orders calls back-to-front. Equal depths keep insertion order.
    pub fn sort_back_to_front(&mut self) {
        self.calls.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
