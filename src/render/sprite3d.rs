//=========================================================================
// Sprite3D
//=========================================================================
//
// Upright sprites standing on the ground plane.
//
// World matrix:
//   translate(x, y, vertical_offset) * rotZ(rotation) * scale
//     * translate(-origin) [* rotX(-90°) when corrected]
//
// The correction stands the quad up: local +Y (texture down) becomes
// world -Z, so the sprite faces the viewer along Y.
//
// Each Sprite3D owns one MatrixPool slot. The slot is released during
// world maintenance when its entity is destroyed.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::f32::consts::FRAC_PI_2;

use glam::Mat4;
use log::trace;

//=== Internal Dependencies ===============================================

use super::{DrawCall, DrawList};
use crate::components::{Sprite, Transform2D};
use crate::core::ecs::{Entity, World};
use crate::core::memory::{MatrixIndex, MatrixPool};

//=== Sprite3D ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite3D {
    slot: MatrixIndex,
    /// Height of the sprite's pivot above the ground plane.
    pub vertical_offset: f32,
    pub needs_correction: bool,
    depth: f32,
}

impl Sprite3D {
    /// Wraps a slot the caller already allocated.
    pub fn new(slot: MatrixIndex, vertical_offset: f32, needs_correction: bool) -> Self {
        Self {
            slot,
            vertical_offset,
            needs_correction,
            depth: 0.0,
        }
    }

    /// Allocates a slot from `matrices`.
    ///
    /// # Panics
    ///
    /// Panics if the pool is exhausted.
    pub fn allocate(matrices: &mut MatrixPool, vertical_offset: f32, needs_correction: bool) -> Self {
        Self::new(matrices.allocate(), vertical_offset, needs_correction)
    }

    pub fn slot(&self) -> MatrixIndex {
        self.slot
    }

    /// World Y computed on the last system update.
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// World matrix for `transform` under this sprite's settings.
    pub fn world_matrix(&self, transform: &Transform2D) -> Mat4 {
        let matrix = transform.matrix_at_height(self.vertical_offset);
        if self.needs_correction {
            matrix * Mat4::from_rotation_x(-FRAC_PI_2)
        } else {
            matrix
        }
    }
}

//=== Sprite3DSystem ======================================================

#[derive(Debug, Default)]
pub struct Sprite3DSystem {
    scratch: Vec<(Entity, f32)>,
}

impl Sprite3DSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refreshes every live sprite's matrix and rebuilds `draw_list`.
    ///
    /// Sprites without a Transform2D keep their previous matrix and are
    /// not drawn; sprites without a `Sprite` are positioned but not drawn.
    pub fn update(&mut self, world: &mut World, matrices: &mut MatrixPool, draw_list: &mut DrawList) {
        self.scratch.clear();
        draw_list.clear();

        for (entity, sprite3d) in world.iter::<Sprite3D>() {
            if !world.is_alive(entity) {
                continue;
            }
            let Some(transform) = world.get::<Transform2D>(entity) else {
                continue;
            };

            let matrix = sprite3d.world_matrix(transform);
            *matrices.at_mut(sprite3d.slot) = matrix;
            let depth = matrix.w_axis.y;
            self.scratch.push((entity, depth));

            if let Some(sprite) = world.get::<Sprite>(entity) {
                draw_list.push(DrawCall {
                    entity,
                    texture: sprite.texture.clone(),
                    world: matrix,
                    tint: sprite.tint,
                    depth,
                });
            }
        }

        for &(entity, depth) in &self.scratch {
            if let Some(sprite3d) = world.get_mut::<Sprite3D>(entity) {
                sprite3d.depth = depth;
            }
        }

        draw_list.sort_back_to_front();
        trace!("Sprite3D pass: {} updated, {} drawn", self.scratch.len(), draw_list.len());
    }
}

//=== Slot Release ========================================================

/// Returns the slots of pending-destroyed sprites to the pool.
///
/// Must run before [`World::maintain`] drops the components.
pub fn release_destroyed_sprites(world: &World, matrices: &mut MatrixPool) -> usize {
    let mut released = 0;
    for &entity in world.pending() {
        if let Some(sprite3d) = world.get::<Sprite3D>(entity) {
            if matrices.is_live(sprite3d.slot) {
                matrices.deallocate(sprite3d.slot);
                released += 1;
            }
        }
    }
    released
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    fn spawn(world: &mut World, matrices: &mut MatrixPool, at: Vec2, texture: &str) -> Entity {
        world
            .build()
            .with(Transform2D::at(at))
            .with(Sprite::new(texture, Vec2::ONE))
            .with(Sprite3D::allocate(matrices, 0.0, true))
            .id()
    }

    #[test]
    fn matrix_lifts_translation_by_vertical_offset() {
        let sprite = Sprite3D::new(MatrixPool::new().allocate(), 2.5, false);
        let transform = Transform2D::at(Vec2::new(4.0, -3.0));

        let origin = sprite.world_matrix(&transform).transform_point3(Vec3::ZERO);
        assert!(close(origin, Vec3::new(4.0, -3.0, 2.5)));
    }

    #[test]
    fn correction_stands_quad_upright() {
        let mut matrices = MatrixPool::new();
        let flat = Sprite3D::new(matrices.allocate(), 0.0, false);
        let upright = Sprite3D::new(matrices.allocate(), 0.0, true);
        let transform = Transform2D::default();

        // Texture-down (+Y local) stays on the ground without correction...
        let down = Vec3::new(0.0, 1.0, 0.0);
        assert!(close(flat.world_matrix(&transform).transform_vector3(down), Vec3::Y));
        // ...and points at world-down with it.
        assert!(close(upright.world_matrix(&transform).transform_vector3(down), -Vec3::Z));
    }

    #[test]
    fn system_writes_pool_and_depth() {
        let mut world = World::new();
        let mut matrices = MatrixPool::new();
        let mut draw_list = DrawList::new();
        let palm = spawn(&mut world, &mut matrices, Vec2::new(1.0, 7.0), "palm");

        Sprite3DSystem::new().update(&mut world, &mut matrices, &mut draw_list);

        let sprite3d = world.get::<Sprite3D>(palm).unwrap();
        assert_eq!(sprite3d.depth(), 7.0);
        assert!(close(matrices.at(sprite3d.slot()).transform_point3(Vec3::ZERO), Vec3::new(1.0, 7.0, 0.0)));
        assert_eq!(draw_list.len(), 1);
    }

    #[test]
    fn draw_list_is_back_to_front_and_stable() {
        let mut world = World::new();
        let mut matrices = MatrixPool::new();
        let mut draw_list = DrawList::new();
        spawn(&mut world, &mut matrices, Vec2::new(0.0, 5.0), "near");
        spawn(&mut world, &mut matrices, Vec2::new(0.0, -5.0), "far");
        spawn(&mut world, &mut matrices, Vec2::new(3.0, 0.0), "mid-a");
        spawn(&mut world, &mut matrices, Vec2::new(-3.0, 0.0), "mid-b");

        Sprite3DSystem::new().update(&mut world, &mut matrices, &mut draw_list);

        let depths: Vec<f32> = draw_list.calls().iter().map(|c| c.depth).collect();
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(draw_list.calls()[0].texture, "far");
        assert_eq!(draw_list.calls()[3].texture, "near");

        let mids: Vec<&str> = draw_list.calls()[1..3].iter().map(|c| c.texture.as_str()).collect();
        let iteration_order: Vec<String> = world
            .iter::<Sprite>()
            .filter(|(_, s)| s.texture.starts_with("mid"))
            .map(|(_, s)| s.texture.clone())
            .collect();
        assert_eq!(mids, iteration_order);
    }

    #[test]
    fn pending_sprites_are_skipped_then_released() {
        let mut world = World::new();
        let mut matrices = MatrixPool::new();
        let mut draw_list = DrawList::new();
        let boat = spawn(&mut world, &mut matrices, Vec2::ZERO, "boat");
        world.destroy(boat);

        Sprite3DSystem::new().update(&mut world, &mut matrices, &mut draw_list);
        assert!(draw_list.is_empty());

        assert_eq!(release_destroyed_sprites(&world, &mut matrices), 1);
        world.maintain();
        assert_eq!(matrices.live_count(), 0);
        assert_eq!(release_destroyed_sprites(&world, &mut matrices), 0);
    }
}
