//=========================================================================
// Shadows
//=========================================================================
//
// A shadow is its own entity holding a weak `parent` key. Each tick it
// moves to the parent's ground position pushed along the sun, by an
// amount proportional to how high the parent stands. A shadow whose
// parent is gone is destroyed with it.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use super::Lighting;
use crate::components::{Sprite, Transform2D};
use crate::core::ecs::{Entity, World};
use crate::render::Sprite3D;

//=== ShadowCaster ========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCaster {
    /// Back-reference only; the shadow never keeps its parent alive.
    pub parent: Entity,
    /// Alpha at full sun.
    pub max_alpha: f32,
}

impl ShadowCaster {
    pub fn new(parent: Entity) -> Self {
        Self {
            parent,
            max_alpha: 0.5,
        }
    }
}

//=== ShadowSystem ========================================================

enum ShadowUpdate {
    Follow { shadow: Entity, position: Vec2, rotation: f32, alpha: f32 },
    Orphaned(Entity),
}

#[derive(Default)]
pub struct ShadowSystem {
    scratch: Vec<ShadowUpdate>,
}

impl ShadowSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of orphaned shadows destroyed this tick.
    pub fn update(&mut self, world: &mut World, lighting: &Lighting) -> usize {
        let ground = Vec2::new(lighting.sun_direction.x, lighting.sun_direction.y);

        self.scratch.clear();
        for (shadow, caster) in world.iter::<ShadowCaster>() {
            if !world.is_alive(shadow) {
                continue;
            }
            if !world.is_alive(caster.parent) {
                self.scratch.push(ShadowUpdate::Orphaned(shadow));
                continue;
            }
            let Some(parent) = world.get::<Transform2D>(caster.parent) else {
                continue;
            };
            let height = world
                .get::<Sprite3D>(caster.parent)
                .map_or(0.0, |sprite| sprite.vertical_offset);

            self.scratch.push(ShadowUpdate::Follow {
                shadow,
                position: parent.position + ground * height,
                rotation: parent.rotation,
                alpha: caster.max_alpha * lighting.sun_intensity,
            });
        }

        let mut orphaned = 0;
        for update in self.scratch.drain(..) {
            match update {
                ShadowUpdate::Follow { shadow, position, rotation, alpha } => {
                    if let Some(transform) = world.get_mut::<Transform2D>(shadow) {
                        transform.position = position;
                        transform.rotation = rotation;
                    }
                    if let Some(sprite) = world.get_mut::<Sprite>(shadow) {
                        sprite.set_alpha(alpha);
                    }
                }
                ShadowUpdate::Orphaned(shadow) => {
                    if world.destroy(shadow) {
                        orphaned += 1;
                    }
                }
            }
        }
        orphaned
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::MatrixPool;
    use glam::Vec3;

    fn lighting(direction: Vec3, intensity: f32) -> Lighting {
        Lighting {
            sun_color: Vec3::ONE,
            sun_direction: direction,
            sun_intensity: intensity,
            ambient: 1.0,
        }
    }

    fn boat_with_shadow(world: &mut World, matrices: &mut MatrixPool, height: f32) -> (Entity, Entity) {
        let boat = world
            .build()
            .with(Transform2D::at(Vec2::new(3.0, 4.0)).with_rotation(0.7))
            .with(Sprite3D::allocate(matrices, height, true))
            .id();
        let shadow = world
            .build()
            .with(Transform2D::default())
            .with(Sprite::new("shadow", Vec2::ONE))
            .with(ShadowCaster::new(boat))
            .id();
        (boat, shadow)
    }

    #[test]
    fn shadow_offsets_along_sun_by_height() {
        let mut world = World::new();
        let mut matrices = MatrixPool::new();
        let (_, shadow) = boat_with_shadow(&mut world, &mut matrices, 2.0);

        ShadowSystem::new().update(&mut world, &lighting(Vec3::new(0.5, 0.25, -0.8), 0.6));

        let transform = world.get::<Transform2D>(shadow).unwrap();
        assert!((transform.position - Vec2::new(4.0, 4.5)).length() < 1e-6);
        assert_eq!(transform.rotation, 0.7);
        assert!((world.get::<Sprite>(shadow).unwrap().alpha() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn grounded_parent_casts_directly_below() {
        let mut world = World::new();
        let mut matrices = MatrixPool::new();
        let (_, shadow) = boat_with_shadow(&mut world, &mut matrices, 0.0);

        ShadowSystem::new().update(&mut world, &lighting(Vec3::new(1.0, 0.0, -1.0), 1.0));
        assert_eq!(world.get::<Transform2D>(shadow).unwrap().position, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn orphaned_shadow_is_destroyed() {
        let mut world = World::new();
        let mut matrices = MatrixPool::new();
        let (boat, shadow) = boat_with_shadow(&mut world, &mut matrices, 1.0);
        world.destroy(boat);

        let mut system = ShadowSystem::new();
        assert_eq!(system.update(&mut world, &Lighting::default()), 1);
        assert!(!world.is_alive(shadow));
        assert_eq!(system.update(&mut world, &Lighting::default()), 0);
    }

    #[test]
    fn stale_parent_key_after_maintain_is_orphaned() {
        let mut world = World::new();
        let mut matrices = MatrixPool::new();
        let (boat, shadow) = boat_with_shadow(&mut world, &mut matrices, 1.0);
        world.destroy(boat);
        world.maintain();
        // A new entity may reuse the slot; the old key must still miss.
        world.spawn();

        assert_eq!(ShadowSystem::new().update(&mut world, &Lighting::default()), 1);
        assert!(!world.is_alive(shadow));
    }
}
