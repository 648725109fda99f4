//=========================================================================
// Camera
//=========================================================================
//
// Chase camera with trauma shake.
//
// The eye sits at `target + offset` and eases toward it with
// `1 - exp(-follow_speed * dt)`, which is frame-rate independent.
// Trauma in [0, 1] decays linearly; shake amplitude is trauma² scaled by
// `max_shake`, driven by a deterministic sum of sines.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::f32::consts::TAU;

use glam::{Mat4, Vec2, Vec3};
use log::debug;

//=== Internal Dependencies ===============================================

use crate::components::Transform2D;
use crate::core::ecs::{Entity, World};

//=== Camera3D ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Camera3D {
    /// Weak reference; cleared when the target dies.
    pub target: Option<Entity>,
    /// Eye position relative to the target's ground position.
    pub offset: Vec3,
    pub follow_speed: f32,
    /// Largest shake displacement, reached at trauma 1.
    pub max_shake: f32,
    /// Trauma lost per second.
    pub trauma_decay: f32,
    position: Vec3,
    focus: Vec3,
    trauma: f32,
    shake_phase: f32,
    shake_offset: Vec3,
}

impl Camera3D {
    pub fn new(offset: Vec3) -> Self {
        Self {
            target: None,
            offset,
            follow_speed: 4.0,
            max_shake: 0.6,
            trauma_decay: 0.9,
            position: offset,
            focus: Vec3::ZERO,
            trauma: 0.0,
            shake_phase: 0.0,
            shake_offset: Vec3::ZERO,
        }
    }

    pub fn following(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    /// Places the camera on `ground` without easing.
    pub fn snap_to(&mut self, ground: Vec2) {
        self.focus = ground.extend(0.0);
        self.position = self.focus + self.offset;
    }

    pub fn add_trauma(&mut self, amount: f32) {
        self.trauma = (self.trauma + amount).clamp(0.0, 1.0);
    }

    pub fn trauma(&self) -> f32 {
        self.trauma
    }

    /// Eye position including shake.
    pub fn eye(&self) -> Vec3 {
        self.position + self.shake_offset
    }

    pub fn focus(&self) -> Vec3 {
        self.focus + self.shake_offset
    }

    /// Right-handed view matrix with +Z up.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.focus(), Vec3::Z)
    }

    fn step(&mut self, ground: Option<Vec2>, dt: f32) {
        if let Some(ground) = ground {
            let blend = 1.0 - (-self.follow_speed * dt).exp();
            let focus = ground.extend(0.0);
            self.focus = self.focus.lerp(focus, blend);
            self.position = self.position.lerp(focus + self.offset, blend);
        }

        self.shake_phase += dt;
        self.trauma = (self.trauma - self.trauma_decay * dt).max(0.0);
        self.shake_offset = if self.trauma > 0.0 {
            let p = self.shake_phase;
            let x = (p * 37.0 * TAU).sin() + 0.5 * (p * 61.0 * TAU).sin();
            let y = (p * 41.0 * TAU).cos() + 0.5 * (p * 53.0 * TAU).cos();
            let amplitude = self.max_shake * self.trauma * self.trauma;
            (Vec2::new(x, y).clamp_length_max(1.0) * amplitude).extend(0.0)
        } else {
            Vec3::ZERO
        };
    }
}

//=== CameraSystem ========================================================

#[derive(Default)]
pub struct CameraSystem {
    scratch: Vec<(Entity, Option<Vec2>, bool)>,
}

impl CameraSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, world: &mut World, dt: f32) {
        self.scratch.clear();
        for (camera_entity, camera) in world.iter::<Camera3D>() {
            let (ground, lost) = match camera.target {
                Some(target) if world.is_alive(target) => {
                    (world.get::<Transform2D>(target).map(|t| t.position), false)
                }
                Some(_) => (None, true),
                None => (None, false),
            };
            self.scratch.push((camera_entity, ground, lost));
        }

        for &(camera_entity, ground, lost) in &self.scratch {
            if let Some(camera) = world.get_mut::<Camera3D>(camera_entity) {
                if lost {
                    debug!("Camera target gone, holding position");
                    camera.target = None;
                }
                camera.step(ground, dt);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
