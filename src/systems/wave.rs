//=========================================================================
// Waves
//=========================================================================
//
// Flat ripples around the island. A wave grows from `start_scale` to
// `end_scale` while its alpha fades from `max_alpha` to zero, then the
// entity is destroyed.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, Vec4};
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//=== Internal Dependencies ===============================================

use crate::components::{Sprite, Transform2D};
use crate::core::ecs::{Entity, World};
use crate::core::memory::MatrixPool;
use crate::render::Sprite3D;

//=== Wave ================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    pub age: f32,
    pub lifetime: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub max_alpha: f32,
}

impl Wave {
    pub fn new(lifetime: f32, start_scale: f32, end_scale: f32) -> Self {
        Self {
            age: 0.0,
            lifetime,
            start_scale,
            end_scale,
            max_alpha: 0.8,
        }
    }

    /// Fraction of the lifetime used, clamped to [0, 1].
    pub fn progress(&self) -> f32 {
        if self.lifetime <= 0.0 {
            1.0
        } else {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        }
    }

    pub fn scale(&self) -> f32 {
        self.start_scale + (self.end_scale - self.start_scale) * self.progress()
    }

    pub fn alpha(&self) -> f32 {
        self.max_alpha * (1.0 - self.progress())
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

//=== WaveSystem ==========================================================

#[derive(Debug, Default)]
pub struct WaveSystem {
    scratch: Vec<(Entity, Wave)>,
}

impl WaveSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ages every wave by `dt`; returns how many expired this tick.
    pub fn update(&mut self, world: &mut World, dt: f32) -> usize {
        self.scratch.clear();
        for (entity, wave) in world.iter_mut::<Wave>() {
            wave.age += dt;
            self.scratch.push((entity, *wave));
        }

        let mut expired = 0;
        for &(entity, wave) in &self.scratch {
            if wave.is_expired() {
                if world.destroy(entity) {
                    expired += 1;
                }
                continue;
            }
            if let Some(transform) = world.get_mut::<Transform2D>(entity) {
                transform.scale = Vec2::splat(wave.scale());
            }
            if let Some(sprite) = world.get_mut::<Sprite>(entity) {
                sprite.set_alpha(wave.alpha());
            }
        }
        expired
    }
}

//=== WaveSpawner =========================================================

/// Emits waves on a ring around `center` at a fixed interval.
#[derive(Debug)]
pub struct WaveSpawner {
    rng: StdRng,
    pub center: Vec2,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub interval: f32,
    pub lifetime: f32,
    timer: f32,
}

impl WaveSpawner {
    pub const TEXTURE: &'static str = "wave";

    pub fn new(seed: u64, center: Vec2, inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            center,
            inner_radius,
            outer_radius,
            interval: 0.6,
            lifetime: 3.0,
            timer: 0.0,
        }
    }

    pub fn with_interval(mut self, interval: f32) -> Self {
        self.interval = interval;
        self
    }

    /// Spawns as many waves as whole intervals elapsed since the last call.
    pub fn update(&mut self, world: &mut World, matrices: &mut MatrixPool, dt: f32) -> Vec<Entity> {
        let mut spawned = Vec::new();
        if self.interval <= 0.0 {
            return spawned;
        }

        self.timer += dt;
        while self.timer >= self.interval {
            self.timer -= self.interval;
            spawned.push(self.spawn(world, matrices));
        }

        if !spawned.is_empty() {
            trace!("Spawned {} waves", spawned.len());
        }
        spawned
    }

    fn spawn(&mut self, world: &mut World, matrices: &mut MatrixPool) -> Entity {
        let angle = self.rng.gen_range(0.0..TAU);
        let radius = if self.outer_radius > self.inner_radius {
            self.rng.gen_range(self.inner_radius..self.outer_radius)
        } else {
            self.inner_radius
        };
        let position = self.center + Vec2::from_angle(angle) * radius;
        let wave = Wave::new(self.lifetime, 0.4, 1.6);

        world
            .build()
            .with(
                Transform2D::at(position)
                    .with_rotation(angle - FRAC_PI_2)
                    .with_scale(Vec2::splat(wave.start_scale)),
            )
            .with(Sprite::new(Self::TEXTURE, Vec2::new(2.0, 0.5)).with_tint(Vec4::new(1.0, 1.0, 1.0, wave.max_alpha)))
            .with(Sprite3D::allocate(matrices, 0.01, false))
            .with(wave)
            .id()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
