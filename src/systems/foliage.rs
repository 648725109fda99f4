//=========================================================================
// Foliage Sway
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::components::Transform2D;
use crate::core::ecs::{Entity, World};

//=== Components ==========================================================

/// Swaying plant. Each instance gets its own `phase` so a grove does not
/// move in lockstep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Foliage {
    pub base_rotation: f32,
    /// Radians at full wind strength.
    pub amplitude: f32,
    /// Radians per second.
    pub frequency: f32,
    pub phase: f32,
}

/// Global wind, 0 (calm) to 1 (storm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    pub strength: f32,
}

impl Default for Wind {
    fn default() -> Self {
        Self { strength: 0.5 }
    }
}

//=== FoliageSystem =======================================================

#[derive(Debug, Default)]
pub struct FoliageSystem {
    scratch: Vec<(Entity, f32)>,
}

impl FoliageSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, world: &mut World, elapsed: f32, wind: Wind) {
        self.scratch.clear();
        self.scratch.extend(world.iter::<Foliage>().map(|(entity, foliage)| {
            let sway = (elapsed * foliage.frequency + foliage.phase).sin();
            (entity, foliage.base_rotation + sway * foliage.amplitude * wind.strength)
        }));

        for &(entity, rotation) in &self.scratch {
            if let Some(transform) = world.get_mut::<Transform2D>(entity) {
                transform.rotation = rotation;
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
