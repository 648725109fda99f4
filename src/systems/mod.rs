//=========================================================================
// Visual Systems
//=========================================================================
//
// Per-tick math over component data. Each system is independent:
//
//   DayNightCycle  → Lighting (sun colour, direction, ambient)
//   FoliageSystem  → Transform2D::rotation of swaying plants
//   WaveSystem     → wave scale/alpha, expiry; WaveSpawner emits them
//   ShadowSystem   → casters follow parents along the sun direction
//   CameraSystem   → Camera3D chase and trauma shake
//   AudioSystem    → AudioEmitter volume from distance and mixer
//
// Systems that read one component while writing another gather first
// and apply second, so no two component borrows overlap.
//
//=========================================================================

//=== Module Declarations =================================================

mod audio;
mod camera;
mod day_night;
mod foliage;
mod shadow;
mod wave;

//=== Public API ==========================================================

pub use audio::{attenuation, AudioEmitter, AudioSystem, Mixer, MixerChannel};
pub use camera::{Camera3D, CameraSystem};
pub use day_night::{DayNightCycle, Lighting};
pub use foliage::{Foliage, FoliageSystem, Wind};
pub use shadow::{ShadowCaster, ShadowSystem};
pub use wave::{Wave, WaveSpawner, WaveSystem};
