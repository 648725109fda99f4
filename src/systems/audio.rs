//=========================================================================
// Audio Attenuation
//=========================================================================
//
// Computes the volume each emitter should play at. Playback itself
// belongs to whatever mixer backend consumes AudioEmitter::volume.
//
//   volume = base * channel * master * attenuation(distance)
//
//   attenuation(d) = 1                                  d <= min
//                  = min / (min + rolloff * (d - min))  d >  min
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use crate::components::Transform2D;
use crate::config::AudioSettings;
use crate::core::ecs::World;

//=== Mixer ===============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixerChannel {
    Music,
    Effects,
    Ambience,
    Menu,
}

impl MixerChannel {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            MixerChannel::Music => 0,
            MixerChannel::Effects => 1,
            MixerChannel::Ambience => 2,
            MixerChannel::Menu => 3,
        }
    }
}

/// Master and per-channel gain, each in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Mixer {
    master: f32,
    channels: [f32; MixerChannel::COUNT],
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            master: 1.0,
            channels: [1.0; MixerChannel::COUNT],
        }
    }

    pub fn from_settings(settings: &AudioSettings) -> Self {
        let mut mixer = Self::new();
        mixer.set_master(settings.master);
        mixer.set_volume(MixerChannel::Music, settings.music);
        mixer.set_volume(MixerChannel::Effects, settings.effects);
        mixer.set_volume(MixerChannel::Ambience, settings.ambience);
        mixer.set_volume(MixerChannel::Menu, settings.menu);
        mixer
    }

    pub fn master(&self) -> f32 {
        self.master
    }

    pub fn set_master(&mut self, volume: f32) {
        self.master = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self, channel: MixerChannel) -> f32 {
        self.channels[channel.index()]
    }

    pub fn set_volume(&mut self, channel: MixerChannel, volume: f32) {
        self.channels[channel.index()] = volume.clamp(0.0, 1.0);
    }

    /// Channel gain times master.
    pub fn gain(&self, channel: MixerChannel) -> f32 {
        self.volume(channel) * self.master
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

//=== AudioEmitter ========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AudioEmitter {
    pub sound: String,
    pub channel: MixerChannel,
    pub base_volume: f32,
    /// Full volume inside this radius.
    pub min_distance: f32,
    pub rolloff: f32,
    pub looping: bool,
    volume: f32,
}

impl AudioEmitter {
    pub fn new(sound: impl Into<String>, channel: MixerChannel) -> Self {
        Self {
            sound: sound.into(),
            channel,
            base_volume: 1.0,
            min_distance: 2.0,
            rolloff: 1.0,
            looping: false,
            volume: 0.0,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn with_range(mut self, min_distance: f32, rolloff: f32) -> Self {
        self.min_distance = min_distance;
        self.rolloff = rolloff;
        self
    }

    /// Volume computed on the last update.
    pub fn volume(&self) -> f32 {
        self.volume
    }
}

/// Inverse-distance falloff. A non-positive `min_distance` is treated
/// as a tiny radius rather than silencing the emitter.
pub fn attenuation(distance: f32, min_distance: f32, rolloff: f32) -> f32 {
    let min_distance = min_distance.max(0.01);
    if distance <= min_distance {
        return 1.0;
    }
    let rolloff = rolloff.max(0.0);
    min_distance / (min_distance + rolloff * (distance - min_distance))
}

//=== AudioSystem =========================================================

#[derive(Debug, Default)]
pub struct AudioSystem;

impl AudioSystem {
    pub fn new() -> Self {
        Self
    }

    /// Updates every emitter's volume for a listener standing at `listener`.
    ///
    /// Emitters without a transform are treated as non-positional.
    pub fn update(&self, world: &mut World, mixer: &Mixer, listener: Vec2) {
        let positions: Vec<_> = world
            .iter::<AudioEmitter>()
            .map(|(entity, _)| (entity, world.get::<Transform2D>(entity).map(|t| t.position)))
            .collect();

        for (entity, position) in positions {
            if let Some(emitter) = world.get_mut::<AudioEmitter>(entity) {
                let falloff = position.map_or(1.0, |p| {
                    attenuation(p.distance(listener), emitter.min_distance, emitter.rolloff)
                });
                emitter.volume = emitter.base_volume * mixer.gain(emitter.channel) * falloff;
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_min_distance_is_full_volume() {
        assert_eq!(attenuation(0.0, 2.0, 1.0), 1.0);
        assert_eq!(attenuation(2.0, 2.0, 1.0), 1.0);
    }

    #[test]
    fn falloff_follows_inverse_distance() {
        assert!((attenuation(4.0, 2.0, 1.0) - 0.5).abs() < 1e-6);
        assert!((attenuation(4.0, 2.0, 2.0) - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(attenuation(100.0, 2.0, 0.0), 1.0);
    }

    #[test]
    fn mixer_clamps_and_multiplies() {
        let mut mixer = Mixer::new();
        mixer.set_master(0.5);
        mixer.set_volume(MixerChannel::Effects, 1.4);
        assert_eq!(mixer.volume(MixerChannel::Effects), 1.0);
        assert_eq!(mixer.gain(MixerChannel::Effects), 0.5);
        assert_eq!(mixer.gain(MixerChannel::Music), 0.5);
    }

    #[test]
    fn mixer_reads_settings() {
        let settings = AudioSettings { master: 0.8, music: 0.5, effects: 1.0, ambience: 0.25, menu: 0.0 };
        let mixer = Mixer::from_settings(&settings);
        assert!((mixer.gain(MixerChannel::Ambience) - 0.2).abs() < 1e-6);
        assert_eq!(mixer.gain(MixerChannel::Menu), 0.0);
    }

    #[test]
    fn system_combines_base_channel_master_and_distance() {
        let mut world = World::new();
        let mut mixer = Mixer::new();
        mixer.set_master(0.5);
        mixer.set_volume(MixerChannel::Ambience, 0.8);

        let surf = world
            .build()
            .with(Transform2D::at(Vec2::new(4.0, 0.0)))
            .with(AudioEmitter { base_volume: 0.5, ..AudioEmitter::new("surf", MixerChannel::Ambience) })
            .id();
        let music = world.build().with(AudioEmitter::new("shanty", MixerChannel::Music).looping()).id();

        AudioSystem::new().update(&mut world, &mixer, Vec2::ZERO);

        let surf_volume = world.get::<AudioEmitter>(surf).unwrap().volume();
        assert!((surf_volume - 0.5 * 0.8 * 0.5 * 0.5).abs() < 1e-6);
        assert_eq!(world.get::<AudioEmitter>(music).unwrap().volume(), 0.5);
    }
}
