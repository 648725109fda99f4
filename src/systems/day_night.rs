//=========================================================================
// Day/Night Cycle
//=========================================================================
//
// time_of_day in [0, 1): 0 midnight, 0.25 dawn, 0.5 noon, 0.75 dusk.
//
// Sun colour is interpolated between the four keyframes; the sun rises
// in +X, peaks overhead at noon and sets in -X.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::f32::consts::TAU;

use glam::Vec3;

//=== Keyframes ===========================================================

const KEYFRAMES: [(f32, Vec3); 5] = [
    (0.00, Vec3::new(0.10, 0.12, 0.30)), // midnight
    (0.25, Vec3::new(1.00, 0.62, 0.40)), // dawn
    (0.50, Vec3::new(1.00, 0.98, 0.92)), // noon
    (0.75, Vec3::new(0.95, 0.45, 0.30)), // dusk
    (1.00, Vec3::new(0.10, 0.12, 0.30)), // midnight again
];

/// Ambient light never drops below this, so night stays readable.
pub const AMBIENT_FLOOR: f32 = 0.2;

//=== Lighting ============================================================

/// Per-frame lighting payload handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub sun_color: Vec3,
    /// Direction light travels (from the sun toward the ground).
    pub sun_direction: Vec3,
    /// 0 below the horizon, 1 at noon.
    pub sun_intensity: f32,
    pub ambient: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        DayNightCycle::new(1.0).lighting()
    }
}

//=== DayNightCycle =======================================================

#[derive(Debug, Clone)]
pub struct DayNightCycle {
    time_of_day: f32,
    /// Seconds for one full day.
    day_length: f32,
}

impl DayNightCycle {
    /// Starts at noon.
    ///
    /// # Panics
    ///
    /// Panics if `day_length <= 0`.
    pub fn new(day_length: f32) -> Self {
        assert!(day_length > 0.0, "Day length must be positive, got {}", day_length);
        Self {
            time_of_day: 0.5,
            day_length,
        }
    }

    pub fn with_time_of_day(mut self, time_of_day: f32) -> Self {
        self.set_time_of_day(time_of_day);
        self
    }

    pub fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    /// Wraps any value into [0, 1).
    pub fn set_time_of_day(&mut self, time_of_day: f32) {
        self.time_of_day = time_of_day.rem_euclid(1.0);
    }

    pub fn update(&mut self, dt: f32) -> Lighting {
        self.set_time_of_day(self.time_of_day + dt / self.day_length);
        self.lighting()
    }

    pub fn lighting(&self) -> Lighting {
        let angle = (self.time_of_day - 0.25) * TAU;
        let elevation = angle.sin();
        let sun_position = Vec3::new(angle.cos(), -0.35, elevation).normalize();
        let sun_intensity = elevation.max(0.0);

        Lighting {
            sun_color: sun_color(self.time_of_day),
            sun_direction: -sun_position,
            sun_intensity,
            ambient: AMBIENT_FLOOR + (1.0 - AMBIENT_FLOOR) * sun_intensity,
        }
    }
}

fn sun_color(time_of_day: f32) -> Vec3 {
    for pair in KEYFRAMES.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if time_of_day <= t1 {
            return c0.lerp(c1, (time_of_day - t0) / (t1 - t0));
        }
    }
    KEYFRAMES[0].1
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn keyframes_are_hit_exactly() {
        assert!(close(sun_color(0.0), KEYFRAMES[0].1));
        assert!(close(sun_color(0.25), KEYFRAMES[1].1));
        assert!(close(sun_color(0.5), KEYFRAMES[2].1));
        assert!(close(sun_color(0.75), KEYFRAMES[3].1));
    }

    #[test]
    fn colour_blends_between_keyframes() {
        let halfway = sun_color(0.375);
        assert!(close(halfway, KEYFRAMES[1].1.lerp(KEYFRAMES[2].1, 0.5)));
    }

    #[test]
    fn noon_is_brightest_and_overhead() {
        let noon = DayNightCycle::new(60.0).lighting();
        assert!((noon.sun_intensity - 1.0).abs() < 1e-5);
        assert!((noon.ambient - 1.0).abs() < 1e-5);
        assert!(noon.sun_direction.z < -0.9);
    }

    #[test]
    fn night_keeps_ambient_floor() {
        let midnight = DayNightCycle::new(60.0).with_time_of_day(0.0).lighting();
        assert_eq!(midnight.sun_intensity, 0.0);
        assert!((midnight.ambient - AMBIENT_FLOOR).abs() < 1e-6);
    }

    #[test]
    fn update_advances_and_wraps() {
        let mut cycle = DayNightCycle::new(10.0).with_time_of_day(0.95);
        cycle.update(1.0);
        assert!((cycle.time_of_day() - 0.05).abs() < 1e-5);

        cycle.set_time_of_day(-0.25);
        assert!((cycle.time_of_day() - 0.75).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "Day length must be positive")]
    fn zero_day_length_panics() {
        DayNightCycle::new(0.0);
    }
}
