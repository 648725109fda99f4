//=========================================================================
// Frame Time
//=========================================================================

/// Fixed-step clock advanced once per logic tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds per tick (1 / TPS).
    pub delta: f32,
    /// Seconds since the engine started ticking.
    pub elapsed: f32,
    pub tick: u64,
}

impl FrameTime {
    pub fn new(tps: f64) -> Self {
        Self {
            delta: (1.0 / tps) as f32,
            elapsed: 0.0,
            tick: 0,
        }
    }

    pub(crate) fn advance(&mut self) {
        self.elapsed += self.delta;
        self.tick += 1;
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new(60.0)
    }
}
