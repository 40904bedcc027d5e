/// Floor for the simulation time scale. A zero scale would stall every
/// transition, since their durations are measured through it.
pub const MIN_TIME_SCALE: f32 = 0.01;

/// Clamp `scale` into the valid clock range. NaN maps to full speed.
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_TIME_SCALE, 1.0)
}

/// The global simulation clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineClock {
    /// Current time scale.
    pub scale: f32,
    /// Scale lost per unscaled second by the active transition.
    pub rate: f32,
    /// Unscaled seconds left in the active transition.
    pub remaining: f32,
}

impl EngineClock {
    pub fn new(scale: f32) -> Self {
        Self {
            scale: clamp_scale(scale),
            rate: 0.0,
            remaining: 0.0,
        }
    }

    /// Convert an unscaled host delta into simulation time.
    pub fn scaled(&self, real_dt: f32) -> f32 {
        real_dt * self.scale
    }

    /// Convert a scaled delta back into unscaled time.
    pub fn unscaled(&self, dt: f32) -> f32 {
        dt / self.scale
    }
}

impl Default for EngineClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}
