use descent_origin::Rebase;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Hazard tunables. Negative values are clamped to zero on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    /// Seconds the front holds still before it starts rising.
    pub wait_time: f32,
    pub initial_speed: f32,
    /// Speed gained per second.
    pub acceleration: f32,
    pub max_speed: f32,
    /// Fraction of the gap below the camera's lower bound closed per second.
    pub catch_up_factor: f32,
    /// Start position, measured below the camera's lower bound.
    pub start_offset: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            wait_time: 3.0,
            initial_speed: 0.0,
            acceleration: 4.0,
            max_speed: 220.0,
            catch_up_factor: 0.5,
            start_offset: 200.0,
        }
    }
}

/// What a tick did to the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardStatus {
    /// Still inside the initial wait.
    Waiting,
    /// The wait expired during this tick.
    Released,
    /// Rising.
    Chasing,
}

/// The rising boundary. `position` is the world Y of its surface; everything
/// with a larger Y is inside the hazard.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardFront {
    position: f32,
    speed: f32,
    acceleration: f32,
    max_speed: f32,
    catch_up_factor: f32,
    wait_remaining: f32,
}

fn non_negative(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

impl HazardFront {
    pub fn new(config: &HazardConfig, position: f32) -> Self {
        let max_speed = non_negative(config.max_speed);
        Self {
            position,
            speed: non_negative(config.initial_speed).min(max_speed),
            acceleration: non_negative(config.acceleration),
            max_speed,
            catch_up_factor: non_negative(config.catch_up_factor),
            wait_remaining: non_negative(config.wait_time),
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn is_waiting(&self) -> bool {
        self.wait_remaining > 0.0
    }

    /// Whether a point at world Y `y` is inside the hazard.
    pub fn engulfs(&self, y: f32) -> bool {
        y >= self.position
    }

    /// Distance from a point at world Y `y` down to the front. Negative once
    /// the point has been engulfed.
    pub fn distance_to(&self, y: f32) -> f32 {
        self.position - y
    }

    /// Accelerate and rise. Does nothing but count down while waiting.
    pub fn tick(&mut self, dt: f32) -> HazardStatus {
        let dt = non_negative(dt);
        if self.wait_remaining > 0.0 {
            self.wait_remaining -= dt;
            if self.wait_remaining <= 0.0 {
                self.wait_remaining = 0.0;
                tracing::debug!(position = self.position, "hazard released");
                return HazardStatus::Released;
            }
            return HazardStatus::Waiting;
        }
        self.speed = (self.speed + self.acceleration * dt).min(self.max_speed);
        self.position -= self.speed * dt;
        HazardStatus::Chasing
    }

    /// Pull the front up toward `lower_bound` when it has fallen below the
    /// visible area. Does nothing once the front is at or above the bound.
    ///
    /// Proportional to raw `dt`; a very large step can carry the front past
    /// the bound. Returns the correction applied.
    pub fn catch_up(&mut self, lower_bound: f32, dt: f32) -> f32 {
        let dist = self.position - lower_bound;
        if dist.is_nan() || dist <= 0.0 {
            return 0.0;
        }
        let correction = dist * self.catch_up_factor * non_negative(dt);
        self.position -= correction;
        tracing::trace!(dist, correction, "hazard catch-up");
        correction
    }
}

impl Rebase for HazardFront {
    fn rebase(&mut self, delta: Vec2) {
        self.position += delta.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HazardConfig {
        HazardConfig {
            wait_time: 0.0,
            initial_speed: 0.0,
            acceleration: 10.0,
            max_speed: 50.0,
            catch_up_factor: 0.5,
            start_offset: 0.0,
        }
    }

    #[test]
    fn waits_before_rising() {
        let mut h = HazardFront::new(
            &HazardConfig {
                wait_time: 1.0,
                ..config()
            },
            100.0,
        );
        assert_eq!(h.tick(0.5), HazardStatus::Waiting);
        assert_eq!(h.position(), 100.0);
        assert_eq!(h.tick(0.5), HazardStatus::Released);
        assert_eq!(h.position(), 100.0);
        assert_eq!(h.tick(0.5), HazardStatus::Chasing);
        assert!(h.position() < 100.0);
    }

    #[test]
    fn rises_with_accelerating_speed() {
        let mut h = HazardFront::new(&config(), 0.0);
        h.tick(1.0);
        assert_eq!(h.speed(), 10.0);
        assert_eq!(h.position(), -10.0);
        h.tick(1.0);
        assert_eq!(h.speed(), 20.0);
        assert_eq!(h.position(), -30.0);
    }

    #[test]
    fn speed_is_monotonic_then_constant() {
        for dt in [0.001_f32, 1.0 / 60.0, 0.1, 0.75] {
            let mut h = HazardFront::new(&config(), 0.0);
            let mut last = h.speed();
            let mut capped = false;
            for _ in 0..2_000 {
                h.tick(dt);
                let s = h.speed();
                assert!(s >= last, "speed decreased at dt={dt}");
                assert!(s >= 0.0 && s <= h.max_speed());
                if capped {
                    assert_eq!(s, h.max_speed());
                }
                capped |= s == h.max_speed();
                last = s;
            }
        }
    }

    #[test]
    fn catch_up_only_when_below_lower_bound() {
        // On screen or exactly on the bound: left alone.
        let mut h = HazardFront::new(&config(), 200.0);
        assert_eq!(h.catch_up(360.0, 1.0), 0.0);
        assert_eq!(h.position(), 200.0);
        assert_eq!(h.catch_up(200.0, 1.0), 0.0);
        assert_eq!(h.position(), 200.0);

        // Stranded 1000 below the screen: pulled up.
        let mut h = HazardFront::new(&config(), 1360.0);
        let c = h.catch_up(360.0, 0.1);
        assert!((c - 50.0).abs() < 1e-3);
        assert!((h.position() - 1310.0).abs() < 1e-3);
    }

    #[test]
    fn catch_up_converges_for_small_steps() {
        let mut h = HazardFront::new(&config(), 2000.0);
        for _ in 0..600 {
            h.catch_up(400.0, 1.0 / 60.0);
        }
        let gap = h.position() - 400.0;
        assert!(gap > 0.0 && gap < 20.0, "gap {gap}");
    }

    #[test]
    fn catch_up_ignores_nan_bound() {
        let mut h = HazardFront::new(&config(), 100.0);
        assert_eq!(h.catch_up(f32::NAN, 1.0), 0.0);
        assert_eq!(h.position(), 100.0);
    }

    #[test]
    fn negative_config_is_clamped() {
        let h = HazardFront::new(
            &HazardConfig {
                acceleration: -3.0,
                max_speed: -1.0,
                catch_up_factor: f32::NAN,
                initial_speed: 9.0,
                ..config()
            },
            0.0,
        );
        assert_eq!(h.speed(), 0.0);
        assert_eq!(h.max_speed(), 0.0);
    }

    #[test]
    fn engulf_and_distance() {
        let h = HazardFront::new(&config(), 100.0);
        assert!(h.engulfs(100.0));
        assert!(h.engulfs(150.0));
        assert!(!h.engulfs(20.0));
        assert_eq!(h.distance_to(20.0), 80.0);
    }

    #[test]
    fn rebase_follows_travel_axis() {
        let mut h = HazardFront::new(&config(), 10.0);
        h.rebase(Vec2::new(99.0, 5.0));
        assert_eq!(h.position(), 15.0);
    }
}
