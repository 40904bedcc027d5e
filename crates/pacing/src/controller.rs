use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::clock::{EngineClock, clamp_scale};

/// Where a transition takes the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionTarget {
    /// Interpolate to this scale.
    Scale(f32),
    /// Hold the current scale for the duration.
    Wait,
}

/// One queued change of simulation speed.
///
/// Serialized as `{ scale: 0.5, duration: 2.0 }`; omitting `scale` makes it a wait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransitionRepr", into = "TransitionRepr")]
pub struct TimeScaleTransition {
    pub target: TransitionTarget,
    /// Unscaled seconds.
    pub duration: f32,
}

impl TimeScaleTransition {
    pub fn to_scale(scale: f32, duration: f32) -> Self {
        Self {
            target: TransitionTarget::Scale(scale),
            duration,
        }
    }

    pub fn wait(duration: f32) -> Self {
        Self {
            target: TransitionTarget::Wait,
            duration,
        }
    }

    /// Same transition with its target and duration forced into range.
    fn sanitized(self) -> Self {
        let duration = if self.duration.is_finite() {
            self.duration.max(0.0)
        } else {
            0.0
        };
        let target = match self.target {
            TransitionTarget::Scale(s) => TransitionTarget::Scale(clamp_scale(s)),
            TransitionTarget::Wait => TransitionTarget::Wait,
        };
        Self { target, duration }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct TransitionRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<f32>,
    duration: f32,
}

impl From<TransitionRepr> for TimeScaleTransition {
    fn from(r: TransitionRepr) -> Self {
        Self {
            target: r.scale.map_or(TransitionTarget::Wait, TransitionTarget::Scale),
            duration: r.duration,
        }
    }
}

impl From<TimeScaleTransition> for TransitionRepr {
    fn from(t: TimeScaleTransition) -> Self {
        Self {
            scale: match t.target {
                TransitionTarget::Scale(s) => Some(s),
                TransitionTarget::Wait => None,
            },
            duration: t.duration,
        }
    }
}

/// Pacing tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub initial_scale: f32,
    /// Transitions queued at startup (e.g. an opening slow-motion beat).
    pub intro: Vec<TimeScaleTransition>,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            initial_scale: 1.0,
            intro: Vec::new(),
        }
    }
}

/// Transitions that began or ended during one tick, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacingTick {
    pub started: Vec<TimeScaleTransition>,
    pub finished: Vec<TimeScaleTransition>,
}

/// FIFO of time-scale transitions applied to the engine clock.
///
/// Idle until something is queued. A transition ends once its unscaled
/// duration has elapsed, leaving the clock exactly on its target; the next
/// queued one starts immediately with whatever time is left in the tick.
#[derive(Debug, Clone, Default)]
pub struct PacingController {
    clock: EngineClock,
    queue: VecDeque<TimeScaleTransition>,
    active: Option<TimeScaleTransition>,
}

impl PacingController {
    pub fn new(initial_scale: f32) -> Self {
        Self {
            clock: EngineClock::new(initial_scale),
            ..Self::default()
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        let mut controller = Self::new(config.initial_scale);
        for t in &config.intro {
            controller.enqueue(*t);
        }
        controller
    }

    pub fn clock(&self) -> &EngineClock {
        &self.clock
    }

    pub fn scale(&self) -> f32 {
        self.clock.scale
    }

    /// Host helper: simulation delta for an unscaled frame delta.
    pub fn scaled(&self, real_dt: f32) -> f32 {
        self.clock.scaled(real_dt)
    }

    pub fn active(&self) -> Option<TimeScaleTransition> {
        self.active
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    /// Append to the queue. Never interrupts the active transition.
    pub fn enqueue(&mut self, transition: TimeScaleTransition) {
        self.queue.push_back(transition.sanitized());
    }

    /// Drop everything queued or in flight and start `transition` now.
    pub fn override_with(&mut self, transition: TimeScaleTransition) {
        let discarded = self.queue.len() + usize::from(self.active.is_some());
        self.queue.clear();
        tracing::debug!(discarded, ?transition, "pacing override");
        self.begin(transition.sanitized());
    }

    /// Cancel all pacing work, leaving the scale where it is.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.active = None;
        self.clock.rate = 0.0;
        self.clock.remaining = 0.0;
    }

    fn begin(&mut self, transition: TimeScaleTransition) {
        self.clock.remaining = transition.duration;
        self.clock.rate = match transition.target {
            TransitionTarget::Scale(target) if transition.duration > 0.0 => {
                (self.clock.scale - target) / transition.duration
            }
            _ => 0.0,
        };
        self.active = Some(transition);
    }

    /// Advance by `dt` of scaled simulation time.
    ///
    /// A transition that completes mid-tick hands the unused unscaled time to
    /// the next queued transition, which starts in the same tick.
    pub fn tick(&mut self, dt: f32) -> PacingTick {
        let mut report = PacingTick::default();
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut budget = self.clock.unscaled(dt);

        loop {
            if self.active.is_none() {
                let Some(next) = self.queue.pop_front() else {
                    break;
                };
                tracing::debug!(
                    transition = ?next,
                    scale = self.clock.scale,
                    "pacing transition started"
                );
                self.begin(next);
                report.started.push(next);
            }
            let Some(active) = self.active else {
                break;
            };
            match self.advance(active, budget) {
                Some(leftover) => {
                    report.finished.push(active);
                    budget = leftover;
                }
                None => break,
            }
        }

        report
    }

    /// Spend `true_delta` unscaled seconds on `active`. Returns the unused
    /// time when the transition completes.
    fn advance(&mut self, active: TimeScaleTransition, true_delta: f32) -> Option<f32> {
        self.clock.remaining -= true_delta;

        if let TransitionTarget::Scale(target) = active.target {
            let next = self.clock.scale - self.clock.rate * true_delta;
            // rate > 0 means scaling down toward the target, < 0 scaling up.
            let next = if self.clock.rate > 0.0 {
                next.max(target)
            } else if self.clock.rate < 0.0 {
                next.min(target)
            } else {
                next
            };
            self.clock.scale = clamp_scale(next);
        }

        if self.clock.remaining > 0.0 {
            return None;
        }
        if let TransitionTarget::Scale(target) = active.target {
            self.clock.scale = target;
        }
        let leftover = -self.clock.remaining;
        self.clock.rate = 0.0;
        self.clock.remaining = 0.0;
        self.active = None;
        tracing::debug!(
            transition = ?active,
            scale = self.clock.scale,
            leftover,
            "pacing transition finished"
        );
        Some(leftover)
    }
}
