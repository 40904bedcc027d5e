use std::collections::VecDeque;
use std::time::Duration;

/// Fixed-timestep accumulator for hosts that render at a variable rate.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f64,
    accumulator: f64,
    max_steps: u32,
}

impl FixedStep {
    /// `step` is the tick length in seconds. `max_steps` bounds how many ticks
    /// one frame may run; excess backlog is dropped.
    pub fn new(step: f64, max_steps: u32) -> Self {
        let step = if step.is_finite() && step > 0.0 { step } else { 1.0 / 60.0 };
        Self {
            step,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Time carried over to the next frame.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Interpolation factor between the last two ticks.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.step
    }

    /// Feed a frame delta; returns how many ticks to run.
    pub fn advance(&mut self, real_dt: f64) -> u32 {
        if real_dt.is_finite() && real_dt > 0.0 {
            self.accumulator += real_dt;
        }
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if self.accumulator >= self.step {
            tracing::warn!(
                dropped = self.accumulator,
                max_steps = self.max_steps,
                "tick backlog dropped"
            );
            self.accumulator = 0.0;
        }
        steps
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(1.0 / 60.0, 8)
    }
}

/// Rolling window of tick durations for instrumentation.
#[derive(Debug)]
pub struct TickTimer {
    history: VecDeque<Duration>,
    capacity: usize,
}

impl TickTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(dt);
    }

    pub fn average(&self) -> Duration {
        if self.history.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.history.iter().sum();
        total / self.history.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.history.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.history.iter().copied().min().unwrap_or(Duration::ZERO)
    }

    pub fn count(&self) -> usize {
        self.history.len()
    }
}
