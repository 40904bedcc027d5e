//! Pacing: global simulation speed driven by a FIFO of time-scale transitions.
//!
//! # Invariants
//! - At most one transition is active; queued ones wait their turn.
//! - Clock scale stays in `[MIN_TIME_SCALE, 1.0]`.
//! - Transition durations are measured in unscaled time.
//! - Out-of-range input is clamped, never reported.

mod clock;
mod controller;

pub use clock::{EngineClock, MIN_TIME_SCALE, clamp_scale};
pub use controller::{
    PacingConfig, PacingController, PacingTick, TimeScaleTransition, TransitionTarget,
};
