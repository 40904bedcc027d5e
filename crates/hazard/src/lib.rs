//! Hazard front: a lethal boundary rising from below.
//!
//! # Invariants
//! - `0 <= speed <= max_speed` at all times.
//! - The front follows every origin shift like any other world position.

mod front;

pub use front::{HazardConfig, HazardFront, HazardStatus};
