//! Shared value types and numeric helpers used by every descent crate.
//!
//! # Invariants
//! - Everything here is plain data; no type in this crate owns world state.
//! - Coordinates are 2D with Y growing downward.

pub mod math;
pub mod types;

pub use glam::Vec2;
pub use math::normalize;
pub use types::{Bounds, Padding, SectionId};
