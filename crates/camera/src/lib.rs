//! Camera framing: keep every tracked actor in view while the world scrolls.
//!
//! # Invariants
//! - Zoom stays within `[min_zoom, max_zoom]` after every operation.
//! - The camera center never moves; scrolling is expressed as an origin
//!   shift handed to the rebaser.
//! - An empty actor set is not an error: the focus box collapses onto the
//!   last known center.

mod focus;
mod framer;

pub use focus::FocusBox;
pub use framer::{CameraConfig, CameraError, CameraFramer, CameraState, Framing};

pub fn crate_info() -> &'static str {
    "descent-camera v0.1.0"
}
