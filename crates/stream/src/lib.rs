//! Streaming: the section catalog and the chain of active sections.
//!
//! # Invariants
//! - A stitched section's entry anchor is bit-identical to the previous
//!   section's exit anchor, and stays so across origin shifts and drift.
//!   Drift keeps seams closed only when every template shares one scroll
//!   velocity, which `SectionCatalog::validate` enforces.
//! - At most one section is stitched per tick.
//! - Pruning never mutates the chain mid-iteration; removals happen at the
//!   end of the tick.

mod catalog;
mod error;
mod section;
mod streamer;

pub use catalog::{SectionCatalog, SectionTemplate, TagSet};
pub use error::{StitchError, StreamError};
pub use section::{Section, stitch};
pub use streamer::{StreamConfig, StreamStats, StreamView, WorldStreamer};

pub fn crate_info() -> &'static str {
    "descent-stream v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("stream"));
    }
}
