//! Origin rebasing: keep world coordinates small over unbounded travel.
//!
//! # Invariants
//! - Every subscriber applies each shift delta exactly once.
//! - A shift is one batch: all subscribers are updated before any of them
//!   can be read again. The `&mut` fan-out makes this a compile-time property.
//! - Shifting is pure vector addition, so subscriber order never matters.

mod rebaser;

pub use rebaser::{OriginRebaser, OriginShiftEvent, Rebase, SubscriberId};
