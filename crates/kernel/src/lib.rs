//! Descent kernel: the simulation context that owns every runtime component
//! and runs them in a fixed order each tick.
//!
//! # Invariants
//! - Tick order: stream, frame, shift, hazard, pacing.
//! - At most one origin shift per tick, applied to every subscriber
//!   (sections, hazard, camera focus, actors, readouts) before anything
//!   reads a position again.
//! - Given the same seed, config, catalog and inputs, two runs produce the
//!   same `state_hash`.

pub mod config;
pub mod simulation;
pub mod step;

pub use config::{ConfigError, DescentConfig};
pub use simulation::{EVENT_LOG_CAPACITY, SimEvent, Simulation, SimulationError, TickReport};
pub use step::{FixedStep, TickTimer};
