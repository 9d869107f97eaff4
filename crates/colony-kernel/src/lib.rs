//! Colony kernel - runs the decision loop one tick at a time.
//!
//! This crate wires the reference world, the action catalog, the behaviours
//! and the tasks into a deterministic per-tick pass, tracks hostile creeps,
//! loads configuration and scenarios, and records what happened.

pub mod config;
pub mod defense;
pub mod kernel;
pub mod observability;
pub mod scenario;
pub mod state;

pub use config::KernelConfig;
pub use defense::{InvaderRecord, InvaderTracker};
pub use kernel::{Colony, Kernel, TickEvent, TickReport};
pub use observability::{EventLog, KernelEvent};
pub use scenario::{InvaderWave, Scenario, ScenarioError, ScenarioWorld};
pub use state::Snapshot;
