//! # Pool Simulator
//!
//! Replays a scripted scenario against a drifting meta pool nested over a
//! plain stableswap base pool, recording each step's output, virtual price
//! and effective A.

pub mod config;
pub mod scenario;

pub use config::{ScenarioStep, SimulatorConfig};
pub use scenario::{simulate, SimulationReport, Simulator, StepRecord};
