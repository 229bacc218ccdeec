//! Backlog Simulation Engine
//!
//! Monte Carlo simulator for defect remediation backlogs: a priority-ordered
//! backlog, a bounded pool of multi-tasking resources, and checkpoint/resume
//! across independent trials.

pub mod backlog;
pub mod checkpoint;
pub mod distributions;
pub mod error;
pub mod resources;
pub mod runner;
pub mod simulator;
pub mod types;

// Future modules (not yet implemented)
// pub mod metrics;
