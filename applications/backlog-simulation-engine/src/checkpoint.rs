//! Trial state persistence for checkpoint and resume
//!
//! A finished trial is captured as a `TrialState`; a run's worth of them is
//! the trial-indexed `Checkpoint`, stored as JSON. Loading a checkpoint is
//! how a later run continues where a previous one stopped.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::types::DefectLog;

/// Snapshot of one trial, the unit of checkpoint/resume
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialState {
    /// Wall-clock seconds the trial took to simulate (diagnostic only)
    #[serde(default)]
    pub simulation_time: f64,
    /// Horizon the trial reached; a resumed trial continues from here
    pub t_end: f64,
    /// Fine time step the trial ran with
    pub time_step: f64,
    /// Full lifecycle ledger; entries without a `processing_end_time` are
    /// re-queued on resume
    pub defect_log: DefectLog,
}

impl TrialState {
    /// Ids of defects that were not yet resolved when the state was saved
    pub fn unresolved(&self) -> impl Iterator<Item = u64> + '_ {
        self.defect_log
            .iter()
            .filter(|(_, record)| !record.is_completed())
            .map(|(id, _)| *id)
    }
}

/// Trial-indexed checkpoint collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    pub trials: Vec<TrialState>,
}

impl Checkpoint {
    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Load a checkpoint from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| SimulationError::checkpoint(format!("{}: {e}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SimulationError::checkpoint(format!("{}: {e}", path.display())))
    }

    /// Write the checkpoint to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
