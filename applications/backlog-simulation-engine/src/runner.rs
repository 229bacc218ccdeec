//! Monte Carlo trial orchestration
//!
//! Trials share nothing mutable, so they run in parallel; results are
//! collected trial-indexed and can be projected into a checkpoint for a
//! later continuation run.

use std::collections::BTreeMap;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::info;

use crate::checkpoint::{Checkpoint, TrialState};
use crate::error::Result;
use crate::simulator::DefectSimulator;
use crate::types::DefectId;

/// Result of one trial: the persisted state plus the per-run observables
/// consumed by downstream analytics.
#[derive(Debug, Clone)]
pub struct TrialResult {
    /// The checkpointable portion of the trial
    pub state: TrialState,
    /// The merged time sequence the trial stepped through
    pub times: Vec<f64>,
    /// Per-type arrival counts, one entry per hourly tick
    pub incoming: BTreeMap<String, Vec<u64>>,
    /// Defects unserved at the horizon, in service order
    pub backlog_remaining: Vec<DefectId>,
}

/// Runs the simulator across an ensemble of independent trials
pub struct TrialRunner<'a> {
    simulator: &'a DefectSimulator,
    trials: usize,
    seed: Option<u64>,
}

impl<'a> TrialRunner<'a> {
    /// `seed` makes the whole ensemble reproducible; each trial still gets
    /// its own independent stream.
    pub fn new(simulator: &'a DefectSimulator, trials: usize, seed: Option<u64>) -> Self {
        TrialRunner {
            simulator,
            trials,
            seed,
        }
    }

    /// Run the ensemble, optionally resuming each trial from a checkpoint
    /// entry. A supplied checkpoint overrides the configured trial count.
    pub fn run(&self, initial: Option<&Checkpoint>) -> Result<Vec<TrialResult>> {
        let dt = self.simulator.time_step();
        let trials = initial.map_or(self.trials, Checkpoint::len);

        (0..trials)
            .into_par_iter()
            .map(|trial| {
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(trial as u64)),
                    None => StdRng::from_entropy(),
                };
                let state = initial.map(|checkpoint| &checkpoint.trials[trial]);

                let started = Instant::now();
                let output = self.simulator.simulate_backlog(dt, state, &mut rng)?;
                let elapsed = started.elapsed().as_secs_f64();
                info!(
                    trial = trial + 1,
                    elapsed_secs = elapsed,
                    defects = output.defect_log.len(),
                    backlog = output.backlog_remaining.len(),
                    "trial complete"
                );

                // With a zero horizon no stepping happened; the reached
                // horizon is whatever the resumed state already had.
                let t_end = if self.simulator.horizon() != 0.0 {
                    output.times.last().copied().unwrap_or(0.0)
                } else {
                    state.map_or(0.0, |s| s.t_end)
                };

                Ok(TrialResult {
                    state: TrialState {
                        simulation_time: elapsed,
                        t_end,
                        time_step: dt,
                        defect_log: output.defect_log,
                    },
                    times: output.times,
                    incoming: output.incoming,
                    backlog_remaining: output.backlog_remaining,
                })
            })
            .collect()
    }

    /// Project the persisted portion of the results for export
    pub fn to_checkpoint(results: &[TrialResult]) -> Checkpoint {
        Checkpoint {
            trials: results.iter().map(|r| r.state.clone()).collect(),
        }
    }
}
