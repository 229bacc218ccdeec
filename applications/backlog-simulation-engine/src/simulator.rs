//! Discrete-time defect backlog simulator
//!
//! Steps a priority backlog and a bounded pool of remediation resources over
//! a merged fine/hourly time grid, recording every defect's lifecycle in a
//! ledger. One call to [`DefectSimulator::simulate_backlog`] is one trial.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::backlog::BacklogQueue;
use crate::checkpoint::TrialState;
use crate::distributions::DistributionSet;
use crate::error::{Result, SimulationError};
use crate::resources::ResourcePool;
use crate::types::{DefectId, DefectLog, DefectRecord, DefectType};

/// Static configuration for one simulation.
///
/// The three per-type lists must have one entry per defect label; mismatches
/// are rejected at construction.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub defect_labels: Vec<String>,
    /// Lower rank is serviced first
    pub defect_priority: Vec<i32>,
    pub initial_backlogs: Vec<usize>,
    /// Simulation horizon in hours; `0` applies only the initial conditions
    pub t_end: f64,
    /// Number of parallel service resources
    pub resources: usize,
    /// Defects each resource can work concurrently
    pub resources_qmax: usize,
}

/// Everything produced by one trial
#[derive(Debug, Clone)]
pub struct TrialOutput {
    /// The merged time sequence the trial stepped through
    pub times: Vec<f64>,
    /// Per-type arrival counts, one entry per hourly tick
    pub incoming: BTreeMap<String, Vec<u64>>,
    /// Full lifecycle ledger
    pub defect_log: DefectLog,
    /// Defects still backlogged at the horizon, in service order
    pub backlog_remaining: Vec<DefectId>,
}

/// Configured simulator, shared read-only across trials
#[derive(Debug, Clone)]
pub struct DefectSimulator {
    types: Vec<DefectType>,
    distributions: DistributionSet,
    t_end: f64,
    resources: usize,
    resources_qmax: usize,
}

impl DefectSimulator {
    pub fn new(config: SimulationConfig, distributions: DistributionSet) -> Result<Self> {
        let n = config.defect_labels.len();
        if config.defect_priority.len() != n {
            return Err(SimulationError::PerTypeMismatch("defect_priority"));
        }
        if config.initial_backlogs.len() != n {
            return Err(SimulationError::PerTypeMismatch("initial_backlogs"));
        }
        if distributions.len() != n {
            return Err(SimulationError::PerTypeMismatch("distributions"));
        }
        if config.resources == 0 {
            return Err(SimulationError::NonPositive("resources"));
        }
        if config.resources_qmax == 0 {
            return Err(SimulationError::NonPositive("resources_qmax"));
        }

        let types = config
            .defect_labels
            .into_iter()
            .zip(config.defect_priority)
            .zip(config.initial_backlogs)
            .map(|((name, priority), initial_backlog)| DefectType {
                name,
                priority,
                initial_backlog,
            })
            .collect();

        Ok(DefectSimulator {
            types,
            distributions,
            t_end: config.t_end,
            resources: config.resources,
            resources_qmax: config.resources_qmax,
        })
    }

    pub fn defect_types(&self) -> &[DefectType] {
        &self.types
    }

    /// Configured horizon in hours (per run, added onto a resumed state)
    pub fn horizon(&self) -> f64 {
        self.t_end
    }

    /// Fine time step derived from the remediation pools
    pub fn time_step(&self) -> f64 {
        self.distributions.time_step()
    }

    /// Run one trial.
    ///
    /// With `initial_state`, the trial adopts the loaded ledger and continues
    /// from its horizon for another `t_end` hours; unresolved defects re-enter
    /// the backlog in creation order. The initial backlog seed runs either way.
    pub fn simulate_backlog(
        &self,
        dt: f64,
        initial_state: Option<&TrialState>,
        rng: &mut impl Rng,
    ) -> Result<TrialOutput> {
        if !(dt > 0.0) {
            return Err(SimulationError::NonPositive("dt"));
        }

        let mut trial = SimulationTrial::new(self, rng);

        let (t_start, t_end) = match initial_state {
            Some(state) => {
                trial.load_state(state)?;
                (state.t_end, state.t_end + self.t_end)
            }
            None => (0.0, self.t_end),
        };

        let times = merged_time_grid(t_start, t_end, dt);
        debug!(
            t_start,
            t_end,
            dt,
            steps = times.len(),
            "time grid assembled"
        );

        trial.seed_initial_backlog(t_start);
        for n in 0..self.resources {
            trial.top_off(n, t_start);
        }

        // One pending arrival-count draw per type, consumed at the next tick
        let mut pending: Vec<f64> = (0..self.types.len())
            .map(|idx| Ok(self.distributions.get(idx)?.incoming.sample(&mut *trial.rng)))
            .collect::<Result<_>>()?;
        let mut stored: Vec<Vec<u64>> = vec![Vec::new(); self.types.len()];

        let mut hour_index: u64 = 1;
        let mut next_hour = t_start + hour_index as f64;

        for &t in &times {
            if t == next_hour {
                trial.generate_arrivals(t, &mut pending, &mut stored)?;
                hour_index += 1;
                next_hour = t_start + hour_index as f64;
            }
            for n in 0..self.resources {
                trial.top_off(n, t);
                trial.check_completion(n, t);
            }
        }

        let incoming = self
            .types
            .iter()
            .zip(stored)
            .map(|(ty, counts)| (ty.name.clone(), counts))
            .collect();

        Ok(TrialOutput {
            times,
            incoming,
            defect_log: trial.ledger,
            backlog_remaining: trial.backlog.drain_ids(),
        })
    }

    fn priority_of(&self, type_name: &str) -> Option<i32> {
        self.types
            .iter()
            .find(|ty| ty.name == type_name)
            .map(|ty| ty.priority)
    }
}

/// Union of the fine `dt` grid and the integer "on the hour" arrival ticks.
///
/// The fine grid covers `[t_start, t_end)`; the hourly ticks run from
/// `t_start + 1` up to and including the last hour below `t_end + 1`. A fine
/// point landing exactly on an hour appears twice; the arrival branch fires
/// only once because the hour counter advances.
fn merged_time_grid(t_start: f64, t_end: f64, dt: f64) -> Vec<f64> {
    let mut times = Vec::new();

    let mut k: u64 = 0;
    loop {
        let t = t_start + k as f64 * dt;
        if t >= t_end {
            break;
        }
        times.push(t);
        k += 1;
    }

    let mut h: u64 = 1;
    loop {
        let t = t_start + h as f64;
        if t >= t_end + 1.0 {
            break;
        }
        times.push(t);
        h += 1;
    }

    times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    times
}

/// Mutable state of one running trial.
///
/// Owns the ledger, backlog, and resource pool exclusively for the duration
/// of the trial, so the per-tick steps cannot alias each other's state.
struct SimulationTrial<'a, R: Rng> {
    sim: &'a DefectSimulator,
    rng: &'a mut R,
    ledger: DefectLog,
    backlog: BacklogQueue,
    pool: ResourcePool,
    next_id: DefectId,
}

impl<'a, R: Rng> SimulationTrial<'a, R> {
    fn new(sim: &'a DefectSimulator, rng: &'a mut R) -> Self {
        SimulationTrial {
            sim,
            rng,
            ledger: DefectLog::new(),
            backlog: BacklogQueue::new(),
            pool: ResourcePool::new(sim.resources, sim.resources_qmax),
            next_id: 0,
        }
    }

    /// Adopt a loaded ledger and re-queue every unresolved defect
    fn load_state(&mut self, state: &TrialState) -> Result<()> {
        self.ledger = state.defect_log.clone();
        self.next_id = self.ledger.keys().next_back().map_or(0, |id| id + 1);

        for (id, record) in &self.ledger {
            if record.is_completed() {
                continue;
            }
            let priority = self.sim.priority_of(&record.defect_type).ok_or_else(|| {
                SimulationError::checkpoint(format!(
                    "unknown defect type '{}' in loaded state",
                    record.defect_type
                ))
            })?;
            self.backlog.push(priority, *id);
        }
        Ok(())
    }

    /// Seed the configured initial backlog at `t_start`
    fn seed_initial_backlog(&mut self, t_start: f64) {
        let types = self.sim.defect_types();
        for (idx, ty) in types.iter().enumerate() {
            let pools = &self.sim.distributions;
            for _ in 0..ty.initial_backlog {
                let remediation = pools
                    .get(idx)
                    .map(|d| d.remediation.sample(&mut *self.rng))
                    .unwrap_or(0.0);
                let id = self.create_defect(&ty.name, t_start, remediation);
                self.backlog.push(ty.priority, id);
            }
        }
    }

    /// Materialize the pending arrival counts for hourly tick `t`
    fn generate_arrivals(
        &mut self,
        t: f64,
        pending: &mut [f64],
        stored: &mut [Vec<u64>],
    ) -> Result<()> {
        let types = self.sim.defect_types();
        for (idx, ty) in types.iter().enumerate() {
            let count = pending[idx].max(0.0) as u64;
            stored[idx].push(count);

            let dist = self.sim.distributions.get(idx)?;
            for _ in 0..count {
                let remediation = dist.remediation.sample(&mut *self.rng);
                let id = self.create_defect(&ty.name, t, remediation);
                self.backlog.push(ty.priority, id);
            }
            pending[idx] = dist.incoming.sample(&mut *self.rng);
        }
        Ok(())
    }

    fn create_defect(&mut self, type_name: &str, created_at: f64, remediation_time: f64) -> DefectId {
        let id = self.next_id;
        self.next_id += 1;
        self.ledger
            .insert(id, DefectRecord::new(type_name, created_at, remediation_time));
        id
    }

    /// Refill slot `n` from the backlog while it has room.
    ///
    /// A defect carried over from a checkpoint keeps its original start time.
    fn top_off(&mut self, n: usize, t: f64) {
        while self.pool.slot(n).has_room() {
            let Some(id) = self.backlog.pop_min() else {
                break;
            };
            self.pool.slot_mut(n).admit(id);
            if let Some(record) = self.ledger.get_mut(&id) {
                if record.processing_start_time.is_none() {
                    record.processing_start_time = Some(t);
                }
                record.assigned_resource = Some(n);
            }
        }
    }

    /// Check every defect in slot `n` for completion at time `t`.
    ///
    /// Completion is back-dated to the instant it was actually due
    /// (`t - leftover`), and the freed capacity is backfilled immediately
    /// with the same back-dated start so the slot never idles inside a step.
    /// A defect with `remediation_time == 0` never satisfies the guard and
    /// stays in its slot.
    fn check_completion(&mut self, n: usize, t: f64) {
        for _ in 0..self.sim.resources_qmax {
            let Some(id) = self.pool.slot_mut(n).pop_front() else {
                break;
            };

            let completion = self.ledger.get(&id).and_then(|record| {
                let start = record.processing_start_time?;
                let elapsed = t - start;
                if elapsed >= record.remediation_time && record.remediation_time != 0.0 {
                    Some(elapsed - record.remediation_time)
                } else {
                    None
                }
            });

            match completion {
                Some(leftover) => {
                    if let Some(record) = self.ledger.get_mut(&id) {
                        record.processing_end_time = Some(t - leftover);
                    }
                    if let Some(next) = self.backlog.pop_min() {
                        self.pool.slot_mut(n).admit(next);
                        if let Some(record) = self.ledger.get_mut(&next) {
                            record.processing_start_time = Some(t - leftover);
                            record.assigned_resource = Some(n);
                        }
                    }
                }
                None => self.pool.slot_mut(n).push_back(id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{SamplePool, TypeDistributions};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pools(incoming: &[f64], remediation: &[f64]) -> TypeDistributions {
        TypeDistributions {
            incoming: SamplePool::new(incoming.to_vec()),
            remediation: SamplePool::new(remediation.to_vec()),
        }
    }

    fn single_type(
        incoming: &[f64],
        remediation: &[f64],
        initial: usize,
        t_end: f64,
        resources: usize,
        qmax: usize,
    ) -> DefectSimulator {
        DefectSimulator::new(
            SimulationConfig {
                defect_labels: vec!["crash".into()],
                defect_priority: vec![1],
                initial_backlogs: vec![initial],
                t_end,
                resources,
                resources_qmax: qmax,
            },
            DistributionSet::new(vec![pools(incoming, remediation)]),
        )
        .unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn mismatched_priority_list_is_rejected_by_name() {
        let err = DefectSimulator::new(
            SimulationConfig {
                defect_labels: vec!["a".into(), "b".into()],
                defect_priority: vec![1],
                initial_backlogs: vec![0, 0],
                t_end: 1.0,
                resources: 1,
                resources_qmax: 1,
            },
            DistributionSet::new(vec![pools(&[], &[]), pools(&[], &[])]),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "defect_priority: must have one value for each defect type"
        );
    }

    #[test]
    fn mismatched_initial_backlogs_are_rejected_by_name() {
        let err = DefectSimulator::new(
            SimulationConfig {
                defect_labels: vec!["a".into()],
                defect_priority: vec![1],
                initial_backlogs: vec![],
                t_end: 1.0,
                resources: 1,
                resources_qmax: 1,
            },
            DistributionSet::new(vec![pools(&[], &[])]),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("initial_backlogs"));
    }

    #[test]
    fn zero_resources_are_rejected() {
        let err = DefectSimulator::new(
            SimulationConfig {
                defect_labels: vec!["a".into()],
                defect_priority: vec![1],
                initial_backlogs: vec![0],
                t_end: 1.0,
                resources: 0,
                resources_qmax: 1,
            },
            DistributionSet::new(vec![pools(&[], &[])]),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "resources: must be positive");
    }

    #[test]
    fn non_positive_dt_is_rejected() {
        let sim = single_type(&[1.0], &[2.0], 0, 10.0, 1, 1);
        assert!(sim.simulate_backlog(0.0, None, &mut rng()).is_err());
    }

    #[test]
    fn time_grid_merges_fine_and_hourly_points() {
        let times = merged_time_grid(0.0, 1.5, 0.375);
        // Fine: 0.0, 0.375, 0.75, 1.125; hourly ticks run to just below
        // t_end + 1, so 2.0 is included even though it lies past t_end
        assert_eq!(times, vec![0.0, 0.375, 0.75, 1.0, 1.125, 2.0]);
    }

    #[test]
    fn time_grid_keeps_coincident_points() {
        let times = merged_time_grid(0.0, 2.0, 0.5);
        // 1.0 appears in both grids and is kept twice, as is the hourly 2.0
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn zero_horizon_yields_empty_grid() {
        assert!(merged_time_grid(0.0, 0.0, 0.25).is_empty());
        assert!(merged_time_grid(7.5, 7.5, 0.25).is_empty());
    }

    /// One resource at capacity one, one arrival per hour, two-hour service:
    /// the service rate is half the arrival rate, so the backlog grows.
    #[test]
    fn scenario_saturated_single_resource() {
        let sim = single_type(&[1.0], &[2.0], 0, 10.0, 1, 1);
        let dt = sim.time_step();
        assert_eq!(dt, 0.5);

        let output = sim.simulate_backlog(dt, None, &mut rng()).unwrap();

        assert_eq!(output.defect_log.len(), 10);
        assert_eq!(output.incoming["crash"], vec![1; 10]);

        // Admissions at t = 1, 3, 5, 7, 9; completions back-dated to 3, 5, 7, 9
        let mut ends: Vec<f64> = output
            .defect_log
            .values()
            .filter_map(|r| r.processing_end_time)
            .collect();
        ends.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(ends, vec![3.0, 5.0, 7.0, 9.0]);

        let in_service = output
            .defect_log
            .values()
            .filter(|r| r.has_started() && !r.is_completed())
            .count();
        assert_eq!(in_service, 1);
        assert_eq!(output.backlog_remaining.len(), 5);
    }

    /// Doubling the resources matches the service rate to the arrival rate:
    /// the backlog stays empty after the initial transient.
    #[test]
    fn scenario_balanced_two_resources() {
        let sim = single_type(&[1.0], &[2.0], 0, 10.0, 2, 1);
        let output = sim.simulate_backlog(sim.time_step(), None, &mut rng()).unwrap();

        assert_eq!(output.defect_log.len(), 10);
        assert!(output.backlog_remaining.is_empty());

        let completed = output
            .defect_log
            .values()
            .filter(|r| r.is_completed())
            .count();
        assert_eq!(completed, 8);
    }

    /// A zero remediation time never satisfies the completion guard: the
    /// defect occupies its slot for the whole run. Current behavior, kept
    /// deliberately until the intended semantics are clarified.
    #[test]
    fn zero_duration_defect_never_completes() {
        let sim = single_type(&[0.0], &[0.0], 1, 5.0, 1, 1);
        let output = sim.simulate_backlog(sim.time_step(), None, &mut rng()).unwrap();

        assert_eq!(output.defect_log.len(), 1);
        let record = &output.defect_log[&0];
        assert_eq!(record.processing_start_time, Some(0.0));
        assert_eq!(record.processing_end_time, None);
        assert_eq!(record.assigned_resource, Some(0));
        assert!(output.backlog_remaining.is_empty());
    }

    #[test]
    fn completion_is_back_dated_to_the_due_instant() {
        // dt = 0.25 (driven by the second type); the 0.8h defect is checked
        // at t = 1.0 but completes at its true due time 0.8.
        let sim = DefectSimulator::new(
            SimulationConfig {
                defect_labels: vec!["slow".into(), "fast".into()],
                defect_priority: vec![1, 2],
                initial_backlogs: vec![1, 0],
                t_end: 2.0,
                resources: 1,
                resources_qmax: 1,
            },
            DistributionSet::new(vec![pools(&[0.0], &[0.8]), pools(&[0.0], &[0.5])]),
        )
        .unwrap();
        let dt = sim.time_step();
        assert_eq!(dt, 0.25);

        let output = sim.simulate_backlog(dt, None, &mut rng()).unwrap();
        assert_eq!(output.defect_log[&0].processing_end_time, Some(0.8));
    }

    #[test]
    fn lower_rank_is_admitted_first() {
        let sim = DefectSimulator::new(
            SimulationConfig {
                defect_labels: vec!["minor".into(), "severe".into()],
                defect_priority: vec![5, 1],
                initial_backlogs: vec![1, 1],
                t_end: 0.0,
                resources: 1,
                resources_qmax: 1,
            },
            DistributionSet::new(vec![pools(&[0.0], &[1.0]), pools(&[0.0], &[1.0])]),
        )
        .unwrap();

        let output = sim.simulate_backlog(0.5, None, &mut rng()).unwrap();

        let admitted: Vec<&str> = output
            .defect_log
            .values()
            .filter(|r| r.has_started())
            .map(|r| r.defect_type.as_str())
            .collect();
        assert_eq!(admitted, vec!["severe"]);
        assert_eq!(output.backlog_remaining.len(), 1);
    }

    /// Every defect ends the trial in exactly one of backlogged, in service,
    /// or completed, and the three sets cover the ledger.
    #[test]
    fn partition_invariant_holds_at_the_horizon() {
        let sim = DefectSimulator::new(
            SimulationConfig {
                defect_labels: vec!["a".into(), "b".into()],
                defect_priority: vec![2, 1],
                initial_backlogs: vec![1, 2],
                t_end: 24.0,
                resources: 2,
                resources_qmax: 2,
            },
            DistributionSet::new(vec![
                pools(&[0.0, 1.0, 2.0], &[0.7, 1.9]),
                pools(&[1.0], &[1.3, 0.4, 2.6]),
            ]),
        )
        .unwrap();

        let output = sim.simulate_backlog(sim.time_step(), None, &mut rng()).unwrap();

        let backlogged: std::collections::BTreeSet<_> =
            output.backlog_remaining.iter().copied().collect();
        assert_eq!(backlogged.len(), output.backlog_remaining.len());

        let mut completed = 0;
        let mut in_service = 0;
        for (id, record) in &output.defect_log {
            if backlogged.contains(id) {
                // Backlogged defects were never admitted in a cold run
                assert!(!record.has_started());
                assert!(!record.is_completed());
            } else if record.is_completed() {
                assert!(record.has_started());
                completed += 1;
            } else {
                assert!(record.has_started());
                in_service += 1;
            }
        }
        assert_eq!(
            backlogged.len() + completed + in_service,
            output.defect_log.len()
        );
        // In-service defects can never exceed the pool capacity
        assert!(in_service <= 2 * 2);
    }

    #[test]
    fn resuming_with_zero_horizon_changes_nothing() {
        use crate::types::DefectRecord;

        let mut defect_log = DefectLog::new();
        let mut done = DefectRecord::new("crash", 0.0, 1.0);
        done.processing_start_time = Some(0.0);
        done.processing_end_time = Some(1.0);
        defect_log.insert(1, done);
        let mut started = DefectRecord::new("crash", 1.0, 4.0);
        started.processing_start_time = Some(2.0);
        started.assigned_resource = Some(0);
        defect_log.insert(2, started);
        defect_log.insert(3, DefectRecord::new("crash", 5.0, 1.5));

        let state = TrialState {
            simulation_time: 0.0,
            t_end: 7.5,
            time_step: 0.5,
            defect_log,
        };

        let sim = single_type(&[1.0], &[2.0], 0, 0.0, 1, 1);
        let output = sim.simulate_backlog(0.5, Some(&state), &mut rng()).unwrap();

        assert!(output.times.is_empty());
        assert_eq!(output.defect_log.len(), 3);
        // No new completions, no new arrivals
        let completed: Vec<_> = output
            .defect_log
            .iter()
            .filter(|(_, r)| r.is_completed())
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(completed, vec![1]);
        // The carried-over defect keeps its original start time through the
        // initial fill; the other unresolved defect stays backlogged.
        assert_eq!(output.defect_log[&2].processing_start_time, Some(2.0));
        assert_eq!(output.backlog_remaining, vec![3]);
    }

    /// The initial backlog is seeded even when resuming a checkpoint.
    /// Current behavior, kept deliberately; resuming callers pass zero
    /// initial backlogs to avoid the extra seed.
    #[test]
    fn resume_reseeds_initial_backlog() {
        let mut defect_log = DefectLog::new();
        defect_log.insert(0, DefectRecord::new("crash", 2.0, 3.0));
        let state = TrialState {
            simulation_time: 0.0,
            t_end: 6.0,
            time_step: 0.5,
            defect_log,
        };

        let sim = single_type(&[0.0], &[2.0], 2, 0.0, 1, 1);
        let output = sim.simulate_backlog(0.5, Some(&state), &mut rng()).unwrap();

        assert_eq!(output.defect_log.len(), 3);
        let reseeded: Vec<_> = output
            .defect_log
            .values()
            .filter(|r| r.created_at == 6.0)
            .collect();
        assert_eq!(reseeded.len(), 2);
    }

    #[test]
    fn resume_continues_the_timeline() {
        let state = TrialState {
            simulation_time: 0.0,
            t_end: 4.0,
            time_step: 0.5,
            defect_log: DefectLog::new(),
        };

        let sim = single_type(&[1.0], &[2.0], 0, 3.0, 1, 1);
        let output = sim.simulate_backlog(0.5, Some(&state), &mut rng()).unwrap();

        assert_eq!(output.times.first(), Some(&4.0));
        assert_eq!(output.times.last(), Some(&7.0));
        // Hourly arrivals at t = 5, 6, 7
        assert_eq!(output.incoming["crash"].len(), 3);
        assert!(output.defect_log.values().all(|r| r.created_at >= 5.0));
    }

    #[test]
    fn resume_with_unknown_type_is_a_checkpoint_error() {
        let mut defect_log = DefectLog::new();
        defect_log.insert(0, DefectRecord::new("mystery", 0.0, 1.0));
        let state = TrialState {
            simulation_time: 0.0,
            t_end: 1.0,
            time_step: 0.5,
            defect_log,
        };

        let sim = single_type(&[1.0], &[2.0], 0, 1.0, 1, 1);
        let err = sim.simulate_backlog(0.5, Some(&state), &mut rng()).unwrap_err();
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn fresh_ids_continue_past_loaded_ids() {
        let mut defect_log = DefectLog::new();
        defect_log.insert(7, DefectRecord::new("crash", 0.0, 2.0));
        let state = TrialState {
            simulation_time: 0.0,
            t_end: 2.0,
            time_step: 0.5,
            defect_log,
        };

        let sim = single_type(&[1.0], &[2.0], 1, 2.0, 1, 1);
        let output = sim.simulate_backlog(0.5, Some(&state), &mut rng()).unwrap();

        // Seeded and arriving defects start at id 8; nothing collides with 7
        assert!(output.defect_log.len() > 1);
        assert!(output.defect_log.keys().all(|id| *id == 7 || *id >= 8));
    }
}
