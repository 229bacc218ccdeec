//! Backlog Simulation CLI
//!
//! Runs the defect backlog Monte Carlo ensemble from the command line:
//! distribution pools come from a JSON file, checkpoints can be loaded to
//! continue a previous run and exported for the next one.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use backlog_simulation_engine::{
    checkpoint::Checkpoint,
    distributions::{DistributionSet, TypeDistributions},
    runner::TrialRunner,
    simulator::{DefectSimulator, SimulationConfig},
};

#[derive(Parser, Debug)]
#[command(name = "backlog-sim")]
#[command(about = "Monte Carlo simulation of a defect remediation backlog", long_about = None)]
struct Args {
    /// Defect types to simulate, comma-separated (example: "crash, lint, flake")
    #[arg(long)]
    defect_labels: String,

    /// Priority rank per defect type, comma-separated; lower = serviced first
    #[arg(long)]
    defect_priority: String,

    /// Initial backlogged defect count per defect type, comma-separated
    #[arg(long)]
    initial_backlogs: String,

    /// JSON file with per-type sample pools:
    /// {"<label>": {"incoming": [...], "remediation": [...]}}
    #[arg(long)]
    distributions: PathBuf,

    /// Simulation horizon in hours; 0 applies only the initial conditions
    #[arg(long, default_value_t = 48.0)]
    t_end: f64,

    /// Parallel resources available for defect remediation
    #[arg(long, default_value_t = 1)]
    resources: usize,

    /// Defects each resource can work concurrently
    #[arg(long, default_value_t = 1)]
    resources_qmax: usize,

    /// Number of independent trials in the ensemble
    #[arg(long, default_value_t = 1)]
    trials: usize,

    /// Resume every trial from this checkpoint (overrides --trials)
    #[arg(long)]
    initial_state: Option<PathBuf>,

    /// Export the final states to this checkpoint file
    #[arg(long)]
    final_state: Option<PathBuf>,

    /// Seed for reproducible ensembles
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_list<T: std::str::FromStr>(raw: &str, parameter: &str) -> anyhow::Result<Vec<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.split(',')
        .map(|item| {
            item.trim()
                .parse::<T>()
                .with_context(|| format!("{parameter}: could not parse '{}'", item.trim()))
        })
        .collect()
}

/// Pools file shape: one entry per defect label
type PoolsFile = BTreeMap<String, TypeDistributions>;

fn load_distributions(path: &PathBuf, labels: &[String]) -> anyhow::Result<DistributionSet> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mut pools: PoolsFile =
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))?;

    let mut per_type = Vec::with_capacity(labels.len());
    for label in labels {
        match pools.remove(label) {
            Some(entry) => per_type.push(entry),
            None => bail!("{}: no sample pools for defect type '{label}'", path.display()),
        }
    }
    Ok(DistributionSet::new(per_type))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let defect_labels: Vec<String> = parse_list(&args.defect_labels, "defect_labels")?;
    let defect_priority: Vec<i32> = parse_list(&args.defect_priority, "defect_priority")?;
    let initial_backlogs: Vec<usize> = parse_list(&args.initial_backlogs, "initial_backlogs")?;

    let distributions = load_distributions(&args.distributions, &defect_labels)?;

    let simulator = DefectSimulator::new(
        SimulationConfig {
            defect_labels,
            defect_priority,
            initial_backlogs,
            t_end: args.t_end,
            resources: args.resources,
            resources_qmax: args.resources_qmax,
        },
        distributions,
    )?;

    let dt = simulator.time_step();
    println!("Configuration:");
    println!("  Horizon: {} hours", args.t_end);
    println!("  Time step: {dt} hours");
    println!("  Resources: {} x {} concurrent", args.resources, args.resources_qmax);

    let initial = match &args.initial_state {
        Some(path) => {
            let checkpoint = Checkpoint::load(path)?;
            println!(
                "  Resuming {} trial(s) from {}",
                checkpoint.len(),
                path.display()
            );
            Some(checkpoint)
        }
        None => {
            println!("  Trials: {}", args.trials);
            None
        }
    };

    let runner = TrialRunner::new(&simulator, args.trials, args.seed);
    let results = runner.run(initial.as_ref())?;

    println!("\n{:<8} {:>10} {:>10} {:>10} {:>12} {:>14}",
        "Trial", "t_end", "Defects", "Completed", "Backlog", "Elapsed (s)");
    println!("{}", "-".repeat(68));
    for (i, result) in results.iter().enumerate() {
        let completed = result
            .state
            .defect_log
            .values()
            .filter(|r| r.is_completed())
            .count();
        println!(
            "{:<8} {:>10.2} {:>10} {:>10} {:>12} {:>14.4}",
            i + 1,
            result.state.t_end,
            result.state.defect_log.len(),
            completed,
            result.backlog_remaining.len(),
            result.state.simulation_time,
        );
    }

    if let Some(path) = &args.final_state {
        TrialRunner::to_checkpoint(&results).save(path)?;
        println!("\nFinal states saved to {}", path.display());
    }

    Ok(())
}
