//! schedsim — Run scheduler simulations from scenario scripts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use schedsim::{
    evaluate_script, metrics, Engine, MetricsTracker, Policy, Report, DEFAULT_QUANTUM, MAX_CORES,
};

/// Which scheduling discipline to install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// First-come-first-served.
    Fcfs,
    /// Round Robin with a fixed quantum.
    #[default]
    RoundRobin,
}

/// Run scheduler simulations from scenario scripts.
#[derive(Parser)]
#[command(name = "schedsim")]
struct Cli {
    /// Path to a scenario script (.sl).
    script: PathBuf,

    /// Scheduling policy.
    #[arg(short, long, value_enum, default_value = "round-robin")]
    policy: PolicyArg,

    /// Round-Robin quantum in ticks.
    #[arg(short, long, default_value_t = DEFAULT_QUANTUM)]
    quantum: u64,

    /// Number of simulated cores.
    #[arg(short, long, default_value_t = MAX_CORES)]
    cores: usize,

    /// Write a metrics report (.met) here after the run completes.
    #[arg(short, long, value_name = "PATH")]
    metrics: Option<PathBuf>,

    /// Print per-process accounting at exit.
    #[arg(long)]
    dump_processes: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let source = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("failed to read {}", cli.script.display()))?;

    let policy = match cli.policy {
        PolicyArg::Fcfs => Policy::Fcfs,
        PolicyArg::RoundRobin => Policy::RoundRobin {
            quantum: cli.quantum,
        },
    };

    let mut engine = Engine::with_cores(policy, cli.cores);
    evaluate_script(&source, &mut engine)
        .with_context(|| format!("failed to evaluate {}", cli.script.display()))?;

    let mut tracker = MetricsTracker::new();
    while !engine.complete() {
        engine.step();
        tracker.observe(&engine);
    }

    if cli.dump_processes {
        dump_processes(&engine);
    }

    println!(
        "policy={} cores={} ticks={} finished={} avg_waiting={} avg_turnaround={} throughput={:.2}",
        engine.policy().tag(),
        engine.nr_cores(),
        engine.timer(),
        engine.finished().len(),
        metrics::average_waiting_time(&engine),
        metrics::average_turnaround_time(&engine),
        engine.throughput(),
    );

    if let Some(path) = &cli.metrics {
        let report = Report::capture(&engine, &tracker);
        std::fs::write(path, report.render())
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("wrote metrics report to {}", path.display());
    }

    Ok(())
}

fn dump_processes(engine: &Engine) {
    for &id in engine.finished() {
        let process = engine.process(id);
        println!(
            "{:<16} pid={:<6} arrival={:<6} waiting={:<6} turnaround={:<6}",
            process.name(),
            process.pid().0,
            process.arrival(),
            process
                .waiting_time()
                .map_or_else(|| "-".to_string(), |t| t.to_string()),
            process
                .turnaround_time()
                .map_or_else(|| "-".to_string(), |t| t.to_string()),
        );
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
