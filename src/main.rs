//! u-assign CLI.
//!
//! Load a preference table from JSON, run the trial search and print the
//! winning pairing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_assign::config::{IncompletePolicy, SchedulerConfig};
use u_assign::models::ConstraintsTable;
use u_assign::scheduler::Scheduler;
use u_assign::variants::PartialPairingHook;

#[derive(Parser)]
#[command(name = "u-assign")]
#[command(about = "Randomized greedy person-to-task assignment")]
struct Cli {
    /// Preference table (JSON: people, tasks, preferences)
    table: PathBuf,

    /// Scheduler configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trials per variant
    #[arg(short, long)]
    order: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Incomplete policy: allow, forbid, standard
    #[arg(short, long)]
    policy: Option<IncompletePolicy>,

    /// Run trials in parallel
    #[arg(long)]
    parallel: bool,

    /// Stop starting trials after this many seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Pair people whose name contains this marker, e.g. "(half)"
    #[arg(long)]
    halves: Option<String>,

    /// Number of pairing variants (with --halves)
    #[arg(long, default_value = "6")]
    variants: usize,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => SchedulerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SchedulerConfig::default(),
    };
    if let Some(order) = cli.order {
        config = config.with_order(order);
    }
    if let Some(seed) = cli.seed {
        config = config.with_random_seed(seed);
    }
    if let Some(policy) = cli.policy {
        config = config.with_policy(policy);
    }
    if cli.parallel {
        config = config.with_parallel(true);
    }
    if let Some(secs) = cli.time_limit {
        config = config.with_time_limit(secs);
    }

    let raw = std::fs::read_to_string(&cli.table)
        .with_context(|| format!("reading table {}", cli.table.display()))?;
    let table: ConstraintsTable = serde_json::from_str(&raw)
        .with_context(|| format!("parsing table {}", cli.table.display()))?;
    info!(
        path = %cli.table.display(),
        people = table.shape().0,
        tasks = table.shape().1,
        "table loaded"
    );

    let mut scheduler = Scheduler::new(table).with_config(config);
    if let Some(marker) = cli.halves {
        scheduler = scheduler.with_hook(
            PartialPairingHook::new()
                .with_marker(marker)
                .with_variant_count(cli.variants),
        );
    }

    let report = scheduler.run()?;

    println!("Seed: {}", report.seed);
    println!(
        "Trials: {} solved, {} failed, {} timed out",
        report.solved, report.failed, report.timed_out
    );
    match report.best {
        Some(best) => {
            println!("Score: {}\n", best.score);
            print!("{}", best.pairing());
        }
        None => println!("No solution found"),
    }

    Ok(())
}
