//! Colony CLI - runs the colony kernel against a scenario.
//!
//! - `colony run` - simulate ticks and save the final snapshot
//! - `colony status` - last snapshot and recent events
//! - `colony init` - write a default config and scenario

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use colony_kernel::scenario::DEFAULT_SCENARIO;
use colony_kernel::{EventLog, Kernel, KernelConfig, Scenario, Snapshot};

#[derive(Parser)]
#[command(name = "colony")]
#[command(about = "Agent decision kernel for a tick-based colony", version)]
struct Cli {
    /// Project root directory
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the kernel
    Run {
        /// Number of ticks (defaults to the configured value)
        #[arg(long)]
        ticks: Option<u64>,

        /// Scenario file (defaults to .colony/scenario.yaml, then the built-in one)
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the last snapshot and recent events
    Status {
        /// Number of events to show
        #[arg(long, default_value = "10")]
        events: usize,
    },

    /// Initialize a new project
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let project_root = match cli.project {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Some(Commands::Run {
            ticks,
            scenario,
            json,
        }) => run_kernel(&project_root, ticks, scenario, json),
        Some(Commands::Status { events }) => show_status(&project_root, events),
        Some(Commands::Init) => init_project(&project_root),
        None => {
            println!("Colony - tick-based agent decision kernel");
            println!();
            println!("Usage: colony <COMMAND>");
            println!();
            println!("Commands:");
            println!("  run     Run the kernel");
            println!("  status  Show the last snapshot and recent events");
            println!("  init    Initialize a new project");
            println!();
            println!("Run 'colony --help' for more information.");
            Ok(())
        }
    }
}

fn scenario_path(project_root: &Path) -> PathBuf {
    project_root.join(".colony/scenario.yaml")
}

fn load_scenario(project_root: &Path, explicit: Option<PathBuf>) -> Result<Scenario> {
    match explicit {
        Some(path) => Scenario::load(&path),
        None => {
            let path = scenario_path(project_root);
            if path.exists() {
                Scenario::load(&path)
            } else {
                Scenario::builtin()
            }
        }
    }
}

fn run_kernel(
    project_root: &Path,
    ticks: Option<u64>,
    scenario: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mut config = KernelConfig::load_from_project(project_root)?;
    config.resolve_paths(project_root);
    let ticks = ticks.unwrap_or(config.ticks);

    let scenario = load_scenario(project_root, scenario)?;
    tracing::info!(
        project = %project_root.display(),
        scenario = %scenario.name,
        ticks,
        "Starting kernel"
    );
    let world = scenario
        .build()
        .with_context(|| format!("Failed to build scenario {}", scenario.name))?;

    let mut kernel = Kernel::from_scenario(config.clone(), world)?;
    if config.events.enabled {
        kernel = kernel.with_event_log(EventLog::new(&config.events.path));
    }

    let mut totals = (0usize, 0usize, 0usize);
    for report in kernel.run(ticks)? {
        totals.0 += report.spawned;
        totals.1 += report.died;
        totals.2 += report.new_invaders;
        if report.spawned + report.died + report.new_invaders + report.gone_invaders > 0 {
            tracing::info!(tick = report.tick, summary = %report.summary(), "Tick");
        }
    }

    let snapshot = kernel.snapshot();
    snapshot.save(&config.state_path)?;
    tracing::info!(
        tick = snapshot.tick,
        agents = snapshot.agents.len(),
        spawned = totals.0,
        died = totals.1,
        invaders = totals.2,
        state = %config.state_path.display(),
        "Kernel stopped"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn show_status(project_root: &Path, limit: usize) -> Result<()> {
    let mut config = KernelConfig::load_from_project(project_root)?;
    config.resolve_paths(project_root);

    println!("Colony Status");
    println!("=============");
    println!();
    println!("Project: {}", project_root.display());
    println!();

    if config.state_path.exists() {
        let snapshot = Snapshot::load(&config.state_path)?;
        println!("Tick: {}", snapshot.tick);
        println!("Agents: {}", snapshot.agents.len());
        for agent in &snapshot.agents {
            println!(
                "  - {} ({}) at {} doing {}",
                agent.name,
                agent.data.creep_type,
                agent.pos,
                agent.data.action_name().unwrap_or("nothing")
            );
        }
        println!();
        println!("Tasks:");
        for (task, key, memory) in snapshot.tasks.iter() {
            println!(
                "  - {task}/{key}: {} queued, {} spawning, {} running",
                memory.queued.len(),
                memory.spawning.len(),
                memory.running.len()
            );
        }
        println!();
        println!("Invaders seen: {}", snapshot.invaders.statistics().len());
        for record in snapshot.invaders.statistics() {
            let left = record
                .leave_tick
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  - {} of {} in {} (ticks {}..{})",
                record.id, record.owner, record.room, record.enter_tick, left
            );
        }
    } else {
        println!("No snapshot yet. Run: colony run");
    }

    println!();
    println!("Recent events:");
    let events = EventLog::new(&config.events.path).read_recent(limit);
    for event in &events {
        println!("  [{}] #{} {}", event.event_type, event.tick, event.message);
    }

    Ok(())
}

fn init_project(project_root: &Path) -> Result<()> {
    let colony_dir = project_root.join(".colony");
    std::fs::create_dir_all(&colony_dir)
        .with_context(|| format!("Failed to create {}", colony_dir.display()))?;

    let config_path = KernelConfig::project_path(project_root);
    if !config_path.exists() {
        std::fs::write(&config_path, KernelConfig::default().to_yaml()?)?;
    }

    let scenario = scenario_path(project_root);
    if !scenario.exists() {
        std::fs::write(&scenario, DEFAULT_SCENARIO)?;
    }

    println!("Initialized colony project at {}", project_root.display());
    println!();
    println!("Created:");
    println!("  .colony/config.yaml   - kernel configuration");
    println!("  .colony/scenario.yaml - rooms, flags and agents");
    println!();
    println!("Next steps:");
    println!("  1. Edit .colony/scenario.yaml");
    println!("  2. Run: colony run --ticks 100");

    Ok(())
}
