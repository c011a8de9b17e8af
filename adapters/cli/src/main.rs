#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the tank fill simulator.

mod clock;
mod scenario;
mod settings;
mod simulation;
mod terminal;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::settings::{PolicyKind, Settings};
use crate::simulation::DEFAULT_MAX_FRAMES;
use crate::terminal::TerminalBackend;

/// Command-line arguments accepted by the simulator.
#[derive(Debug, Parser)]
#[command(name = "tank-sim", about = "Watch a tank fill using flood fill.")]
pub(crate) struct Args {
    /// Fill policy driving the deployment.
    #[arg(long, value_enum)]
    pub(crate) policy: Option<PolicyKind>,

    /// Edge length of the square tank grid.
    #[arg(long)]
    pub(crate) grid_size: Option<u32>,

    /// Warning threshold expressed as a whole percentage.
    #[arg(long)]
    pub(crate) warning_threshold: Option<u8>,

    /// Milliseconds of simulated time between flood fill steps.
    #[arg(long)]
    pub(crate) fill_interval_ms: Option<u64>,

    /// Cap on total simulated fill time, in milliseconds.
    #[arg(long)]
    pub(crate) time_budget_ms: Option<u64>,

    /// Cells added per fill action under the manual policy.
    #[arg(long)]
    pub(crate) increment: Option<u32>,

    /// Maximum number of fill actions per lifecycle under the manual policy.
    #[arg(long)]
    pub(crate) max_fills: Option<u32>,

    /// Path to a TOML settings file.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Scenario string previously produced by --print-scenario.
    #[arg(long)]
    pub(crate) scenario: Option<String>,

    /// Print the effective scenario string and exit.
    #[arg(long)]
    pub(crate) print_scenario: bool,

    /// Pace frames with the wall clock instead of running headless.
    #[arg(long)]
    pub(crate) realtime: bool,

    /// Upper bound on simulation frames.
    #[arg(long)]
    pub(crate) max_frames: Option<u32>,
}

/// Entry point for the tank simulator command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::resolve(&args)?;

    if args.print_scenario {
        println!("{}", settings.to_scenario().encode());
        return Ok(());
    }

    println!("{}", tank_sim_core::WELCOME_BANNER);

    let mut backend = TerminalBackend::stdout();
    let max_frames = args.max_frames.unwrap_or(DEFAULT_MAX_FRAMES);
    let outcome = simulation::run(&settings, &mut backend, max_frames, args.realtime)?;

    println!(
        "Finished after {} frame(s) at {:.1}% capacity.",
        outcome.frames,
        outcome.final_snapshot.fill_percentage()
    );

    Ok(())
}
