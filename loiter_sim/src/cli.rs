// loiter_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Loiter: closed-loop simulation of a vision-based position hold.
///
/// This struct defines the command-line arguments of the `loiter_sim` binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/hover_hold.toml")]
    pub scenario: PathBuf,

    /// Overrides `simulation.seed` from the scenario.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overrides `simulation.duration` (seconds) from the scenario.
    #[arg(short, long)]
    pub duration: Option<f64>,
}
