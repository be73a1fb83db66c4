// loiter_sim/src/lib.rs

use std::path::Path;

use crate::cli::Cli;
use crate::simulation::config::load_scenario;
use crate::simulation::core::error::SimError;
use crate::simulation::core::report::SimReport;
use crate::simulation::core::runner::Simulation;

// This prelude is for convenience for other files WITHIN the loiter_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

/// Loads the scenario named on the command line, applies the CLI overrides
/// and runs it to completion.
pub fn run(cli: &Cli) -> Result<SimReport, SimError> {
    let mut config = load_scenario(Path::new(&cli.scenario))?;
    if let Some(seed) = cli.seed {
        config.simulation.seed = seed;
    }
    if let Some(duration) = cli.duration {
        config.simulation.duration = duration;
    }
    Simulation::new(&config)?.run()
}
