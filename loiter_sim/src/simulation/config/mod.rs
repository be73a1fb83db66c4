// loiter_sim/src/simulation/config/mod.rs

//! Loading and validating scenario configuration from disk.

pub mod structs;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;
use tracing::info;

use crate::simulation::core::error::SimError;
pub use structs::{OperatorAction, ScenarioConfig, ScriptedEvent};

/// Reads a scenario file, layering `LOITER_`-prefixed environment variables
/// on top (`LOITER_SIMULATION__SEED=3` overrides `simulation.seed`).
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, SimError> {
    // A missing file is an empty provider to figment; treat it as an error instead.
    if !path.is_file() {
        return Err(SimError::ScenarioNotFound(path.to_path_buf()));
    }
    info!("Loading scenario from: {}", path.display());

    let config: ScenarioConfig = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("LOITER_").split("__"))
        .extract()
        .map_err(Box::new)?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_reported() {
        let result = load_scenario(Path::new("definitely/not/here.toml"));
        assert!(matches!(result, Err(SimError::ScenarioNotFound(_))));
    }

    #[test]
    fn test_bundled_scenarios_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/scenarios");
        for name in ["hover_hold.toml", "degenerate_restart.toml"] {
            let config = load_scenario(&dir.join(name));
            assert!(config.is_ok(), "{}: {:?}", name, config.err());
        }
    }
}
