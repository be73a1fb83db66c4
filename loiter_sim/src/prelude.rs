// loiter_sim/src/prelude.rs

// Re-export the entire loiter_core prelude so the pure types are one import away.
pub use loiter_core::prelude::*;

// Re-export common simulation-specific types.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::config::load_scenario;
pub use crate::simulation::core::error::SimError;
pub use crate::simulation::core::node::{ControlNode, LoopStatus, NodeReply};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::core::report::SimReport;
pub use crate::simulation::core::runner::Simulation;
pub use crate::simulation::plugins::vehicle::{GroundTruth, SyntheticVehicle};
