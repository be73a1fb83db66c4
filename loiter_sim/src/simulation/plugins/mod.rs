// loiter_sim/src/simulation/plugins/mod.rs

//! Synthetic stand-ins for everything outside the control loop: the airframe
//! and the perception pipeline.

pub mod perception;
pub mod vehicle;
