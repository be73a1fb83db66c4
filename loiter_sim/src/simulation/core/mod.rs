// loiter_sim/src/simulation/core/mod.rs

pub mod error;
pub mod node;
pub mod prng;
pub mod report;
pub mod runner;
pub mod schedule;
