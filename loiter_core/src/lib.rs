// loiter_core/src/lib.rs

// This file defines the public modules of the library.
pub mod config;
pub mod control;
pub mod error;
pub mod estimation;
pub mod localization;
pub mod messages;
pub mod orchestrator;
pub mod prelude;
pub mod types;
