//! Headless host for the stigmergy simulation: a re-export facade over the
//! workspace crates plus the runner used by the `stigmergy` binary.

pub mod app;
pub mod model;
