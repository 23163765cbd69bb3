//! Core data structures for the stigmergy simulation.

pub mod agent;
pub mod colony;
pub mod field;
pub mod food;
pub mod geometry;
