//! Plain data types shared by the stigmergy simulation crates.
//!
//! Nothing in here advances the simulation; behaviour lives in
//! `stigmergy_core`.

pub mod data;

pub use data::agent::{AgentId, AgentState, Role};
pub use data::colony::{ColonyId, Race, RaceStats, UpgradeKind};
pub use data::field::Channel;
pub use data::food::FoodSource;
pub use data::geometry::Position;
