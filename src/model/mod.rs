pub use stigmergy_core::{Command, Engine, FoodLogic};
pub mod agent {
    pub use stigmergy_core::agent::*;
    pub use stigmergy_data::{AgentId, AgentState, Role};
}
pub mod colony {
    pub use stigmergy_core::colony::*;
    pub use stigmergy_data::{ColonyId, Race, RaceStats, UpgradeKind};
}
pub mod combat {
    pub use stigmergy_core::combat::*;
}
pub mod config {
    pub use stigmergy_core::config::*;
}
pub mod engine {
    pub use stigmergy_core::engine::*;
}
pub mod food {
    pub use stigmergy_core::food::*;
    pub use stigmergy_data::FoodSource;
}
pub mod geometry {
    pub use stigmergy_data::Position;
}
pub mod pheromone {
    pub use stigmergy_core::pheromone::*;
    pub use stigmergy_data::Channel;
}
pub mod snapshot {
    pub use stigmergy_core::snapshot::*;
}
