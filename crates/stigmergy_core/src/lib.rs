//! # Stigmergy Core
//!
//! The simulation engine for stigmergic colonies: agents that coordinate only
//! through decaying, diffusing pheromone fields.
//!
//! This crate contains the deterministic simulation logic, including:
//! - Per-colony pheromone fields with diffusion and evaporation
//! - The worker and army sense/steer state machine
//! - Colony economy (spawning, upgrades, replenishment)
//! - Cross-colony combat through a spatially indexed enemy lookup
//! - Metrics collection and structured logging
//!
//! ## Example
//!
//! ```
//! use stigmergy_core::config::SimConfig;
//! use stigmergy_core::engine::Engine;
//!
//! let mut config = SimConfig::default();
//! config.world.seed = Some(42);
//! let mut engine = Engine::new(config).expect("default config is valid");
//! engine.run(10);
//! assert_eq!(engine.tick_count(), 10);
//! ```

/// Agent sense/steer state machine
pub mod agent;
/// Colony roster, economy and per-tick update
pub mod colony;
/// Nearest-enemy lookup across colonies
pub mod combat;
/// External commands queued for the next tick
pub mod command;
/// Configuration management for simulation parameters
pub mod config;
/// Multi-colony simulation engine
pub mod engine;
/// Error types
pub mod error;
/// Food placement, harvesting and regrowth
pub mod food;
/// Deferred cross-colony effects
pub mod interaction;
/// Performance metrics collection and logging
pub mod metrics;
/// Pheromone fields
pub mod pheromone;
/// Read-only views for renderers
pub mod snapshot;
/// Spatial hashing for proximity queries
pub mod spatial_hash;

pub use colony::{Colony, DeclineReason, SpawnOutcome, UpgradeOutcome};
pub use command::Command;
pub use config::SimConfig;
pub use engine::Engine;
pub use error::CoreError;
pub use food::FoodLogic;
pub use metrics::{init_logging, Metrics};
pub use pheromone::PheromoneField;
pub use snapshot::EngineSnapshot;
