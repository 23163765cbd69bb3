//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every section falls back to its `Default` impl, so
//! a config file only needs to name the values it changes.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 800.0
//! height = 600.0
//! seed = 42
//!
//! [tuning]
//! evaporation_rate = 0.01
//! follow_strength = 1.5
//!
//! [[colonies]]
//! player = true
//! initial_workers = 20
//! [colonies.race]
//! name = "Formica"
//! color = [255, 80, 80]
//! ```

use serde::{Deserialize, Serialize};
use stigmergy_data::{Channel, Position, Race, RaceStats, Role};

/// World-level simulation configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// World units per pheromone cell.
    pub cell_size: f64,
    /// Fixed seed for reproducible runs. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Agent updates per tick.
    pub substeps: u32,
    pub enemy_index: EnemyIndexKind,
    /// Ticks between periodic summary log lines.
    pub report_interval: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            cell_size: 2.0,
            seed: None,
            substeps: 2,
            enemy_index: EnemyIndexKind::Grid,
            report_interval: 1000,
        }
    }
}

/// Strategy used to answer "nearest enemy" queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EnemyIndexKind {
    /// Uniform grid bucketing.
    #[default]
    Grid,
    /// Scan every agent of every other colony.
    Exhaustive,
}

/// Per-channel physics constants.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    pub diffusion: f32,
    /// Multiplier applied to the global evaporation rate.
    pub evaporation_scale: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FieldConfig {
    pub home: ChannelConfig,
    pub harvest: ChannelConfig,
    pub attack: ChannelConfig,
    pub danger: ChannelConfig,
    /// Values below this are floored to exactly zero after each step.
    pub epsilon: f32,
    /// Amount seeded into HOME at the nest every tick.
    pub home_seed_strength: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            home: ChannelConfig {
                diffusion: 0.15,
                evaporation_scale: 0.5,
            },
            harvest: ChannelConfig {
                diffusion: 0.15,
                evaporation_scale: 1.0,
            },
            attack: ChannelConfig {
                diffusion: 0.15,
                evaporation_scale: 1.5,
            },
            danger: ChannelConfig {
                diffusion: 0.1,
                evaporation_scale: 3.0,
            },
            epsilon: 1e-4,
            home_seed_strength: 2.0,
        }
    }
}

impl FieldConfig {
    #[must_use]
    pub fn channel(&self, channel: Channel) -> ChannelConfig {
        match channel {
            Channel::Home => self.home,
            Channel::Harvest => self.harvest,
            Channel::Attack => self.attack,
            Channel::Danger => self.danger,
        }
    }
}

/// Externally adjustable knobs and the ranges they are clamped to.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TuningConfig {
    pub evaporation_rate: f32,
    pub follow_strength: f64,
    pub evaporation_range: (f32, f32),
    pub follow_range: (f64, f64),
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            evaporation_rate: 0.02,
            follow_strength: 1.0,
            evaporation_range: (0.002, 0.08),
            follow_range: (0.2, 2.5),
        }
    }
}

/// Live tuning values read by every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningParams {
    pub evaporation_rate: f32,
    pub follow_strength: f64,
}

impl TuningParams {
    #[must_use]
    pub fn from_config(config: &TuningConfig) -> Self {
        Self {
            evaporation_rate: config.evaporation_rate,
            follow_strength: config.follow_strength,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AgentConfig {
    /// Distance from the agent to each sensor point.
    pub sensor_offset: f64,
    pub sensor_angle_deg: f64,
    /// Half-width of the uniform exploration noise added to each turn.
    pub noise_turn_deg: f64,
    pub pickup_distance: f64,
    pub deposit_distance: f64,
    /// HOME laid per update while searching.
    pub search_deposit: f32,
    /// HARVEST laid per update while returning.
    pub return_deposit: f32,
    pub home_inhibition: f32,
    pub danger_inhibition: f32,
    pub min_speed: f64,
    pub max_speed: f64,
    pub capacity: f64,
    pub health: f64,
    /// Updates an agent lives before dying of age. `None` means forever.
    pub lifespan: Option<u64>,
    /// DANGER laid where an agent takes damage.
    pub danger_deposit: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            sensor_offset: 18.0,
            sensor_angle_deg: 28.0,
            noise_turn_deg: 6.0,
            pickup_distance: 10.0,
            deposit_distance: 18.0,
            search_deposit: 0.08,
            return_deposit: 1.2,
            home_inhibition: 0.25,
            danger_inhibition: 1.0,
            min_speed: 1.8,
            max_speed: 2.6,
            capacity: 1.0,
            health: 10.0,
            lifespan: Some(20_000),
            danger_deposit: 2.0,
        }
    }
}

impl AgentConfig {
    #[must_use]
    pub fn sensor_angle(&self) -> f64 {
        self.sensor_angle_deg.to_radians()
    }

    #[must_use]
    pub fn noise_turn(&self) -> f64 {
        self.noise_turn_deg.to_radians()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ArmyConfig {
    /// Summed ATTACK reading below which army falls back to HOME.
    pub attack_threshold: f32,
    pub recruit_deposit: f32,
    pub melee_range: f64,
    pub damage: f64,
    pub sensor_range: f64,
    pub health: f64,
}

impl Default for ArmyConfig {
    fn default() -> Self {
        Self {
            attack_threshold: 0.05,
            recruit_deposit: 1.5,
            melee_range: 4.0,
            damage: 1.0,
            sensor_range: 60.0,
            health: 20.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EconomyConfig {
    pub worker_cost: f64,
    pub army_cost: f64,
    pub capacity_upgrade_cost: f64,
    pub spawn_rate_upgrade_cost: f64,
    pub max_agents_upgrade_cost: f64,
    pub capacity_upgrade_factor: f64,
    pub spawn_rate_upgrade_factor: f64,
    pub max_agents_upgrade_step: usize,
    /// Per-tick chance that a non-player colony tries to spawn.
    pub auto_spawn_chance: f64,
    /// Share of auto-spawned agents that are army.
    pub army_fraction: f64,
    /// Ticks between replenishment spawns of a player colony.
    pub spawn_cooldown_ticks: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            worker_cost: 5.0,
            army_cost: 10.0,
            capacity_upgrade_cost: 20.0,
            spawn_rate_upgrade_cost: 20.0,
            max_agents_upgrade_cost: 1.0,
            capacity_upgrade_factor: 1.5,
            spawn_rate_upgrade_factor: 1.25,
            max_agents_upgrade_step: 5,
            auto_spawn_chance: 0.02,
            army_fraction: 0.3,
            spawn_cooldown_ticks: 150,
        }
    }
}

impl EconomyConfig {
    #[must_use]
    pub fn cost(&self, role: Role) -> f64 {
        match role {
            Role::Worker => self.worker_cost,
            Role::Army => self.army_cost,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FoodConfig {
    pub count: usize,
    pub min_radius: f64,
    pub max_radius: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    pub regen_rate: f64,
    /// Ticks an exhausted, non-regrowing patch waits before relocating.
    pub respawn_delay: u64,
    /// Minimum distance between a new patch and any colony home.
    pub home_clearance: f64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            count: 35,
            min_radius: 18.0,
            max_radius: 50.0,
            min_amount: 30.0,
            max_amount: 90.0,
            regen_rate: 0.0,
            respawn_delay: 300,
            home_clearance: 120.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ColonyConfig {
    pub race: Race,
    /// Nest position. `None` places it at the world centre.
    pub home: Option<(f64, f64)>,
    pub player: bool,
    pub initial_workers: usize,
    pub initial_army: usize,
    pub initial_stock: f64,
    pub max_agents: usize,
    /// Spawn a worker whenever affordable (player colonies only).
    pub auto_replenish: bool,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            race: Race::default(),
            home: None,
            player: true,
            initial_workers: 10,
            initial_army: 0,
            initial_stock: 0.0,
            max_agents: 10,
            auto_replenish: true,
        }
    }
}

impl ColonyConfig {
    #[must_use]
    pub fn home_position(&self, world: &WorldConfig) -> Position {
        match self.home {
            Some((x, y)) => Position::new(x, y),
            None => Position::new(world.width / 2.0, world.height / 2.0),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub field: FieldConfig,
    pub tuning: TuningConfig,
    pub agent: AgentConfig,
    pub army: ArmyConfig,
    pub economy: EconomyConfig,
    pub food: FoodConfig,
    pub colonies: Vec<ColonyConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            field: FieldConfig::default(),
            tuning: TuningConfig::default(),
            agent: AgentConfig::default(),
            army: ArmyConfig::default(),
            economy: EconomyConfig::default(),
            food: FoodConfig::default(),
            colonies: vec![
                ColonyConfig::default(),
                ColonyConfig {
                    race: Race {
                        name: "Solenopsis".to_string(),
                        color: (80, 140, 255),
                        stats: RaceStats {
                            speed: 1.1,
                            health: 0.9,
                            spawn_rate: 1.2,
                            ..Default::default()
                        },
                    },
                    home: Some((200.0, 200.0)),
                    player: false,
                    initial_workers: 10,
                    initial_army: 3,
                    initial_stock: 0.0,
                    max_agents: 40,
                    auto_replenish: false,
                },
            ],
        }
    }
}

fn in_unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

impl SimConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(
            self.world.width > 0.0 && self.world.width.is_finite(),
            "World width must be positive"
        );
        anyhow::ensure!(
            self.world.height > 0.0 && self.world.height.is_finite(),
            "World height must be positive"
        );
        anyhow::ensure!(self.world.cell_size > 0.0, "Cell size must be positive");
        anyhow::ensure!(
            self.world.width >= self.world.cell_size && self.world.height >= self.world.cell_size,
            "World must hold at least one pheromone cell"
        );
        anyhow::ensure!(self.world.substeps > 0, "Substeps must be positive");
        anyhow::ensure!(
            self.world.report_interval > 0,
            "Report interval must be positive"
        );

        // Field validation
        for channel in Channel::ALL {
            let c = self.field.channel(channel);
            anyhow::ensure!(
                (0.0..=1.0).contains(&c.diffusion),
                "Diffusion of {} channel must be in [0.0, 1.0]",
                channel.name()
            );
            anyhow::ensure!(
                c.evaporation_scale >= 0.0,
                "Evaporation scale of {} channel must be non-negative",
                channel.name()
            );
        }
        anyhow::ensure!(self.field.epsilon >= 0.0, "Epsilon must be non-negative");
        anyhow::ensure!(
            self.field.home_seed_strength >= 0.0,
            "Home seed strength must be non-negative"
        );

        // Tuning validation
        let (emin, emax) = self.tuning.evaporation_range;
        anyhow::ensure!(
            0.0 <= emin && emin <= emax && emax <= 1.0,
            "Evaporation range must satisfy 0 <= min <= max <= 1"
        );
        anyhow::ensure!(
            (emin..=emax).contains(&self.tuning.evaporation_rate),
            "Evaporation rate must lie inside its range"
        );
        let (fmin, fmax) = self.tuning.follow_range;
        anyhow::ensure!(
            0.0 <= fmin && fmin <= fmax,
            "Follow range must satisfy 0 <= min <= max"
        );
        anyhow::ensure!(
            (fmin..=fmax).contains(&self.tuning.follow_strength),
            "Follow strength must lie inside its range"
        );

        // Agent validation
        let a = &self.agent;
        anyhow::ensure!(a.sensor_offset >= 0.0, "Sensor offset must be non-negative");
        anyhow::ensure!(a.noise_turn_deg >= 0.0, "Noise turn must be non-negative");
        anyhow::ensure!(
            a.pickup_distance >= 0.0 && a.deposit_distance >= 0.0,
            "Pickup and deposit distances must be non-negative"
        );
        anyhow::ensure!(
            a.search_deposit >= 0.0 && a.return_deposit >= 0.0 && a.danger_deposit >= 0.0,
            "Deposit amounts must be non-negative"
        );
        anyhow::ensure!(
            0.0 <= a.min_speed && a.min_speed <= a.max_speed,
            "Speed range must satisfy 0 <= min <= max"
        );
        anyhow::ensure!(a.capacity > 0.0, "Worker capacity must be positive");
        anyhow::ensure!(a.health > 0.0, "Worker health must be positive");

        // Army validation
        anyhow::ensure!(self.army.health > 0.0, "Army health must be positive");
        anyhow::ensure!(self.army.damage >= 0.0, "Army damage must be non-negative");
        anyhow::ensure!(
            self.army.melee_range >= 0.0 && self.army.sensor_range >= 0.0,
            "Army ranges must be non-negative"
        );
        anyhow::ensure!(
            self.army.recruit_deposit >= 0.0,
            "Recruit deposit must be non-negative"
        );

        // Economy validation
        let e = &self.economy;
        anyhow::ensure!(
            e.worker_cost >= 0.0
                && e.army_cost >= 0.0
                && e.capacity_upgrade_cost >= 0.0
                && e.spawn_rate_upgrade_cost >= 0.0
                && e.max_agents_upgrade_cost >= 0.0,
            "Costs must be non-negative"
        );
        anyhow::ensure!(
            e.capacity_upgrade_factor >= 1.0 && e.spawn_rate_upgrade_factor >= 1.0,
            "Upgrade factors must be at least 1.0"
        );
        anyhow::ensure!(
            in_unit(e.auto_spawn_chance),
            "Auto spawn chance must be in [0.0, 1.0]"
        );
        anyhow::ensure!(in_unit(e.army_fraction), "Army fraction must be in [0.0, 1.0]");

        // Food validation
        let f = &self.food;
        anyhow::ensure!(
            0.0 < f.min_radius && f.min_radius <= f.max_radius,
            "Food radius range must satisfy 0 < min <= max"
        );
        anyhow::ensure!(
            0.0 <= f.min_amount && f.min_amount <= f.max_amount,
            "Food amount range must satisfy 0 <= min <= max"
        );
        anyhow::ensure!(f.regen_rate >= 0.0, "Food regen rate must be non-negative");
        anyhow::ensure!(
            f.home_clearance >= 0.0,
            "Food home clearance must be non-negative"
        );

        // Colony validation
        anyhow::ensure!(!self.colonies.is_empty(), "At least one colony is required");
        let (field_w, field_h) = self.field_extent();
        for colony in &self.colonies {
            anyhow::ensure!(
                colony.race.stats.is_valid(),
                "Race {} has a negative or non-finite stat",
                colony.race.name
            );
            let home = colony.home_position(&self.world);
            anyhow::ensure!(
                (0.0..field_w).contains(&home.x) && (0.0..field_h).contains(&home.y),
                "Home of {} lies outside the pheromone grid ({}x{})",
                colony.race.name,
                field_w,
                field_h
            );
            anyhow::ensure!(
                colony.initial_stock >= 0.0,
                "Initial stock of {} must be non-negative",
                colony.race.name
            );
        }

        Ok(())
    }

    /// World area covered by whole pheromone cells. Positions at or beyond
    /// these bounds map to no cell.
    #[must_use]
    pub fn field_extent(&self) -> (f64, f64) {
        let cell = self.world.cell_size;
        (
            (self.world.width / cell).floor() * cell,
            (self.world.height / cell).floor() * cell,
        )
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Hash of every section that changes simulation behaviour. Two runs with
    /// the same fingerprint and seed produce the same trajectory.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world.cell_size).as_bytes());
        hasher.update(format!("{:?}", self.world.substeps).as_bytes());
        hasher.update(format!("{:?}", self.field).as_bytes());
        hasher.update(format!("{:?}", self.tuning).as_bytes());
        hasher.update(format!("{:?}", self.agent).as_bytes());
        hasher.update(format!("{:?}", self.army).as_bytes());
        hasher.update(format!("{:?}", self.economy).as_bytes());
        hasher.update(format!("{:?}", self.food).as_bytes());
        hasher.update(format!("{:?}", self.colonies).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_world_width() {
        let config = SimConfig {
            world: WorldConfig {
                width: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_world_smaller_than_cell() {
        let config = SimConfig {
            world: WorldConfig {
                width: 1.0,
                cell_size: 2.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_diffusion() {
        let mut config = SimConfig::default();
        config.field.danger.diffusion = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let mut config = SimConfig::default();
        config.agent.capacity = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_colony_list_rejected() {
        let config = SimConfig {
            colonies: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_home_outside_world_rejected() {
        let mut config = SimConfig::default();
        config.colonies[0].home = Some((5000.0, 10.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_home_on_far_edge_rejected() {
        let mut config = SimConfig::default();
        config.world.width = 200.0;
        config.world.height = 200.0;
        config.colonies.truncate(1);
        config.colonies[0].home = Some((200.0, 200.0));
        assert!(config.validate().is_err());

        config.colonies[0].home = Some((199.0, 199.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_home_in_leftover_strip_rejected() {
        let mut config = SimConfig::default();
        config.world.width = 201.0;
        config.world.height = 200.0;
        config.world.cell_size = 2.0;
        config.colonies.truncate(1);
        config.colonies[0].home = Some((200.5, 100.0));
        assert_eq!(config.field_extent(), (200.0, 200.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SimConfig::from_toml(
            r#"
            [world]
            seed = 7

            [tuning]
            follow_strength = 2.0
            "#,
        )
        .expect("partial config parses");
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.width, 1200.0);
        assert_eq!(config.tuning.follow_strength, 2.0);
        assert_eq!(config.colonies.len(), 2);
    }

    #[test]
    fn test_toml_tuning_out_of_range_rejected() {
        let result = SimConfig::from_toml(
            r#"
            [tuning]
            evaporation_rate = 0.5
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = SimConfig::default();
        let config2 = SimConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());

        let mut config3 = SimConfig::default();
        config3.agent.return_deposit = 2.0;
        assert_ne!(config1.fingerprint(), config3.fingerprint());
    }
}
