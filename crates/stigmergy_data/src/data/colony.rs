use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a colony inside the engine. Assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColonyId(pub usize);

impl fmt::Display for ColonyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "colony#{}", self.0)
    }
}

/// Tunable stat bundle of a species. All values are multipliers applied to
/// the base values in the agent configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceStats {
    pub speed: f64,
    pub health: f64,
    pub carry_capacity: f64,
    pub sensor_range: f64,
    pub spawn_rate: f64,
    pub lifespan: f64,
    pub damage: f64,
}

impl Default for RaceStats {
    fn default() -> Self {
        Self {
            speed: 1.0,
            health: 1.0,
            carry_capacity: 1.0,
            sensor_range: 1.0,
            spawn_rate: 1.0,
            lifespan: 1.0,
            damage: 1.0,
        }
    }
}

impl RaceStats {
    /// True when every multiplier is finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [
            self.speed,
            self.health,
            self.carry_capacity,
            self.sensor_range,
            self.spawn_rate,
            self.lifespan,
            self.damage,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Species descriptor of a colony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub name: String,
    pub color: (u8, u8, u8),
    #[serde(default)]
    pub stats: RaceStats,
}

impl Default for Race {
    fn default() -> Self {
        Self {
            name: "Formica".to_string(),
            color: (255, 80, 80),
            stats: RaceStats::default(),
        }
    }
}

/// Permanent colony improvements that can be bought with resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Multiplies the carry capacity of current and future workers.
    CarryCapacity,
    /// Multiplies the colony's spawn-rate stat.
    SpawnRate,
    /// Raises the roster cap.
    MaxAgents,
}
