//! Read-only views handed to renderers and HUDs.

use crate::pheromone::PheromoneField;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stigmergy_data::{AgentId, AgentState, Channel, ColonyId, Position, Role};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub colony: ColonyId,
    pub position: Position,
    pub heading: f64,
    pub role: Role,
    pub state: AgentState,
    pub carried: f64,
    pub health_fraction: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FoodSnapshot {
    pub position: Position,
    pub radius: f64,
    pub remaining_fraction: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ColonySnapshot {
    pub id: ColonyId,
    pub name: String,
    pub color: (u8, u8, u8),
    pub home: Position,
    pub is_player: bool,
    pub stock: f64,
    pub workers: usize,
    pub army: usize,
    pub max_agents: usize,
    pub delivered: f64,
    pub kills: u64,
    pub lost: u64,
    pub field: Arc<PheromoneField>,
}

impl ColonySnapshot {
    #[must_use]
    pub fn population(&self) -> usize {
        self.workers + self.army
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EngineSnapshot {
    pub tick: u64,
    pub width: f64,
    pub height: f64,
    pub grid_width: usize,
    pub grid_height: usize,
    pub cell_size: f64,
    pub colonies: Vec<ColonySnapshot>,
    pub agents: Vec<AgentSnapshot>,
    pub foods: Vec<FoodSnapshot>,
}

impl EngineSnapshot {
    /// Cell-wise sum of `channel` over every colony, row-major.
    #[must_use]
    pub fn merged_channel(&self, channel: Channel) -> Vec<f32> {
        let mut merged = vec![0.0_f32; self.grid_width * self.grid_height];
        for colony in &self.colonies {
            for (acc, v) in merged.iter_mut().zip(colony.field.channel(channel)) {
                *acc += *v;
            }
        }
        merged
    }

    pub fn colony(&self, id: ColonyId) -> Option<&ColonySnapshot> {
        self.colonies.iter().find(|c| c.id == id)
    }

    /// Per-colony one-line summary for logs and JSON reports.
    #[must_use]
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "tick": self.tick,
            "agents": self.agents.len(),
            "foods": self.foods.len(),
            "colonies": self.colonies.iter().map(|c| serde_json::json!({
                "name": c.name,
                "stock": c.stock,
                "workers": c.workers,
                "army": c.army,
                "delivered": c.delivered,
                "kills": c.kills,
                "lost": c.lost,
            })).collect::<Vec<_>>(),
        })
    }
}
