pub mod macros;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stigmergy_lib::model::agent::{AgentId, AgentState, Role};
use stigmergy_lib::model::colony::ColonyId;
use stigmergy_lib::model::config::SimConfig;
use stigmergy_lib::model::engine::Engine;
use stigmergy_lib::model::food::FoodSource;
use stigmergy_lib::model::geometry::Position;

/// Engine with two quiet colonies: no starting agents, no food, no
/// automatic spawning. Tests add exactly what they need.
#[allow(dead_code)]
pub struct EngineBuilder {
    config: SimConfig,
    foods: Vec<FoodSource>,
    agents: Vec<AgentBuilder>,
    stocks: Vec<(usize, f64)>,
}

#[allow(dead_code)]
impl EngineBuilder {
    pub fn new() -> Self {
        let mut config = SimConfig::default();
        config.world.width = 300.0;
        config.world.height = 300.0;
        config.world.seed = Some(0);
        config.food.count = 0;
        config.economy.auto_spawn_chance = 0.0;
        for colony in config.colonies.iter_mut() {
            colony.initial_workers = 0;
            colony.initial_army = 0;
            colony.auto_replenish = false;
            colony.max_agents = 50;
        }
        config.colonies[0].home = Some((75.0, 75.0));
        config.colonies[1].home = Some((225.0, 225.0));
        Self {
            config,
            foods: Vec::new(),
            agents: Vec::new(),
            stocks: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_food(mut self, x: f64, y: f64, radius: f64, amount: f64) -> Self {
        self.foods
            .push(FoodSource::new(Position::new(x, y), radius, amount, 0.0));
        self
    }

    pub fn with_agent(mut self, agent: AgentBuilder) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn with_stock(mut self, colony: usize, stock: f64) -> Self {
        self.stocks.push((colony, stock));
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns the engine and the ids of the added agents, in order.
    pub fn build(self) -> (Engine, Vec<AgentId>) {
        let config = self.config.clone();
        let mut engine = Engine::new(self.config).expect("Failed to create engine in test builder");
        let mut rng = ChaCha8Rng::seed_from_u64(config.world.seed.unwrap_or(0));

        for food in self.foods {
            engine.add_food(food);
        }
        for (colony, stock) in self.stocks {
            engine
                .colony_mut(ColonyId(colony))
                .expect("Unknown colony in test builder")
                .stock = stock;
        }

        let mut ids = Vec::with_capacity(self.agents.len());
        for planned in self.agents {
            let colony = engine
                .colony_mut(ColonyId(planned.colony))
                .expect("Unknown colony in test builder");
            let id = colony.spawn(planned.role, &config, &mut rng);
            let agent = colony.agent_mut(id).expect("Agent just spawned");
            if let Some((x, y)) = planned.position {
                agent.position = Position::new(x, y);
            }
            if let Some(heading) = planned.heading {
                agent.heading = heading;
            }
            if let Some(speed) = planned.speed {
                agent.speed = speed;
            }
            if let Some(health) = planned.health {
                agent.health = health;
                agent.max_health = agent.max_health.max(health);
            }
            if let Some(capacity) = planned.capacity {
                agent.capacity = capacity;
            }
            if let Some(carried) = planned.carried {
                agent.carried = carried;
            }
            if let Some(state) = planned.state {
                agent.state = state;
            }
            ids.push(id);
        }
        (engine, ids)
    }
}

#[allow(dead_code)]
pub struct AgentBuilder {
    colony: usize,
    role: Role,
    position: Option<(f64, f64)>,
    heading: Option<f64>,
    speed: Option<f64>,
    health: Option<f64>,
    capacity: Option<f64>,
    carried: Option<f64>,
    state: Option<AgentState>,
}

#[allow(dead_code)]
impl AgentBuilder {
    pub fn worker(colony: usize) -> Self {
        Self::new(colony, Role::Worker)
    }

    pub fn army(colony: usize) -> Self {
        Self::new(colony, Role::Army)
    }

    fn new(colony: usize, role: Role) -> Self {
        Self {
            colony,
            role,
            position: None,
            heading: None,
            speed: None,
            health: None,
            capacity: None,
            carried: None,
            state: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some((x, y));
        self
    }

    pub fn heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    /// Speed zero pins the agent in place.
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn health(mut self, health: f64) -> Self {
        self.health = Some(health);
        self
    }

    pub fn capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn carrying(mut self, carried: f64) -> Self {
        self.carried = Some(carried);
        self
    }

    pub fn state(mut self, state: AgentState) -> Self {
        self.state = Some(state);
        self
    }
}
